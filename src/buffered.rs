use std::{any::Any, future::Future, marker::PhantomData};

use futures::{future::BoxFuture, Stream};
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use crate::{
    chain::Chain,
    pumps::{
        enumerate::EnumeratePump,
        filter::FilterPump,
        inspect::InspectPump,
        map::MapPump,
        recast::{Dynamic, RecastPump, TryRecastPump},
        relay::RelayPump,
        skip::SkipPump,
        take::TakePump,
    },
    Capacity, Pipeline, Pump, Result, Sequence, Sink,
};

/// A `BufferedPipeline` is a chain of stages connected by channels of a fixed capacity.
///
/// The capacity is given at construction and inherited by every stage chained off the pipeline.
/// A stage may run up to `capacity` elements ahead of its consumer. Once its output channel is
/// full, the stage waits (backpressure), so memory use is bounded by the capacity per stage
/// regardless of how many elements flow through, even for endless generators.
///
/// # Example
/// ```rust
/// use sluice::BufferedPipeline;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let pipeline = BufferedPipeline::from_generator(
///     |sink| async move {
///         for x in 1..=5 {
///             sink.send(x).await?;
///         }
///         Ok(())
///     },
///     2,
/// );
///
/// assert_eq!(pipeline.capacity().get(), 2);
/// assert_eq!(pipeline.to_sequence().await.unwrap().into_vec(), vec![1, 2, 3, 4, 5]);
/// # });
/// ```
pub struct BufferedPipeline<Out> {
    chain: Chain<Out>,
    capacity: Capacity,
}

impl<Out> BufferedPipeline<Out>
where
    Out: Send + 'static,
{
    pub(crate) fn from_chain(chain: Chain<Out>, capacity: Capacity) -> Self {
        BufferedPipeline { chain, capacity }
    }

    /// Wrap an existing receiver. `capacity` sizes the channels of the stages chained after it.
    pub fn from_receiver(receiver: Receiver<Out>, capacity: impl Into<Capacity>) -> Self {
        Self::from_chain(Chain::from(receiver), capacity.into())
    }

    /// Construct a [`BufferedPipeline`] yielding the elements of a [`Sequence`] in order
    pub fn from_sequence(sequence: Sequence<Out>, capacity: impl Into<Capacity>) -> Self {
        Self::from_iter(sequence, capacity)
    }

    /// Construct a [`BufferedPipeline`] from an [`IntoIterator`]
    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(iter: I, capacity: impl Into<Capacity>) -> Self
    where
        I: IntoIterator<Item = Out> + Send + 'static,
        <I as IntoIterator>::IntoIter: Send,
    {
        let capacity = capacity.into();
        Self::from_chain(Chain::from_iter(capacity, iter), capacity)
    }

    /// Construct a [`BufferedPipeline`] from a [`Stream`]
    pub fn from_stream(
        stream: impl Stream<Item = Out> + Send + 'static,
        capacity: impl Into<Capacity>,
    ) -> Self {
        let capacity = capacity.into();
        Self::from_chain(Chain::from_stream(capacity, stream), capacity)
    }

    /// Construct a [`BufferedPipeline`] fed by a generator.
    ///
    /// The generator may send up to `capacity` elements before anything is consumed. After that
    /// [`Sink::send`] waits until the consumer catches up.
    pub fn from_generator<G, Fut>(generator: G, capacity: impl Into<Capacity>) -> Self
    where
        G: FnOnce(Sink<Out>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let capacity = capacity.into();
        Self::from_chain(
            Chain::from_generator("generator", capacity, generator),
            capacity,
        )
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Attach an additional [`Pump`], sized with this pipeline's capacity
    pub fn pump<P, T>(self, pump: P) -> BufferedPipeline<T>
    where
        P: Pump<Out, T>,
        T: Send + 'static,
    {
        let capacity = self.capacity;
        BufferedPipeline::from_chain(self.chain.pump(pump, capacity), capacity)
    }

    pub fn map<F, T>(self, map_fn: F) -> BufferedPipeline<T>
    where
        F: FnMut(Out) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.pump(MapPump { map_fn })
    }

    pub fn filter<F>(self, predicate: F) -> BufferedPipeline<Out>
    where
        F: FnMut(&Out) -> bool + Send + 'static,
    {
        self.pump(FilterPump { predicate })
    }

    pub fn inspect<F>(self, inspect_fn: F) -> BufferedPipeline<Out>
    where
        F: FnMut(&Out) + Send + 'static,
    {
        self.pump(InspectPump { inspect_fn })
    }

    pub fn enumerate(self) -> BufferedPipeline<(usize, Out)> {
        self.pump(EnumeratePump)
    }

    pub fn take(self, n: usize) -> BufferedPipeline<Out> {
        self.pump(TakePump { n })
    }

    pub fn skip(self, n: usize) -> BufferedPipeline<Out> {
        self.pump(SkipPump { n })
    }

    pub fn erase(self) -> BufferedPipeline<Dynamic>
    where
        Out: Any,
    {
        self.map(|x| Box::new(x) as Dynamic)
    }

    /// Relay into a hand-off [`Pipeline`]
    pub fn to_unbounded(self) -> Pipeline<Out> {
        Pipeline::from_chain(self.chain.pump(RelayPump, Capacity::handoff()))
    }

    pub async fn for_each<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(Out),
    {
        self.chain.fold((), |(), output| f(output)).await
    }

    pub async fn fold<A, F>(self, init: A, fold_fn: F) -> Result<A>
    where
        F: FnMut(A, Out) -> A,
    {
        self.chain.fold(init, fold_fn).await
    }

    /// Collect every element, in arrival order. An empty pipeline yields an empty [`Sequence`].
    pub async fn to_sequence(self) -> Result<Sequence<Out>> {
        self.chain.to_sequence().await
    }

    /// Returns the output receiver and a future that resolves when all inner tasks have finished.
    pub fn build(self) -> (Receiver<Out>, BoxFuture<'static, Result<()>>) {
        self.chain.build()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.chain.cancel_token()
    }

    pub fn cancel(&self) {
        self.chain.cancel_token().cancel();
    }
}

impl BufferedPipeline<Dynamic> {
    /// Narrow erased elements back to `U`, keeping the capacity. Mismatching elements are
    /// dropped and logged, see [`Pipeline::recast`].
    pub fn recast<U>(self) -> BufferedPipeline<U>
    where
        U: Any + Send,
    {
        self.pump(RecastPump {
            _target: PhantomData,
        })
    }

    pub fn try_recast<U>(self) -> BufferedPipeline<Result<U>>
    where
        U: Any + Send,
    {
        self.pump(TryRecastPump {
            _target: PhantomData,
        })
    }
}
