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
    BufferedPipeline, Capacity, Pump, Result, Sequence, Sink,
};

/// A `Pipeline` is a chain of stages connected by hand-off channels.
///
/// Every stage runs in its own task and holds at most one element its consumer has not taken
/// yet, so producers advance in lock step with the final consumer. Use [`BufferedPipeline`] to let
/// producers run ahead.
///
/// A Pipeline is constructed out of a [`Sequence`], an `Iterator`, a `Stream`, a `Receiver` or a
/// generator. Every operation consumes the pipeline and returns a new one, and the chain is
/// finally drained by [`Pipeline::to_sequence`], [`Pipeline::for_each`], [`Pipeline::fold`] or
/// [`Pipeline::build`].
///
/// All constructors and operations spawn Tokio tasks and must be called within a Tokio runtime.
///
/// # Example
/// ```rust
/// use sluice::Pipeline;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let output = Pipeline::from_iter(vec![1, 2, 3, 4])
///     .filter(|x| x % 2 == 0)
///     .map(|x| x * 2)
///     .to_sequence()
///     .await
///     .unwrap();
///
/// assert_eq!(output.into_vec(), vec![4, 8]);
/// # });
/// ```
///
/// ## Panic handling
/// A panic in a stage ends that stage's task. Its channels close, so the stages around it stop
/// and the consumer sees the end of the pipeline instead of waiting forever. The terminal
/// operation reports the panic as [`crate::Error::StageFault`].
///
/// ```rust
/// use sluice::{Error, Pipeline};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let res = Pipeline::from_iter(vec![1, 2, 3])
///     .map(|x: i32| -> i32 { panic!("oh no") })
///     .to_sequence()
///     .await;
///
/// assert!(matches!(res, Err(Error::StageFault { stage: "map", .. })));
/// # });
/// ```
pub struct Pipeline<Out> {
    chain: Chain<Out>,
}

impl<Out> From<Receiver<Out>> for Pipeline<Out> {
    fn from(receiver: Receiver<Out>) -> Self {
        Pipeline {
            chain: Chain::from(receiver),
        }
    }
}

impl<Out> Pipeline<Out>
where
    Out: Send + 'static,
{
    pub(crate) fn from_chain(chain: Chain<Out>) -> Self {
        Pipeline { chain }
    }

    /// Construct a [`Pipeline`] yielding the elements of a [`Sequence`] in order
    pub fn from_sequence(sequence: Sequence<Out>) -> Self {
        Self::from_iter(sequence)
    }

    /// Construct a [`Pipeline`] from an [`IntoIterator`]
    #[allow(clippy::should_implement_trait)] // Clippy suggests implementing `FromIterator` or choosing a less ambiguous method name
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Out> + Send + 'static,
        <I as IntoIterator>::IntoIter: Send,
    {
        Self::from_chain(Chain::from_iter(Capacity::handoff(), iter))
    }

    /// Construct a [`Pipeline`] from a [futures::Stream](https://docs.rs/futures/latest/futures/stream/index.html)
    pub fn from_stream(stream: impl Stream<Item = Out> + Send + 'static) -> Self {
        Self::from_chain(Chain::from_stream(Capacity::handoff(), stream))
    }

    /// Construct a [`Pipeline`] fed by a generator.
    ///
    /// The generator runs in its own task and sends elements through the given [`Sink`]. The
    /// pipeline closes once the generator returns, even if it sent nothing. A generator should
    /// return when [`Sink::send`] fails, otherwise its task keeps running after the pipeline is
    /// gone.
    ///
    /// # Example
    /// ```rust
    /// use sluice::Pipeline;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let output = Pipeline::from_generator(|sink| async move {
    ///     for word in ["a", "b"] {
    ///         sink.send(word).await?;
    ///     }
    ///     Ok(())
    /// })
    /// .to_sequence()
    /// .await
    /// .unwrap();
    ///
    /// assert_eq!(output.into_vec(), vec!["a", "b"]);
    /// # });
    /// ```
    pub fn from_generator<G, Fut>(generator: G) -> Self
    where
        G: FnOnce(Sink<Out>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::from_chain(Chain::from_generator(
            "generator",
            Capacity::handoff(),
            generator,
        ))
    }

    /// Attach an additional [`Pump`] to the pipeline.
    /// This method can be used to create custom stages.
    pub fn pump<P, T>(self, pump: P) -> Pipeline<T>
    where
        P: Pump<Out, T>,
        T: Send + 'static,
    {
        Pipeline::from_chain(self.chain.pump(pump, Capacity::handoff()))
    }

    /// Apply `map_fn` to every element, preserving order and count.
    ///
    /// # Example
    /// ```rust
    /// use sluice::Pipeline;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let (mut output, h) = Pipeline::from_iter(vec![1, 2, 3])
    ///     .map(|x| x * 2)
    ///     .build();
    ///
    /// assert_eq!(output.recv().await, Some(2));
    /// assert_eq!(output.recv().await, Some(4));
    /// assert_eq!(output.recv().await, Some(6));
    /// assert_eq!(output.recv().await, None);
    /// # });
    /// ```
    pub fn map<F, T>(self, map_fn: F) -> Pipeline<T>
    where
        F: FnMut(Out) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.pump(MapPump { map_fn })
    }

    /// Keep the elements for which `predicate` returns true, in their original relative order.
    pub fn filter<F>(self, predicate: F) -> Pipeline<Out>
    where
        F: FnMut(&Out) -> bool + Send + 'static,
    {
        self.pump(FilterPump { predicate })
    }

    /// Run `inspect_fn` on every element as it passes through
    pub fn inspect<F>(self, inspect_fn: F) -> Pipeline<Out>
    where
        F: FnMut(&Out) + Send + 'static,
    {
        self.pump(InspectPump { inspect_fn })
    }

    /// Transform each item in the pipeline into a tuple of the item and its index according to the arrival order.
    /// The index starts at 0.
    pub fn enumerate(self) -> Pipeline<(usize, Out)> {
        self.pump(EnumeratePump)
    }

    /// Take the first `n` items in the pipeline. Upstream stages stop once `n` items were taken.
    pub fn take(self, n: usize) -> Pipeline<Out> {
        self.pump(TakePump { n })
    }

    /// Skip the first `n` items in the pipeline.
    pub fn skip(self, n: usize) -> Pipeline<Out> {
        self.pump(SkipPump { n })
    }

    /// Box every element as [`Dynamic`], so elements of different types can share one pipeline.
    pub fn erase(self) -> Pipeline<Dynamic>
    where
        Out: Any,
    {
        self.map(|x| Box::new(x) as Dynamic)
    }

    /// Relay into a [`BufferedPipeline`] with the given capacity
    pub fn to_buffered(self, capacity: impl Into<Capacity>) -> BufferedPipeline<Out> {
        let capacity = capacity.into();
        BufferedPipeline::from_chain(self.chain.pump(RelayPump, capacity), capacity)
    }

    /// Drain the pipeline, calling `f` on every element in arrival order.
    pub async fn for_each<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(Out),
    {
        self.chain.fold((), |(), output| f(output)).await
    }

    /// Drain the pipeline into an accumulator
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

    /// The token shared by every stage of this pipeline. Cancelling it stops the whole chain.
    pub fn cancel_token(&self) -> CancellationToken {
        self.chain.cancel_token()
    }

    /// Stop every stage. Pending terminal operations return [`crate::Error::Cancelled`].
    pub fn cancel(&self) {
        self.chain.cancel_token().cancel();
    }
}

impl Pipeline<Dynamic> {
    /// Narrow erased elements back to `U`.
    ///
    /// Elements holding any other type are dropped. Each drop is logged at `warn` level with a
    /// running count. Use [`Pipeline::try_recast`] to observe mismatches instead.
    ///
    /// # Example
    /// ```rust
    /// use sluice::{Dynamic, Pipeline};
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let output = Pipeline::from_iter(vec![1, 2, 3])
    ///     .map(|x| if x == 2 { Box::new("two") as Dynamic } else { Box::new(x) as Dynamic })
    ///     .recast::<i32>()
    ///     .to_sequence()
    ///     .await
    ///     .unwrap();
    ///
    /// assert_eq!(output.into_vec(), vec![1, 3]);
    /// # });
    /// ```
    pub fn recast<U>(self) -> Pipeline<U>
    where
        U: Any + Send,
    {
        self.pump(RecastPump {
            _target: PhantomData,
        })
    }

    /// Narrow erased elements back to `U`, turning mismatches into [`crate::Error::TypeMismatch`]
    pub fn try_recast<U>(self) -> Pipeline<Result<U>>
    where
        U: Any + Send,
    {
        self.pump(TryRecastPump {
            _target: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use futures::{stream, SinkExt};
    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        test_utils::{settle, InFlight},
        Error,
    };

    #[tokio::test]
    async fn test_pipeline() {
        let (input_sender, input_receiver) = mpsc::channel::<i32>(100);

        let pipeline = Pipeline::from(input_receiver)
            .map(|x| x + 1)
            .to_buffered(100)
            .map(|x| x - 1)
            .to_unbounded()
            .filter(|x| x % 2 == 0);

        let (mut output_receiver, join_handle) = pipeline.build();
        input_sender.send(1).await.unwrap();
        input_sender.send(2).await.unwrap();
        input_sender.send(3).await.unwrap();
        input_sender.send(4).await.unwrap();

        assert_eq!(output_receiver.recv().await, Some(2));
        assert_eq!(output_receiver.recv().await, Some(4));

        drop(input_sender);
        assert_eq!(output_receiver.recv().await, None);

        assert!(matches!(join_handle.await, Ok(())));
    }

    #[tokio::test]
    async fn test_from_stream() {
        let stream = stream::iter(vec![1, 2, 3]);

        let output = Pipeline::from_stream(stream)
            .to_sequence()
            .await
            .unwrap();

        assert_eq!(output.into_vec(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_from_futures_channel() {
        let (mut sender, receiver) = futures::channel::mpsc::channel(100);

        sender.send(1).await.unwrap();
        sender.send(2).await.unwrap();
        sender.send(3).await.unwrap();

        let (mut output_receiver, _h) = Pipeline::from_stream(receiver).build();
        assert_eq!(output_receiver.recv().await, Some(1));
        assert_eq!(output_receiver.recv().await, Some(2));
        assert_eq!(output_receiver.recv().await, Some(3));

        drop(sender);

        assert_eq!(output_receiver.recv().await, None);
    }

    #[tokio::test]
    async fn handoff_keeps_producer_in_lock_step() {
        let in_flight = InFlight::new();
        let producer = in_flight.clone();

        let pipeline = Pipeline::from_generator(move |sink| async move {
            for x in 0..10 {
                sink.send(x).await?;
                producer.on_sent();
            }
            Ok(())
        });

        settle().await;
        // the first element waits in the slot, but its send has not completed
        assert_eq!(in_flight.sent(), 0);

        let output = pipeline
            .inspect({
                let in_flight = in_flight.clone();
                move |_| {
                    in_flight.on_received();
                }
            })
            .to_sequence()
            .await
            .unwrap();

        assert_eq!(output.len(), 10);
        assert!(in_flight.max() <= 1);
    }

    #[tokio::test]
    async fn each_stage_holds_at_most_one_element() {
        let in_flight = InFlight::new();
        let producer = in_flight.clone();

        let (output_receiver, _h) = Pipeline::from_generator(move |sink| async move {
            for x in 0..100 {
                sink.send(x).await?;
                producer.on_sent();
            }
            Ok(())
        })
        .map(|x| x + 1)
        .map(|x| x + 1)
        .map(|x| x + 1)
        .build();

        settle().await;
        // nothing is consumed, every map stage took exactly one element
        assert_eq!(in_flight.sent(), 3);
        assert_eq!(output_receiver.len(), 1);
    }

    #[tokio::test]
    async fn for_each_runs_side_effects_in_order() {
        let mut seen = Vec::new();

        Pipeline::from_iter(vec!["a", "b", "c"])
            .for_each(|x| seen.push(x))
            .await
            .unwrap();

        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn fold_accumulates() {
        let sum = Pipeline::from_iter(1..=10)
            .fold(0, |acc, x| acc + x)
            .await
            .unwrap();

        assert_eq!(sum, 55);
    }

    #[tokio::test]
    async fn cancel_stops_an_endless_generator() {
        let pipeline = Pipeline::from_generator(|sink| async move {
            let mut i = 0u64;
            loop {
                sink.send(i).await?;
                i += 1;
            }
        })
        .map(|x| x * 2);

        let token = pipeline.cancel_token();
        let received = Arc::new(AtomicUsize::new(0));
        let counter = received.clone();

        let res = pipeline
            .for_each(move |_| {
                if counter.fetch_add(1, Ordering::SeqCst) == 2 {
                    token.cancel();
                }
            })
            .await;

        assert_eq!(res, Err(Error::Cancelled));
        assert_eq!(received.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn generator_panic_is_a_fault() {
        let res = Pipeline::from_generator(|sink| async move {
            sink.send(1).await?;
            panic!("generator exploded");
        })
        .map(|x: i32| x + 1)
        .to_sequence()
        .await;

        assert_eq!(
            res,
            Err(Error::StageFault {
                stage: "generator",
                message: "generator exploded".to_string()
            })
        );
    }

    #[tokio::test]
    async fn dropping_the_pipeline_stops_the_generator() {
        let (done_sender, mut done_receiver) = mpsc::channel(1);

        let pipeline = Pipeline::from_generator(move |sink| async move {
            let mut i = 0;
            let res = loop {
                if let Err(e) = sink.send(i).await {
                    break e;
                }
                i += 1;
            };
            done_sender.send(res).await.unwrap();
            Ok(())
        })
        .map(|x| x + 1);

        drop(pipeline);

        assert_eq!(done_receiver.recv().await, Some(Error::Closed));
    }
}
