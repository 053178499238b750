use std::future::Future;

use futures::{future::BoxFuture, FutureExt, Stream, StreamExt};
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use crate::{
    pumps::pump::{Pump, StageContext},
    sink::{spawn_source, Sink},
    stages::Stages,
    Capacity, Error, Result, Sequence,
};

/// A receiver together with every task feeding it. Both pipeline kinds are built on top of this.
pub(crate) struct Chain<Out> {
    output_receiver: Receiver<Out>,
    stages: Stages,
    cancel: CancellationToken,
}

impl<Out> From<Receiver<Out>> for Chain<Out> {
    fn from(receiver: Receiver<Out>) -> Self {
        Chain {
            output_receiver: receiver,
            stages: Stages::default(),
            cancel: CancellationToken::new(),
        }
    }
}

impl<Out> Chain<Out>
where
    Out: Send + 'static,
{
    pub(crate) fn from_generator<G, Fut>(name: &'static str, capacity: Capacity, generator: G) -> Self
    where
        G: FnOnce(Sink<Out>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let ctx = StageContext {
            capacity,
            cancel: cancel.clone(),
        };

        let (output_receiver, h) = spawn_source(name, ctx, generator);
        let mut stages = Stages::default();
        stages.push(name, h);

        Chain {
            output_receiver,
            stages,
            cancel,
        }
    }

    pub(crate) fn from_iter<I>(capacity: Capacity, iter: I) -> Self
    where
        I: IntoIterator<Item = Out> + Send + 'static,
        <I as IntoIterator>::IntoIter: Send,
    {
        Self::from_generator("source", capacity, |sink| async move {
            for output in iter {
                sink.send(output).await?;
            }
            Ok(())
        })
    }

    pub(crate) fn from_stream<S>(capacity: Capacity, stream: S) -> Self
    where
        S: Stream<Item = Out> + Send + 'static,
    {
        Self::from_generator("source", capacity, |sink| async move {
            tokio::pin!(stream);
            while let Some(output) = stream.next().await {
                sink.send(output).await?;
            }
            Ok(())
        })
    }

    pub(crate) fn pump<P, T>(self, pump: P, capacity: Capacity) -> Chain<T>
    where
        P: Pump<Out, T>,
    {
        let name = pump.name();
        let ctx = StageContext {
            capacity,
            cancel: self.cancel.clone(),
        };

        let (output_receiver, join_handle) = pump.spawn(self.output_receiver, ctx);
        let mut stages = self.stages;
        stages.push(name, join_handle);

        Chain {
            output_receiver,
            stages,
            cancel: self.cancel,
        }
    }

    /// Drains the chain into `fold_fn`, then joins every task.
    ///
    /// A stage fault wins over cancellation, cancellation wins over the folded value.
    pub(crate) async fn fold<A, F>(self, init: A, mut fold_fn: F) -> Result<A>
    where
        F: FnMut(A, Out) -> A,
    {
        let Chain {
            mut output_receiver,
            stages,
            cancel,
        } = self;

        let mut acc = init;
        let mut cancelled = false;

        loop {
            let output = tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                output = output_receiver.recv() => output,
            };

            match output {
                Some(output) => acc = fold_fn(acc, output),
                None => break,
            }
        }

        drop(output_receiver);
        stages.join().await?;

        if cancelled {
            return Err(Error::Cancelled);
        }

        Ok(acc)
    }

    pub(crate) async fn to_sequence(self) -> Result<Sequence<Out>> {
        let items = self
            .fold(Vec::new(), |mut items, output| {
                items.push(output);
                items
            })
            .await?;

        Ok(Sequence::from(items))
    }

    pub(crate) fn build(self) -> (Receiver<Out>, BoxFuture<'static, Result<()>>) {
        (self.output_receiver, self.stages.join().boxed())
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
