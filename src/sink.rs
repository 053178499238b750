use std::future::Future;

use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{
    pumps::pump::{deliver, StageContext},
    Capacity, Error, Result,
};

/// The write end handed to a generator.
///
/// A `Sink` can only send. The channel behind it is closed by the pipeline once the generator
/// returns, so a generator never has to (and cannot) close it.
///
/// ```rust
/// use sluice::Pipeline;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let output = Pipeline::from_generator(|sink| async move {
///     for x in 1..=3 {
///         sink.send(x).await?;
///     }
///     Ok(())
/// })
/// .to_sequence()
/// .await
/// .unwrap();
///
/// assert_eq!(output.into_vec(), vec![1, 2, 3]);
/// # });
/// ```
#[derive(Debug)]
pub struct Sink<T> {
    sender: Sender<T>,
    capacity: Capacity,
    cancel: CancellationToken,
}

impl<T> Sink<T> {
    /// Sends one element, waiting while the channel is full. In a hand-off pipeline it returns
    /// once the next stage received the element.
    ///
    /// Fails with [`Error::Closed`] when the pipeline stopped reading, and with
    /// [`Error::Cancelled`] when the pipeline was cancelled. Either way the generator should stop.
    pub async fn send(&self, item: T) -> Result<()> {
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            res = deliver(&self.sender, item, self.capacity) => res,
        }
    }

    /// Whether sending can still succeed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed() || self.cancel.is_cancelled()
    }
}

/// Spawns the source task of a pipeline, running `generator` and closing the channel once it
/// returns.
pub(crate) fn spawn_source<T, G, Fut>(
    name: &'static str,
    ctx: StageContext,
    generator: G,
) -> (Receiver<T>, JoinHandle<Result<()>>)
where
    T: Send + 'static,
    G: FnOnce(Sink<T>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(ctx.capacity.get());
    let span = tracing::debug_span!("sluice.stage", stage = name, capacity = ctx.capacity.get());

    let cancel = ctx.cancel.clone();
    let sink = Sink {
        sender,
        capacity: ctx.capacity,
        cancel: ctx.cancel,
    };

    let h = tokio::spawn(
        async move {
            // the sink moves into the generator, the channel closes when it is dropped.
            // A generator waiting on anything but the sink is dropped on cancellation.
            let res = tokio::select! {
                biased;

                res = generator(sink) => res,
                _ = cancel.cancelled() => {
                    tracing::debug!("cancelled while generating");
                    return Ok(());
                }
            };

            match res {
                Ok(()) => Ok(()),
                Err(Error::Closed) => {
                    tracing::debug!("downstream closed");
                    Ok(())
                }
                Err(Error::Cancelled) => {
                    tracing::debug!("cancelled while sending");
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        .instrument(span),
    );

    (receiver, h)
}
