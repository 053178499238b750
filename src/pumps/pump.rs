use tokio::{
    sync::mpsc::{self, Receiver, Sender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::{Capacity, Error, Result};

/// A `Pump` is a component that data flows through, processed, and flows out.
/// It is a wrapper around an input receiver, a task and an output sender.
///
/// Implementations should size their output channel with [`StageContext::capacity`] and stop
/// once [`StageContext::cancel`] is cancelled. The built-in stages additionally wait for their
/// consumer after every send when the capacity is [`Capacity::handoff`].
pub trait Pump<In, Out> {
    /// Spawns the pumps task and returns the output receiver and the tasks join handle
    fn spawn(
        self,
        input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<Out>, JoinHandle<Result<()>>);

    /// Name reported in logs and in [`crate::Error::StageFault`]
    fn name(&self) -> &'static str {
        "pump"
    }
}

/// What a stage gets from the pipeline it is attached to
#[derive(Debug, Clone)]
pub struct StageContext {
    pub capacity: Capacity,
    pub cancel: CancellationToken,
}

/// Outcome of processing one input element
pub(crate) enum Step<Out> {
    Emit(Out),
    /// Emit, then stop reading input
    Last(Out),
    Skip,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StageState {
    Running,
    Draining,
    Closed,
}

/// Sends `item` downstream. On a hand-off channel this also waits until the consumer received it.
pub(crate) async fn deliver<T>(sender: &Sender<T>, item: T, capacity: Capacity) -> Result<()> {
    sender.send(item).await.map_err(|_| Error::Closed)?;

    if capacity.is_handoff() {
        // the single slot frees up once the element was taken
        let permit = sender.reserve().await.map_err(|_| Error::Closed)?;
        drop(permit);
    }

    Ok(())
}

/// Spawns the task behind a one-in one-out stage.
///
/// The task reads `input_receiver` in FIFO order until it closes, hands every element to
/// `on_input` and forwards what it emits. Its output channel closes when the task ends, whether
/// upstream closed, downstream went away, the chain was cancelled or `on_input` panicked.
pub(crate) fn spawn_stage<In, Out, F>(
    name: &'static str,
    mut input_receiver: Receiver<In>,
    ctx: StageContext,
    mut on_input: F,
) -> (Receiver<Out>, JoinHandle<Result<()>>)
where
    In: Send + 'static,
    Out: Send + 'static,
    F: FnMut(In) -> Step<Out> + Send + 'static,
{
    let (output_sender, output_receiver) = mpsc::channel(ctx.capacity.get());
    let span = tracing::debug_span!("sluice.stage", stage = name, capacity = ctx.capacity.get());

    let h = tokio::spawn(
        async move {
            tracing::trace!(state = ?StageState::Running);

            loop {
                let input = tokio::select! {
                    biased;

                    _ = ctx.cancel.cancelled() => {
                        tracing::debug!("cancelled while receiving");
                        break;
                    }
                    input = input_receiver.recv() => input,
                };

                let Some(input) = input else {
                    break;
                };

                let (output, last) = match on_input(input) {
                    Step::Emit(output) => (output, false),
                    Step::Last(output) => (output, true),
                    Step::Skip => continue,
                    Step::Stop => break,
                };

                tokio::select! {
                    biased;

                    _ = ctx.cancel.cancelled() => {
                        tracing::debug!("cancelled while sending");
                        break;
                    }
                    res = deliver(&output_sender, output, ctx.capacity) => {
                        if res.is_err() {
                            tracing::debug!("downstream closed");
                            break;
                        }
                    }
                }

                if last {
                    break;
                }
            }

            tracing::trace!(state = ?StageState::Draining);
            // stop upstream from sending into a channel nobody reads anymore
            input_receiver.close();
            drop(output_sender);
            tracing::trace!(state = ?StageState::Closed);

            Ok(())
        }
        .instrument(span),
    );

    (output_receiver, h)
}
