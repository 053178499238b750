use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::pump::{spawn_stage, Pump, StageContext, Step};
use crate::Result;

/// Moves elements unchanged into a channel sized by the stage context.
/// This is how a pipeline switches between hand-off and buffered channels.
pub struct RelayPump;

impl<In> Pump<In, In> for RelayPump
where
    In: Send + 'static,
{
    fn spawn(
        self,
        input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<In>, JoinHandle<Result<()>>) {
        let name = Pump::<In, In>::name(&self);
        spawn_stage(name, input_receiver, ctx, Step::Emit)
    }

    fn name(&self) -> &'static str {
        "relay"
    }
}
