use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::pump::{spawn_stage, Pump, StageContext, Step};
use crate::Result;

pub struct SkipPump {
    pub(crate) n: usize,
}

impl<In> Pump<In, In> for SkipPump
where
    In: Send + 'static,
{
    fn spawn(
        self,
        input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<In>, JoinHandle<Result<()>>) {
        let name = Pump::<In, In>::name(&self);
        let mut to_skip = self.n;

        spawn_stage(name, input_receiver, ctx, move |input| {
            if to_skip > 0 {
                to_skip -= 1;
                Step::Skip
            } else {
                Step::Emit(input)
            }
        })
    }

    fn name(&self) -> &'static str {
        "skip"
    }
}
