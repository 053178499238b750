use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::pump::{spawn_stage, Pump, StageContext, Step};
use crate::Result;

pub struct TakePump {
    pub(crate) n: usize,
}

impl<In> Pump<In, In> for TakePump
where
    In: Send + 'static,
{
    fn spawn(
        self,
        mut input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<In>, JoinHandle<Result<()>>) {
        let name = Pump::<In, In>::name(&self);
        let mut remaining = self.n;

        if remaining == 0 {
            // nothing will be forwarded, don't wait for upstream
            input_receiver.close();
        }

        spawn_stage(name, input_receiver, ctx, move |input| match remaining {
            0 => Step::Stop,
            1 => {
                remaining = 0;
                Step::Last(input)
            }
            _ => {
                remaining -= 1;
                Step::Emit(input)
            }
        })
    }

    fn name(&self) -> &'static str {
        "take"
    }
}
