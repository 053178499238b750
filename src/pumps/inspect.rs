use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::pump::{spawn_stage, Pump, StageContext, Step};
use crate::Result;

pub struct InspectPump<F> {
    pub(crate) inspect_fn: F,
}

impl<In, F> Pump<In, In> for InspectPump<F>
where
    F: FnMut(&In) + Send + 'static,
    In: Send + 'static,
{
    fn spawn(
        self,
        input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<In>, JoinHandle<Result<()>>) {
        let name = Pump::<In, In>::name(&self);
        let mut inspect_fn = self.inspect_fn;

        spawn_stage(name, input_receiver, ctx, move |input| {
            inspect_fn(&input);
            Step::Emit(input)
        })
    }

    fn name(&self) -> &'static str {
        "inspect"
    }
}
