use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::pump::{spawn_stage, Pump, StageContext, Step};
use crate::Result;

pub struct FilterPump<F> {
    pub(crate) predicate: F,
}

impl<In, F> Pump<In, In> for FilterPump<F>
where
    F: FnMut(&In) -> bool + Send + 'static,
    In: Send + 'static,
{
    fn spawn(
        self,
        input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<In>, JoinHandle<Result<()>>) {
        let name = Pump::<In, In>::name(&self);
        let mut predicate = self.predicate;

        spawn_stage(name, input_receiver, ctx, move |input| {
            if predicate(&input) {
                Step::Emit(input)
            } else {
                Step::Skip
            }
        })
    }

    fn name(&self) -> &'static str {
        "filter"
    }
}
