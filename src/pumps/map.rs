use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::pump::{spawn_stage, Pump, StageContext, Step};
use crate::Result;

pub struct MapPump<F> {
    pub(crate) map_fn: F,
}

impl<In, Out, F> Pump<In, Out> for MapPump<F>
where
    F: FnMut(In) -> Out + Send + 'static,
    In: Send + 'static,
    Out: Send + 'static,
{
    fn spawn(
        self,
        input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<Out>, JoinHandle<Result<()>>) {
        let name = Pump::<In, Out>::name(&self);
        let mut map_fn = self.map_fn;

        spawn_stage(name, input_receiver, ctx, move |input| {
            Step::Emit(map_fn(input))
        })
    }

    fn name(&self) -> &'static str {
        "map"
    }
}
