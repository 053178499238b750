use std::{any::Any, marker::PhantomData};

use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::pump::{spawn_stage, Pump, StageContext, Step};
use crate::{Error, Result};

/// A type-erased element, produced wherever a pipeline changes its element type dynamically
pub type Dynamic = Box<dyn Any + Send>;

/// Narrows [`Dynamic`] elements to `U`, dropping elements of any other type.
pub struct RecastPump<U> {
    pub(crate) _target: PhantomData<fn() -> U>,
}

impl<U> Pump<Dynamic, U> for RecastPump<U>
where
    U: Any + Send,
{
    fn spawn(
        self,
        input_receiver: Receiver<Dynamic>,
        ctx: StageContext,
    ) -> (Receiver<U>, JoinHandle<Result<()>>) {
        let mut dropped = 0usize;

        spawn_stage(Pump::<Dynamic, U>::name(&self), input_receiver, ctx, move |input| {
            match input.downcast::<U>() {
                Ok(output) => Step::Emit(*output),
                Err(_) => {
                    dropped += 1;
                    tracing::warn!(
                        dropped,
                        expected = std::any::type_name::<U>(),
                        "recast dropped a mismatching element"
                    );
                    Step::Skip
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "recast"
    }
}

/// Narrows [`Dynamic`] elements to `U`, reporting mismatches as [`Error::TypeMismatch`].
pub struct TryRecastPump<U> {
    pub(crate) _target: PhantomData<fn() -> U>,
}

impl<U> Pump<Dynamic, Result<U>> for TryRecastPump<U>
where
    U: Any + Send,
{
    fn spawn(
        self,
        input_receiver: Receiver<Dynamic>,
        ctx: StageContext,
    ) -> (Receiver<Result<U>>, JoinHandle<Result<()>>) {
        spawn_stage(Pump::<Dynamic, Result<U>>::name(&self), input_receiver, ctx, |input| {
            Step::Emit(
                input
                    .downcast::<U>()
                    .map(|output| *output)
                    .map_err(|_| Error::TypeMismatch {
                        expected: std::any::type_name::<U>(),
                    }),
            )
        })
    }

    fn name(&self) -> &'static str {
        "try_recast"
    }
}
