use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use tokio::task::JoinHandle;

use crate::{Error, Result};

/// The tasks feeding a pipeline, each resolving to its own outcome
#[derive(Default)]
pub(crate) struct Stages {
    handles: FuturesUnordered<BoxFuture<'static, Result<()>>>,
}

impl Stages {
    pub(crate) fn push(&mut self, stage: &'static str, handle: JoinHandle<Result<()>>) {
        self.handles.push(
            handle
                .map(move |res| match res {
                    Ok(res) => res,
                    Err(e) => Err(Error::fault(stage, e)),
                })
                .boxed(),
        );
    }

    /// Waits for every task and returns the first failure
    pub(crate) async fn join(mut self) -> Result<()> {
        let mut first_err = None;

        while let Some(res) = self.handles.next().await {
            if let Err(e) = res {
                tracing::error!(error = %e, "pipeline stage failed");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
