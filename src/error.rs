use std::{any::Any, fmt::Display};

use thiserror::Error;
use tokio::task::JoinError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An erased element did not hold the type requested by `try_recast`
    #[error("element is not a `{expected}`")]
    TypeMismatch { expected: &'static str },

    /// A stage or generator task panicked
    #[error("stage `{stage}` faulted: {message}")]
    StageFault {
        stage: &'static str,
        message: String,
    },

    #[error("pipeline cancelled")]
    Cancelled,

    /// The receiving side of a channel is gone
    #[error("downstream channel closed")]
    Closed,

    #[error("generator failed: {0}")]
    Generator(String),
}

impl Error {
    pub fn generator(err: impl Display) -> Self {
        Self::Generator(err.to_string())
    }

    pub(crate) fn fault(stage: &'static str, err: JoinError) -> Self {
        let message = if err.is_panic() {
            panic_message(err.into_panic())
        } else {
            "task aborted".to_string()
        };

        Self::StageFault { stage, message }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => message.to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}
