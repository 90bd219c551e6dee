use std::borrow::Cow;

use crate::model::{EntryBounds, PromptId, PromptState};

/// Every failure a prompt can report.
///
/// None of these are fatal: a rejected submission leaves the prompt open for
/// another try, and the factory failures simply mean no dialog was shown.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Neither the target nor the caller resolved to a live user.
    #[error("no user could be resolved for the prompt target")]
    UnresolvedTarget,

    #[error("invalid entry bounds: {0}")]
    InvalidBounds(Cow<'static, str>),

    /// The entry length fell outside the configured bounds.
    #[error("entry length {length} is outside of {bounds}")]
    OutOfBounds { length: usize, bounds: EntryBounds },

    #[error("prompt {id} is no longer open ({state})")]
    NotOpen { id: PromptId, state: PromptState },

    #[error("malformed action payload: {0}")]
    MalformedAction(#[from] serde_json::Error),
}

impl PromptError {
    /// Whether the prompt that produced this error is still waiting for input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PromptError::OutOfBounds { .. })
    }
}
