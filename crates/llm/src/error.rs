use thiserror::Error;

use crate::recovery::JsonRecoveryError;

#[derive(Debug, Error)]
pub enum LlmError {
    /// The plan response could not be turned into a structurally valid
    /// master plan. Not retried automatically; the caller re-submits.
    #[error("Master plan response is malformed: {reason}")]
    MalformedPlan { reason: String },

    /// A day's lesson or email defeated every recovery strategy.
    #[error("Day content response is malformed: {0}")]
    MalformedContent(#[from] JsonRecoveryError),

    /// The generator answered with a non-success status, rate limits
    /// included.
    #[error("Upstream generator returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The generator was never reached or the connection died mid-call.
    #[error("Transport error calling the generator: {0}")]
    Transport(#[from] reqwest::Error),
}
