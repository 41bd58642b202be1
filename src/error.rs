//! Error taxonomy shared by the store, the puzzle service and the chat bridge.
//!
//! None of these are fatal: handlers turn them into user-visible error replies
//! and the process keeps serving.

#[derive(Debug, thiserror::Error)]
pub enum RiddleError {
    #[error("Riddle not found: {0}")]
    NotFound(String),
    #[error("Riddle store unavailable: {0}")]
    StoreUnavailable(String),
    /// Normalized façade error wrapping any transport failure.
    #[error("Riddle service error: {0}")]
    Service(String),
    #[error("AI service unavailable: no API key configured")]
    AiServiceUnavailable,
    #[error("AI request failed: {0}")]
    AiRequestFailed(String),
    #[error("Could not parse AI response: {0}")]
    EvaluationParseError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, RiddleError>;

impl From<reqwest::Error> for RiddleError {
    fn from(e: reqwest::Error) -> Self {
        RiddleError::StoreUnavailable(e.to_string())
    }
}
