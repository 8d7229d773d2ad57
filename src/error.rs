use thiserror::Error;

/// Failures surfaced while configuring or mounting a frame sequence.
///
/// Frame load failures and degenerate scroll geometry are not represented
/// here: they degrade the picture, they never fail the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("sequence must contain at least one frame")]
    EmptySequence,

    #[error("max_in_flight must be greater than zero when set")]
    ZeroConcurrency,

    #[error("invalid sequence config: {0}")]
    Config(String),

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("missing element #{0}")]
    ElementNotFound(String),

    #[error("element #{0} has unexpected type")]
    ElementType(String),

    #[error("2d canvas context unavailable")]
    ContextUnavailable,
}

impl From<serde_json::Error> for SequenceError {
    fn from(err: serde_json::Error) -> Self {
        SequenceError::Config(err.to_string())
    }
}

pub type SequenceResult<T> = Result<T, SequenceError>;
