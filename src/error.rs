use thiserror::Error;

/// Failures surfaced by the pattern core.
///
/// Gesture input never produces these: misses, re-hits of used cells and
/// cancellations are ordinary control flow.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("cell coordinate ({row}, {column}) is outside the 3x3 grid")]
    InvalidCoordinate { row: i32, column: i32 },

    #[error("malformed pattern string {input:?}: {reason}")]
    MalformedPattern { input: String, reason: String },

    #[error("animate mode requires a non-empty pattern")]
    EmptyPatternAnimation,

    #[error("unknown display mode ordinal {0}")]
    UnknownDisplayMode(i32),
}

pub type Result<T> = std::result::Result<T, PatternError>;
