use crate::puzzle::common::Face;
use crate::puzzle::notation::Move;

/// A move token that does not follow the notation grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid move token {0:?}")]
    InvalidToken(String),
}

/// Errors from the cube core.
///
/// Everything except [`Error::Parse`] indicates a bug: the operation that
/// produced it is aborted and the cube state is left as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("face {face} selected {count} cubelets instead of 9")]
    InvalidMove { face: Face, count: usize },
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error("animation of {0} completed twice")]
    DoubleCompletion(Move),
    #[error("a twist is already being animated")]
    AnimationInFlight,
}
