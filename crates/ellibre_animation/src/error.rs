//! Animation errors

use thiserror::Error;

/// Errors raised when starting a tween
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimateError {
    /// The value contains no parseable number
    #[error("unable to animate: `{0}` has no numeric representation")]
    NotNumeric(String),
}
