//! Error types

use thiserror::Error;

/// A dotted address could not be resolved against an object graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot resolve `{segment}` while walking `{path}`")]
pub struct PathError {
    /// The full address being resolved
    pub path: String,
    /// The intermediate segment that was absent or not an object
    pub segment: String,
}

/// Binding failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A data or target path did not resolve
    #[error(transparent)]
    Path(#[from] PathError),

    /// A convenience binder key did not match the shape of its binder
    #[error("invalid binder `{0}`")]
    InvalidBinder(String),

    /// The data object already carries a back-reference to another element
    #[error("data object is already bound to a different element")]
    ElementAlreadyAttached,
}

/// Observable sequence failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// Index outside the directly addressable slots
    #[error("index {index} is beyond the sequence capacity of {capacity}")]
    BeyondCapacity { index: usize, capacity: usize },
}

/// Template instantiation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// No element carries the requested id
    #[error("template not found: {0}")]
    NotFound(String),
}
