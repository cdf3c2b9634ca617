use thiserror::Error;

use crate::{KeyId, ParameterLocation};

/// Failure of a checked blackboard access.
///
/// A plain miss is not an error; only a value stored under the key with a different type is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard type mismatch for key {key} (expected {expected})")]
    TypeMismatch { key: KeyId, expected: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("task parameter unresolved (location: {location:?}, no blackboard value and no user value)")]
    Unresolved { location: ParameterLocation },

    #[error(transparent)]
    Blackboard(#[from] BlackboardError),
}
