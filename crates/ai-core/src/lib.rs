//! Deterministic, engine-agnostic AI kernel primitives.
//!
//! Hierarchical blackboards, typed keys and blackboard-bound task parameters shared by the
//! behavior tree runtime and its tooling.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod error;
pub mod param;
pub mod status;

pub use blackboard::{BbKey, Blackboard, BlackboardRef, KeyId};
pub use error::{BlackboardError, ParameterError};
pub use param::{ParameterLocation, TaskParameter};
pub use status::ExecutionStatus;
