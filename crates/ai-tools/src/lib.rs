//! Tooling primitives for behavior tree execution.
//!
//! This crate is intentionally lightweight and engine-agnostic. Inspectors and debug views should
//! consume [`TraceEvent`]s rather than reach into task or agent state.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{
    NullTraceSink, SharedTraceLog, TraceEvent, TraceLog, TracePhase, TraceSink, VecTraceSink,
};
