//! Utility AI selection primitives.
//!
//! Score a set of options and run the highest-scoring one. Tie-breaking is stable by option order
//! for determinism.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod policy;
#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub mod bt;

pub use policy::{sanitize_score, select_best, UtilityConfig};
#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use bt::UtilitySelector;
