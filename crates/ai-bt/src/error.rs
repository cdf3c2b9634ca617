use thiserror::Error;

/// Structural errors raised while building, editing or resolving a tree.
///
/// These are construction-time failures: a tree that produced one must not be ticked. Runtime
/// problems (blackboard misses, unresolved parameters) never surface as `TreeError`; tasks turn them
/// into a rejected decision or a `Failed` status instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("child capacity of {capacity} exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("child index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("task is not a child of this container")]
    NotAChild,

    #[error("sub-tree reference to unknown tree {name:?}")]
    UnresolvedReference { name: String },

    #[error("library already contains a tree named {name:?}")]
    DuplicateTree { name: String },

    #[error("library has no tree named {name:?}")]
    UnknownTree { name: String },

    #[error("task at {path:?} is shared and cannot be edited in place")]
    SharedSubtree { path: Vec<usize> },

    #[error("no child container at {path:?}")]
    InvalidPath { path: Vec<usize> },

    #[error("sub-tree references form a cycle through {names:?}")]
    ReferenceCycle { names: Vec<String> },
}
