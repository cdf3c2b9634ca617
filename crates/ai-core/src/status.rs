#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of activating or updating a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
}

impl ExecutionStatus {
    pub fn from_success(success: bool) -> Self {
        if success {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        }
    }

    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, ExecutionStatus::Running)
    }

    /// `true` for `Success` and `Failed`: the caller must deactivate the task.
    #[inline]
    pub fn is_finished(self) -> bool {
        !self.is_running()
    }

    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}
