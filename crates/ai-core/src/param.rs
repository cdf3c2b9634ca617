#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BbKey, Blackboard, ParameterError};

/// Where a [`TaskParameter`] takes its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterLocation {
    #[default]
    UserValue,
    Blackboard,
}

/// A task input bound either to a fixed value or to a blackboard entry.
///
/// Resolution is value-then-fallback: a `Blackboard` parameter reads its key and falls back to the
/// user value on a miss. A `UserValue` parameter only ever yields the user value.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskParameter<T: 'static> {
    location: ParameterLocation,
    user_value: Option<T>,
    key: Option<BbKey<T>>,
}

impl<T: Clone + 'static> TaskParameter<T> {
    pub fn value(value: T) -> Self {
        Self {
            location: ParameterLocation::UserValue,
            user_value: Some(value),
            key: None,
        }
    }

    pub fn blackboard(key: BbKey<T>) -> Self {
        Self {
            location: ParameterLocation::Blackboard,
            user_value: None,
            key: Some(key),
        }
    }

    pub fn with_fallback(mut self, value: T) -> Self {
        self.user_value = Some(value);
        self
    }

    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    pub fn user_value(&self) -> Option<&T> {
        self.user_value.as_ref()
    }

    pub fn key(&self) -> Option<&BbKey<T>> {
        self.key.as_ref()
    }

    pub fn try_resolve(&self, blackboard: &Blackboard) -> Result<T, ParameterError> {
        if self.location == ParameterLocation::Blackboard {
            if let Some(key) = &self.key {
                if let Some(value) = blackboard.try_get_value(key)? {
                    return Ok(value);
                }
            }
        }
        self.user_value.clone().ok_or(ParameterError::Unresolved {
            location: self.location,
        })
    }

    /// Like [`try_resolve`](Self::try_resolve) but logs failures and yields `None`.
    pub fn resolve(&self, blackboard: &Blackboard) -> Option<T> {
        match self.try_resolve(blackboard) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(%err, "task parameter did not resolve");
                None
            }
        }
    }
}

impl<T: Clone + 'static> From<T> for TaskParameter<T> {
    fn from(value: T) -> Self {
        Self::value(value)
    }
}
