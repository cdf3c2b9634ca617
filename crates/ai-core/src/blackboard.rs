use std::any::{type_name, Any};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::BlackboardError;

/// Untyped blackboard key: a stable numeric id or a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KeyId {
    Id(u64),
    Name(Cow<'static, str>),
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyId::Id(id) => write!(f, "#{id}"),
            KeyId::Name(name) => write!(f, "{name:?}"),
        }
    }
}

impl From<u64> for KeyId {
    fn from(value: u64) -> Self {
        KeyId::Id(value)
    }
}

impl From<&'static str> for KeyId {
    fn from(value: &'static str) -> Self {
        KeyId::Name(Cow::Borrowed(value))
    }
}

impl From<String> for KeyId {
    fn from(value: String) -> Self {
        KeyId::Name(Cow::Owned(value))
    }
}

/// Typed handle to a blackboard entry.
pub struct BbKey<T: 'static> {
    id: KeyId,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: 'static> fmt::Debug for BbKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BbKey").field(&self.id).finish()
    }
}

impl<T: 'static> PartialEq for BbKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: 'static> Eq for BbKey<T> {}

impl<T: 'static> std::hash::Hash for BbKey<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(id: u64) -> Self {
        Self {
            id: KeyId::Id(id),
            _phantom: PhantomData,
        }
    }

    pub const fn named(name: &'static str) -> Self {
        Self {
            id: KeyId::Name(Cow::Borrowed(name)),
            _phantom: PhantomData,
        }
    }

    pub fn from_id(id: impl Into<KeyId>) -> Self {
        Self {
            id: id.into(),
            _phantom: PhantomData,
        }
    }

    pub fn id(&self) -> &KeyId {
        &self.id
    }
}

type Value = Arc<dyn Any + Send + Sync>;

/// Shared blackboard handle. Agents, scopes and templates all hold blackboards this way.
pub type BlackboardRef = Arc<Blackboard>;

/// Key/value store with an ordered list of parent scopes consulted on a miss.
///
/// Lookup order is the blackboard's own entries, then each parent depth-first in declaration
/// order; the first hit wins. Parents are held weakly: a blackboard never keeps its parents alive,
/// and a parent that has been dropped is skipped. Parents are fixed once the blackboard is shared,
/// so a parent chain can never loop back on itself.
///
/// Writes and removals only ever touch the blackboard's own entries.
#[derive(Default)]
pub struct Blackboard {
    values: RwLock<BTreeMap<KeyId, Value>>,
    parents: Vec<Weak<Blackboard>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parents<'a>(parents: impl IntoIterator<Item = &'a BlackboardRef>) -> Self {
        Self {
            values: RwLock::default(),
            parents: parents.into_iter().map(Arc::downgrade).collect(),
        }
    }

    pub fn into_ref(self) -> BlackboardRef {
        Arc::new(self)
    }

    /// Appends a parent with the lowest lookup priority so far.
    pub fn add_parent(&mut self, parent: &BlackboardRef) {
        self.parents.push(Arc::downgrade(parent));
    }

    /// Parents that are still alive, in lookup order.
    pub fn parents(&self) -> impl Iterator<Item = BlackboardRef> + '_ {
        self.parents.iter().filter_map(Weak::upgrade)
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// `true` if the key resolves anywhere along the parent chain.
    pub fn contains<T: 'static>(&self, key: &BbKey<T>) -> bool {
        self.lookup(&key.id).is_some()
    }

    /// `true` if the key is stored in this blackboard itself.
    pub fn contains_local<T: 'static>(&self, key: &BbKey<T>) -> bool {
        self.values.read().contains_key(&key.id)
    }

    pub fn set_value<T: Send + Sync + 'static>(&self, key: &BbKey<T>, value: T) {
        self.values.write().insert(key.id.clone(), Arc::new(value));
    }

    /// Checked lookup along the parent chain.
    ///
    /// `Ok(None)` is a miss. A value of another type under the same key is an error rather than a
    /// miss so callers can tell a wiring mistake from absent data.
    pub fn try_get_value<T: Clone + 'static>(
        &self,
        key: &BbKey<T>,
    ) -> Result<Option<T>, BlackboardError> {
        let Some(value) = self.lookup(&key.id) else {
            return Ok(None);
        };
        value
            .downcast_ref::<T>()
            .cloned()
            .map(Some)
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.id.clone(),
                expected: type_name::<T>(),
            })
    }

    /// Lenient lookup: a type mismatch is logged and reported as a miss.
    pub fn get<T: Clone + 'static>(&self, key: &BbKey<T>) -> Option<T> {
        match self.try_get_value(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "treating blackboard entry as missing");
                None
            }
        }
    }

    /// Removes the entry from this blackboard (parents are untouched).
    ///
    /// Returns the removed value when it has the requested type.
    pub fn remove_value<T: Clone + Send + Sync + 'static>(&self, key: &BbKey<T>) -> Option<T> {
        let value = self.values.write().remove(&key.id)?;
        let value = value.downcast::<T>().ok()?;
        Some(Arc::try_unwrap(value).unwrap_or_else(|shared| (*shared).clone()))
    }

    fn lookup(&self, id: &KeyId) -> Option<Value> {
        let own = self.values.read().get(id).cloned();
        if own.is_some() {
            return own;
        }
        self.parents
            .iter()
            .filter_map(Weak::upgrade)
            .find_map(|parent| parent.lookup(id))
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.read();
        f.debug_struct("Blackboard")
            .field("keys", &values.keys().collect::<Vec<_>>())
            .field("parents", &self.parents.len())
            .finish()
    }
}
