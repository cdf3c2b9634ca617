use std::sync::Arc;

use crate::{ObserverId, Observers, TaskRef, TreeError};

/// Structural change reported to child observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildEvent {
    Added { index: usize, name: String },
    Removed { index: usize, name: String },
    Moved { from: usize, to: usize },
}

/// Ordered child list of a composite or decorator, with an optional capacity.
///
/// Every failing operation leaves the list untouched. Observers are notified after each
/// successful mutation.
#[derive(Debug, Default)]
pub struct Children {
    tasks: Vec<TaskRef>,
    capacity: Option<usize>,
    observers: Observers<ChildEvent>,
}

impl Children {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// The single slot of a decorator.
    pub fn single() -> Self {
        Self::with_capacity_limit(1)
    }

    pub(crate) fn from_tasks(tasks: Vec<TaskRef>, capacity: Option<usize>) -> Self {
        debug_assert!(capacity.is_none_or(|c| tasks.len() <= c));
        Self {
            tasks,
            capacity,
            observers: Observers::default(),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|c| self.tasks.len() >= c)
    }

    pub fn get(&self, index: usize) -> Option<&TaskRef> {
        self.tasks.get(index)
    }

    pub fn first(&self) -> Option<&TaskRef> {
        self.tasks.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskRef> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[TaskRef] {
        &self.tasks
    }

    /// Position of `task` by identity, not by name.
    pub fn index_of(&self, task: &TaskRef) -> Option<usize> {
        self.tasks
            .iter()
            .position(|child| std::ptr::addr_eq(Arc::as_ptr(child), Arc::as_ptr(task)))
    }

    /// Construction-time append for unbounded containers; observers are not notified.
    pub(crate) fn push(&mut self, task: TaskRef) {
        debug_assert!(self.capacity.is_none());
        self.tasks.push(task);
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut TaskRef> {
        self.tasks.get_mut(index)
    }

    pub fn add(&mut self, task: TaskRef) -> Result<usize, TreeError> {
        let index = self.tasks.len();
        self.insert(index, task)?;
        Ok(index)
    }

    pub fn insert(&mut self, index: usize, task: TaskRef) -> Result<(), TreeError> {
        if let Some(capacity) = self.capacity {
            if self.tasks.len() >= capacity {
                return Err(TreeError::CapacityExceeded { capacity });
            }
        }
        if index > self.tasks.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.tasks.len(),
            });
        }

        let name = task.name().to_owned();
        self.tasks.insert(index, task);
        self.observers.notify(&ChildEvent::Added { index, name });
        Ok(())
    }

    /// Removes `task` if it is one of the children (by identity) and returns its former index.
    pub fn remove(&mut self, task: &TaskRef) -> Result<usize, TreeError> {
        let index = self.index_of(task).ok_or(TreeError::NotAChild)?;
        self.remove_at(index)?;
        Ok(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<TaskRef, TreeError> {
        if index >= self.tasks.len() {
            return Err(TreeError::IndexOutOfRange {
                index,
                len: self.tasks.len(),
            });
        }

        let task = self.tasks.remove(index);
        self.observers.notify(&ChildEvent::Removed {
            index,
            name: task.name().to_owned(),
        });
        Ok(task)
    }

    /// Moves the child at `from` so that it ends up at index `to`.
    pub fn move_child(&mut self, from: usize, to: usize) -> Result<(), TreeError> {
        let len = self.tasks.len();
        for index in [from, to] {
            if index >= len {
                return Err(TreeError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        self.observers.notify(&ChildEvent::Moved { from, to });
        Ok(())
    }

    pub fn subscribe(
        &mut self,
        listener: impl Fn(&ChildEvent) + Send + Sync + 'static,
    ) -> ObserverId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }
}

/// Collects into an unbounded container.
impl FromIterator<TaskRef> for Children {
    fn from_iter<I: IntoIterator<Item = TaskRef>>(iter: I) -> Self {
        Self::from_tasks(iter.into_iter().collect(), None)
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = &'a TaskRef;
    type IntoIter = std::slice::Iter<'a, TaskRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}
