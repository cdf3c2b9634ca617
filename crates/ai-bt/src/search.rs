//! Structural search and in-place editing.
//!
//! Tasks have no parent pointers; a node's position is described by the child indices leading to
//! it from the root.

use std::fmt;
use std::sync::Arc;

use crate::{Children, Task, TaskRef, TreeError};

/// Child indices from the root down to a task. The root itself has the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskPath(Vec<usize>);

impl TaskPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Path of the containing task; `None` for the root.
    pub fn parent(&self) -> Option<&[usize]> {
        self.0.split_last().map(|(_, parent)| parent)
    }

    /// Index within the parent; `None` for the root.
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }
}

impl From<Vec<usize>> for TaskPath {
    fn from(path: Vec<usize>) -> Self {
        Self(path)
    }
}

impl fmt::Display for TaskPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

/// A task found by [`find_tasks`] together with where it lives.
#[derive(Debug, Clone)]
pub struct TaskMatch {
    pub task: TaskRef,
    /// `None` when the match is the root.
    pub parent: Option<TaskRef>,
    pub path: TaskPath,
}

impl TaskMatch {
    pub fn index(&self) -> Option<usize> {
        self.path.index()
    }
}

/// Every task under `root` (root included) matching `predicate`, in pre-order.
///
/// Matches hold extra handles to the tasks they name; drop them before editing the tree through
/// [`children_at_mut`].
pub fn find_tasks(root: &TaskRef, mut predicate: impl FnMut(&dyn Task) -> bool) -> Vec<TaskMatch> {
    let mut found = Vec::new();
    visit(root, None, TaskPath::root(), &mut predicate, &mut found);
    found
}

fn visit(
    task: &TaskRef,
    parent: Option<&TaskRef>,
    path: TaskPath,
    predicate: &mut impl FnMut(&dyn Task) -> bool,
    found: &mut Vec<TaskMatch>,
) {
    if predicate(task.as_ref()) {
        found.push(TaskMatch {
            task: task.clone(),
            parent: parent.cloned(),
            path: path.clone(),
        });
    }
    if let Some(children) = task.children() {
        for (index, child) in children.iter().enumerate() {
            visit(child, Some(task), path.child(index), predicate, found);
        }
    }
}

pub fn task_at<'a>(root: &'a TaskRef, path: &[usize]) -> Option<&'a TaskRef> {
    path.iter()
        .try_fold(root, |task, &index| task.children()?.get(index))
}

/// Child container of the task at `path`, reached through exclusively owned handles.
///
/// Fails with [`TreeError::SharedSubtree`] if any handle on the way (root included) is shared, and
/// with [`TreeError::InvalidPath`] if the path leaves the tree or ends on a leaf.
pub fn children_at_mut<'a>(
    root: &'a mut TaskRef,
    path: &[usize],
) -> Result<&'a mut Children, TreeError> {
    let invalid = || TreeError::InvalidPath {
        path: path.to_vec(),
    };

    let mut node = root;
    for (depth, &index) in path.iter().enumerate() {
        let task = Arc::get_mut(node).ok_or_else(|| TreeError::SharedSubtree {
            path: path[..depth].to_vec(),
        })?;
        node = task
            .children_mut()
            .and_then(|children| children.get_mut(index))
            .ok_or_else(invalid)?;
    }
    let task = Arc::get_mut(node).ok_or_else(|| TreeError::SharedSubtree {
        path: path.to_vec(),
    })?;
    task.children_mut().ok_or_else(invalid)
}

/// Checks, without editing, that [`children_at_mut`] would succeed for `path`.
pub(crate) fn ensure_editable(root: &TaskRef, path: &[usize]) -> Result<(), TreeError> {
    let mut node = root;
    for depth in 0..=path.len() {
        if Arc::strong_count(node) != 1 || Arc::weak_count(node) != 0 {
            return Err(TreeError::SharedSubtree {
                path: path[..depth].to_vec(),
            });
        }
        let children = node.children().ok_or_else(|| TreeError::InvalidPath {
            path: path.to_vec(),
        })?;
        if let Some(&index) = path.get(depth) {
            node = children.get(index).ok_or_else(|| TreeError::InvalidPath {
                path: path.to_vec(),
            })?;
        }
    }
    Ok(())
}
