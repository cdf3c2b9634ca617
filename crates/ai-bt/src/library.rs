use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::search::{self, TaskPath};
use crate::{ObserverId, Observers, TaskRef, TreeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    Added { name: String },
    Replaced { name: String },
    Removed { name: String },
}

/// Named tree roots shared by every agent, and the resolver for sub-tree references against them.
#[derive(Debug, Default)]
pub struct BehaviorTreeLibrary {
    trees: BTreeMap<String, TaskRef>,
    observers: Observers<LibraryEvent>,
}

impl BehaviorTreeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new tree; fails with [`TreeError::DuplicateTree`] if the name is taken.
    pub fn add(&mut self, name: impl Into<String>, root: TaskRef) -> Result<(), TreeError> {
        let name = name.into();
        if self.trees.contains_key(&name) {
            return Err(TreeError::DuplicateTree { name });
        }
        self.trees.insert(name.clone(), root);
        self.observers.notify(&LibraryEvent::Added { name });
        Ok(())
    }

    /// Inserts or replaces a tree, returning the previous root.
    pub fn set(&mut self, name: impl Into<String>, root: TaskRef) -> Option<TaskRef> {
        let name = name.into();
        let previous = self.trees.insert(name.clone(), root);
        let event = match previous {
            Some(_) => LibraryEvent::Replaced { name },
            None => LibraryEvent::Added { name },
        };
        self.observers.notify(&event);
        previous
    }

    pub fn remove(&mut self, name: &str) -> Option<TaskRef> {
        let removed = self.trees.remove(name)?;
        self.observers.notify(&LibraryEvent::Removed {
            name: name.to_owned(),
        });
        Some(removed)
    }

    pub fn get(&self, name: &str) -> Option<&TaskRef> {
        self.trees.get(name)
    }

    pub fn try_get(&self, name: &str) -> Result<&TaskRef, TreeError> {
        self.trees.get(name).ok_or_else(|| TreeError::UnknownTree {
            name: name.to_owned(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.trees.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskRef)> {
        self.trees.iter().map(|(name, root)| (name.as_str(), root))
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn subscribe(
        &mut self,
        listener: impl Fn(&LibraryEvent) + Send + Sync + 'static,
    ) -> ObserverId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Replaces every sub-tree reference in `root` with the library tree it names.
    ///
    /// A reference at the root replaces `root` itself. Elsewhere, each reference is removed from its
    /// parent and its resolution inserted at the same index. References with an empty tree name are
    /// left in place.
    ///
    /// Resolution goes one level deep: references inside the linked library trees are not visited.
    /// Repeating the call does not reach them either, because a linked library root is shared with
    /// the library: a second pass over a tree that still holds such references fails with
    /// [`TreeError::SharedSubtree`] and edits nothing. Resolve the library first with
    /// [`solve_library`](Self::solve_library); after that one pass fully resolves any tree.
    ///
    /// Every name is looked up and every splice site checked before anything is edited, so on error
    /// `root` is left exactly as it was. Splicing needs exclusive handles from `root` down to each
    /// reference's parent; a shared handle fails with [`TreeError::SharedSubtree`].
    pub fn solve_references(&self, root: &mut TaskRef) -> Result<(), TreeError> {
        if let Some(reference) = root.as_sub_tree_reference() {
            if let Some(resolved) = reference.resolve_with(self)? {
                tracing::debug!(tree = reference.tree_name(), "resolved root reference");
                *root = resolved;
            }
            return Ok(());
        }

        let splices = self.plan_splices(root)?;
        for (path, _) in &splices {
            if let Some(parent) = path.parent() {
                search::ensure_editable(root, parent)?;
            }
        }

        for (path, resolved) in splices {
            let (Some(parent), Some(index)) = (path.parent(), path.index()) else {
                continue;
            };
            let children = search::children_at_mut(root, parent)?;
            children.remove_at(index)?;
            children.insert(index, resolved)?;
            tracing::debug!(%path, "spliced sub-tree");
        }
        Ok(())
    }

    /// Resolution of every named reference below `root`, in discovery order.
    fn plan_splices(&self, root: &TaskRef) -> Result<Vec<(TaskPath, TaskRef)>, TreeError> {
        let matches = search::find_tasks(root, |task| task.as_sub_tree_reference().is_some());
        let mut splices = Vec::with_capacity(matches.len());
        for found in matches {
            let Some(reference) = found.task.as_sub_tree_reference() else {
                continue;
            };
            if let Some(resolved) = reference.resolve_with(self)? {
                splices.push((found.path, resolved));
            }
        }
        Ok(splices)
    }

    /// Resolves the references inside every library tree, dependencies first.
    ///
    /// Afterwards each library tree is free of named references, so a single
    /// [`solve_references`](Self::solve_references) pass against the library fully resolves any
    /// tree. Missing names and reference cycles are reported before any tree is edited.
    pub fn solve_library(&mut self) -> Result<(), TreeError> {
        let order = self.dependency_order()?;
        for name in order {
            let Some(mut root) = self.trees.remove(&name) else {
                continue;
            };
            let result = self.solve_references(&mut root);
            self.trees.insert(name.clone(), root);
            result?;
            self.observers.notify(&LibraryEvent::Replaced { name });
        }
        Ok(())
    }

    /// Names of the trees that contain references, ordered so that every tree comes after the
    /// trees it references.
    fn dependency_order(&self) -> Result<Vec<String>, TreeError> {
        let mut depends_on: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (name, root) in &self.trees {
            let mut targets = BTreeSet::new();
            for found in search::find_tasks(root, |task| task.as_sub_tree_reference().is_some()) {
                let Some(reference) = found.task.as_sub_tree_reference() else {
                    continue;
                };
                let target = reference.tree_name();
                if target.is_empty() {
                    continue;
                }
                let Some((target, _)) = self.trees.get_key_value(target) else {
                    return Err(TreeError::UnresolvedReference {
                        name: target.to_owned(),
                    });
                };
                targets.insert(target.as_str());
            }
            depends_on.insert(name.as_str(), targets);
        }

        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        for (&name, targets) in &depends_on {
            pending.insert(name, targets.len());
            for &target in targets {
                dependents.entry(target).or_default().push(name);
            }
        }

        let mut ready: VecDeque<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(&name, _)| name)
            .collect();
        let mut order = Vec::with_capacity(depends_on.len());
        while let Some(name) = ready.pop_front() {
            order.push(name);
            for &dependent in dependents.get(name).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(dependent);
                    }
                }
            }
        }

        if order.len() < depends_on.len() {
            let names = pending
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(name, _)| name.to_owned())
                .collect();
            return Err(TreeError::ReferenceCycle { names });
        }

        Ok(order
            .into_iter()
            .filter(|name| depends_on.get(name).is_some_and(|targets| !targets.is_empty()))
            .map(str::to_owned)
            .collect())
    }
}
