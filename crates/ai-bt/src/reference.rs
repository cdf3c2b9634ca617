use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, Ordering};

use ai_core::{BlackboardRef, ExecutionStatus};

use crate::lifecycle;
use crate::{
    AgentContext, BehaviorTreeLibrary, CreateBlackboard, Decision, DecisionData, Task, TaskRef,
    TreeError,
};

/// Named placeholder for a library tree.
///
/// [`BehaviorTreeLibrary::solve_references`] replaces the reference in its parent with the library
/// tree's root, so a resolved tree never runs through it. Until then a reference only runs if a
/// sub-tree was wired in by hand; otherwise it refuses to run. The first such call logs a warning,
/// later ones only log at debug level.
///
/// Two references are equal when they name the same tree.
#[derive(Debug)]
pub struct SubTreeReference {
    name: String,
    tree_name: String,
    blackboard: Option<BlackboardRef>,
    sub_tree: Option<TaskRef>,
    warned: AtomicBool,
}

impl SubTreeReference {
    pub fn new(tree_name: impl Into<String>) -> Self {
        let tree_name = tree_name.into();
        Self {
            name: format!("SubTree({tree_name})"),
            tree_name,
            blackboard: None,
            sub_tree: None,
            warned: AtomicBool::new(false),
        }
    }

    /// Placeholder for a node tag a loader does not know; it resolves to the library tree
    /// registered under the tag.
    pub fn for_unknown_tag(tag: &str) -> Self {
        tracing::debug!(tag, "unknown task tag; substituting a sub-tree reference");
        Self::new(tag).with_name(tag)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The resolved tree is wrapped in a [`CreateBlackboard`] using `blackboard` as its template.
    pub fn with_blackboard(mut self, blackboard: BlackboardRef) -> Self {
        self.blackboard = Some(blackboard);
        self
    }

    pub fn with_sub_tree(mut self, sub_tree: TaskRef) -> Self {
        self.sub_tree = Some(sub_tree);
        self
    }

    pub fn tree_name(&self) -> &str {
        &self.tree_name
    }

    pub fn blackboard(&self) -> Option<&BlackboardRef> {
        self.blackboard.as_ref()
    }

    pub fn sub_tree(&self) -> Option<&TaskRef> {
        self.sub_tree.as_ref()
    }

    /// The task that replaces this reference, or `None` for a reference without a tree name.
    pub fn resolve_with(&self, library: &BehaviorTreeLibrary) -> Result<Option<TaskRef>, TreeError> {
        if self.tree_name.is_empty() {
            return Ok(None);
        }
        let root = library
            .get(&self.tree_name)
            .ok_or_else(|| TreeError::UnresolvedReference {
                name: self.tree_name.clone(),
            })?
            .clone();

        let resolved = match &self.blackboard {
            Some(blackboard) => crate::task(
                CreateBlackboard::new(self.name.clone())
                    .with_template(blackboard.clone())
                    .with_child(root),
            ),
            None => root,
        };
        Ok(Some(resolved))
    }

    fn wired(&self) -> Option<&TaskRef> {
        if self.sub_tree.is_none() {
            if self.warned.swap(true, Ordering::Relaxed) {
                tracing::debug!(
                    task = %self.name,
                    tree = %self.tree_name,
                    "sub-tree reference executed before it was resolved"
                );
            } else {
                tracing::warn!(
                    task = %self.name,
                    tree = %self.tree_name,
                    "sub-tree reference executed before it was resolved"
                );
            }
        }
        self.sub_tree.as_ref()
    }
}

impl Task for SubTreeReference {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        match self.wired() {
            Some(sub_tree) => lifecycle::decide(sub_tree.as_ref(), ctx),
            None => Decision::reject(),
        }
    }

    fn activate(&self, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
        match self.wired() {
            Some(sub_tree) => lifecycle::activate(sub_tree.as_ref(), ctx, decision),
            None => ExecutionStatus::Failed,
        }
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        match self.wired() {
            Some(sub_tree) => lifecycle::update(sub_tree.as_ref(), ctx),
            None => ExecutionStatus::Failed,
        }
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        if let Some(sub_tree) = &self.sub_tree {
            lifecycle::deactivate(sub_tree.as_ref(), ctx);
        }
    }

    fn as_sub_tree_reference(&self) -> Option<&SubTreeReference> {
        Some(self)
    }
}

impl Clone for SubTreeReference {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tree_name: self.tree_name.clone(),
            blackboard: self.blackboard.clone(),
            sub_tree: self.sub_tree.clone(),
            warned: AtomicBool::new(false),
        }
    }
}

impl PartialEq for SubTreeReference {
    fn eq(&self, other: &Self) -> bool {
        self.tree_name == other.tree_name
    }
}

impl Eq for SubTreeReference {}

impl Hash for SubTreeReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree_name.hash(state);
    }
}
