//! Single-child tasks.
//!
//! [`Decorator`] is the plain pass-through; [`NotDecorator`] and [`LoopDecorator`] embed one and
//! override parts of the protocol. A decorator's slot holds at most one child; an empty slot is
//! legal and never activates.

use ai_core::ExecutionStatus;

use crate::lifecycle;
use crate::{AgentContext, Children, Decision, DecisionData, Task, TaskData, TaskRef, TreeError};

/// Forwards every lifecycle call to its only child.
///
/// The decorator owns no task data: while it is active, the context slot it was given belongs to
/// the child.
#[derive(Debug)]
pub struct Decorator {
    name: String,
    slot: Children,
}

impl Decorator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: Children::single(),
        }
    }

    /// Builder form of [`set_child`](Self::set_child) for an empty decorator.
    pub fn with_child(mut self, child: TaskRef) -> Self {
        debug_assert!(self.slot.is_empty(), "decorator {:?} already has a child", self.name);
        self.slot = Children::from_tasks(vec![child], Some(1));
        self
    }

    pub fn child(&self) -> Option<&TaskRef> {
        self.slot.first()
    }

    /// Fails with [`TreeError::CapacityExceeded`] if the slot is already taken.
    pub fn set_child(&mut self, child: TaskRef) -> Result<(), TreeError> {
        self.slot.add(child).map(|_| ())
    }

    /// Clears the slot if `child` is the current child (by identity).
    pub fn remove_child(&mut self, child: &TaskRef) -> Result<(), TreeError> {
        self.slot.remove(child).map(|_| ())
    }

    pub fn decide_child(&self, ctx: &mut AgentContext) -> Decision {
        match self.child() {
            Some(child) => lifecycle::decide(child.as_ref(), ctx),
            None => Decision::reject(),
        }
    }

    pub fn activate_child(&self, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
        match self.child() {
            Some(child) => lifecycle::activate(child.as_ref(), ctx, decision),
            None => ExecutionStatus::Failed,
        }
    }

    pub fn update_child(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        match self.child() {
            Some(child) => lifecycle::update(child.as_ref(), ctx),
            None => ExecutionStatus::Failed,
        }
    }

    pub fn deactivate_child(&self, ctx: &mut AgentContext) {
        if let Some(child) = self.child() {
            lifecycle::deactivate(child.as_ref(), ctx);
        }
    }
}

impl Task for Decorator {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        self.decide_child(ctx)
    }

    fn activate(&self, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
        self.activate_child(ctx, decision)
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        self.update_child(ctx)
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        self.deactivate_child(ctx);
    }

    fn children(&self) -> Option<&Children> {
        Some(&self.slot)
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        Some(&mut self.slot)
    }
}

/// Inverts the child's score: decides `1.0 - score`.
///
/// The child's score is clamped to `[0, 1]` first, so the result is always a valid score. Execution
/// is delegated to the child unchanged. Without a child the decorator never activates.
#[derive(Debug)]
pub struct NotDecorator {
    inner: Decorator,
}

impl NotDecorator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Decorator::new(name),
        }
    }

    pub fn with_child(mut self, child: TaskRef) -> Self {
        self.inner = self.inner.with_child(child);
        self
    }

    pub fn child(&self) -> Option<&TaskRef> {
        self.inner.child()
    }
}

impl Task for NotDecorator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        if self.inner.child().is_none() {
            return Decision::reject();
        }
        let decision = self.inner.decide_child(ctx);
        Decision::with_data(1.0 - decision.score.clamp(0.0, 1.0), decision.data)
    }

    fn activate(&self, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
        self.inner.activate_child(ctx, decision)
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        self.inner.update_child(ctx)
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        self.inner.deactivate_child(ctx);
    }

    fn children(&self) -> Option<&Children> {
        self.inner.children()
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        self.inner.children_mut()
    }
}

/// Restarts its child forever.
///
/// The loop always decides `1.0` and reports `Running` on every activate and update; it only
/// stops when its owner deactivates it. Each update either advances the running child or, once
/// the child finished or refused, decides it again and restarts it when it wants to run. A child
/// that refuses is recorded as `Failed`. Deactivation reaches the child only while it is running.
#[derive(Debug)]
pub struct LoopDecorator {
    inner: Decorator,
}

impl LoopDecorator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Decorator::new(name),
        }
    }

    pub fn with_child(mut self, child: TaskRef) -> Self {
        self.inner = self.inner.with_child(child);
        self
    }

    pub fn child(&self) -> Option<&TaskRef> {
        self.inner.child()
    }

    fn restart_child(
        &self,
        ctx: &mut AgentContext,
        data: &mut Option<Box<TaskData>>,
        update_same_tick: bool,
    ) -> ExecutionStatus {
        let Some(child) = self.inner.child() else {
            return ExecutionStatus::Failed;
        };
        let decision = lifecycle::decide(child.as_ref(), ctx);
        if !decision.wants_to_run() {
            return ExecutionStatus::Failed;
        }

        let status = lifecycle::start(child.as_ref(), ctx, decision.data, data);
        if status.is_running() && update_same_tick {
            return lifecycle::resume(child.as_ref(), ctx, data);
        }
        status
    }
}

impl Task for LoopDecorator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn decide(&self, _ctx: &mut AgentContext) -> Decision {
        Decision::new(1.0)
    }

    fn activate(&self, ctx: &mut AgentContext, _decision: DecisionData) -> ExecutionStatus {
        let mut child = None;
        let child_status = self.restart_child(ctx, &mut child, false);
        ctx.set_task_data(TaskData::Loop {
            child_status,
            child,
        });
        ExecutionStatus::Running
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        let (child_status, mut child) = match ctx.take_task_data() {
            Some(TaskData::Loop {
                child_status,
                child,
            }) => (child_status, child),
            other => {
                tracing::warn!(
                    task = self.name(),
                    data = ?other,
                    "loop updated without its task data; restarting child"
                );
                (ExecutionStatus::Failed, None)
            }
        };

        let child_status = match (child_status, self.inner.child()) {
            (ExecutionStatus::Running, Some(task)) => {
                lifecycle::resume(task.as_ref(), ctx, &mut child)
            }
            _ => self.restart_child(ctx, &mut child, true),
        };

        ctx.set_task_data(TaskData::Loop {
            child_status,
            child,
        });
        ExecutionStatus::Running
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        let Some(TaskData::Loop {
            child_status,
            mut child,
        }) = ctx.take_task_data()
        else {
            return;
        };
        if let (ExecutionStatus::Running, Some(task)) = (child_status, self.inner.child()) {
            lifecycle::interrupt(task.as_ref(), ctx, &mut child);
        }
    }

    fn children(&self) -> Option<&Children> {
        self.inner.children()
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        self.inner.children_mut()
    }
}
