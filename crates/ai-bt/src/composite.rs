//! Multi-child tasks.
//!
//! Both composites keep their running child in `TaskData::Active` and pick children through
//! [`lifecycle`], so the child's own task data is nested inside theirs.

use ai_core::ExecutionStatus;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::lifecycle;
use crate::{AgentContext, Children, Decision, DecisionData, Task, TaskData, TaskRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectorConfig {
    /// Re-decide higher-priority siblings on every update and switch to the first one that wants
    /// to run.
    pub preemption: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self { preemption: true }
    }
}

/// Priority selector: runs the first child that wants to run.
///
/// When the running child fails, the children after it are tried in order within the same tick.
/// The selector fails once every remaining child refused or failed.
#[derive(Debug)]
pub struct Selector {
    name: String,
    children: Children,
    config: SelectorConfig,
}

impl Selector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Children::new(),
            config: SelectorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_child(mut self, child: TaskRef) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = TaskRef>) -> Self {
        for child in children {
            self.children.push(child);
        }
        self
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Settles a child that was just started or resumed at `index`.
    fn settle(
        &self,
        ctx: &mut AgentContext,
        index: usize,
        status: ExecutionStatus,
        child: Option<Box<TaskData>>,
    ) -> ExecutionStatus {
        match status {
            ExecutionStatus::Running => {
                ctx.set_task_data(TaskData::Active { index, child });
                ExecutionStatus::Running
            }
            ExecutionStatus::Success => ExecutionStatus::Success,
            ExecutionStatus::Failed => self.run_from(ctx, index + 1),
        }
    }

    /// Decides and starts the children from `from` on until one succeeds or keeps running.
    fn run_from(&self, ctx: &mut AgentContext, from: usize) -> ExecutionStatus {
        for (index, child) in self.children.iter().enumerate().skip(from) {
            let decision = lifecycle::decide(child.as_ref(), ctx);
            if !decision.wants_to_run() {
                continue;
            }
            let mut data = None;
            match lifecycle::start(child.as_ref(), ctx, decision.data, &mut data) {
                ExecutionStatus::Running => {
                    ctx.set_task_data(TaskData::Active { index, child: data });
                    return ExecutionStatus::Running;
                }
                ExecutionStatus::Success => return ExecutionStatus::Success,
                ExecutionStatus::Failed => {}
            }
        }
        ExecutionStatus::Failed
    }

    /// First child before `running` that wants to run, with its decision.
    fn preempting_child(&self, ctx: &mut AgentContext, running: usize) -> Option<(usize, Decision)> {
        self.children
            .iter()
            .take(running)
            .enumerate()
            .find_map(|(index, child)| {
                let decision = lifecycle::decide(child.as_ref(), ctx);
                decision.wants_to_run().then_some((index, decision))
            })
    }
}

impl Task for Selector {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        self.children
            .iter()
            .enumerate()
            .find_map(|(index, child)| {
                let decision = lifecycle::decide(child.as_ref(), ctx);
                decision.wants_to_run().then(|| {
                    Decision::with_data(
                        decision.score,
                        DecisionData::Selected {
                            index,
                            child: Box::new(decision.data),
                        },
                    )
                })
            })
            .unwrap_or_else(Decision::reject)
    }

    fn activate(&self, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
        let DecisionData::Selected { index, child } = decision else {
            tracing::debug!(task = self.name(), "activated without a selection; deciding again");
            return self.run_from(ctx, 0);
        };
        let Some(task) = self.children.get(index) else {
            tracing::warn!(task = self.name(), index, "selected child no longer exists");
            return self.run_from(ctx, 0);
        };

        let mut data = None;
        let status = lifecycle::start(task.as_ref(), ctx, *child, &mut data);
        self.settle(ctx, index, status, data)
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        let Some(TaskData::Active { index, mut child }) = ctx.take_task_data() else {
            tracing::warn!(task = self.name(), "selector updated without a running child");
            return ExecutionStatus::Failed;
        };
        let Some(running) = self.children.get(index) else {
            return ExecutionStatus::Failed;
        };

        if self.config.preemption {
            if let Some((winner, decision)) = self.preempting_child(ctx, index) {
                tracing::debug!(task = self.name(), from = index, to = winner, "preempting");
                lifecycle::interrupt(running.as_ref(), ctx, &mut child);

                let task = &self.children.as_slice()[winner];
                let mut data = None;
                let status = lifecycle::start(task.as_ref(), ctx, decision.data, &mut data);
                return self.settle(ctx, winner, status, data);
            }
        }

        let status = lifecycle::resume(running.as_ref(), ctx, &mut child);
        self.settle(ctx, index, status, child)
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        if let Some(TaskData::Active { index, mut child }) = ctx.take_task_data() {
            if let Some(task) = self.children.get(index) {
                lifecycle::interrupt(task.as_ref(), ctx, &mut child);
            }
        }
    }

    fn children(&self) -> Option<&Children> {
        Some(&self.children)
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        Some(&mut self.children)
    }
}

/// Runs its children one after another.
///
/// The sequence decides like its first child. Each following child is decided once its
/// predecessor succeeded; a refusal or a failure fails the whole sequence.
#[derive(Debug)]
pub struct Sequence {
    name: String,
    children: Children,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Children::new(),
        }
    }

    pub fn with_child(mut self, child: TaskRef) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = TaskRef>) -> Self {
        for child in children {
            self.children.push(child);
        }
        self
    }

    fn advance(
        &self,
        ctx: &mut AgentContext,
        mut index: usize,
        mut status: ExecutionStatus,
        mut child: Option<Box<TaskData>>,
    ) -> ExecutionStatus {
        loop {
            match status {
                ExecutionStatus::Running => {
                    ctx.set_task_data(TaskData::Active { index, child });
                    return ExecutionStatus::Running;
                }
                ExecutionStatus::Failed => return ExecutionStatus::Failed,
                ExecutionStatus::Success => {}
            }

            index += 1;
            let Some(next) = self.children.get(index) else {
                return ExecutionStatus::Success;
            };
            let decision = lifecycle::decide(next.as_ref(), ctx);
            if !decision.wants_to_run() {
                tracing::debug!(task = self.name(), index, "sequence child refused");
                return ExecutionStatus::Failed;
            }
            child = None;
            status = lifecycle::start(next.as_ref(), ctx, decision.data, &mut child);
        }
    }
}

impl Task for Sequence {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        let Some(first) = self.children.first() else {
            return Decision::reject();
        };
        let decision = lifecycle::decide(first.as_ref(), ctx);
        if !decision.wants_to_run() {
            return Decision::reject();
        }
        Decision::with_data(
            decision.score,
            DecisionData::Selected {
                index: 0,
                child: Box::new(decision.data),
            },
        )
    }

    fn activate(&self, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
        let Some(first) = self.children.first() else {
            return ExecutionStatus::Failed;
        };
        let child_decision = match decision {
            DecisionData::Selected { index: 0, child } => *child,
            _ => {
                let decision = lifecycle::decide(first.as_ref(), ctx);
                if !decision.wants_to_run() {
                    return ExecutionStatus::Failed;
                }
                decision.data
            }
        };

        let mut child = None;
        let status = lifecycle::start(first.as_ref(), ctx, child_decision, &mut child);
        self.advance(ctx, 0, status, child)
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        let Some(TaskData::Active { index, mut child }) = ctx.take_task_data() else {
            tracing::warn!(task = self.name(), "sequence updated without a running child");
            return ExecutionStatus::Failed;
        };
        let Some(running) = self.children.get(index) else {
            return ExecutionStatus::Failed;
        };

        let status = lifecycle::resume(running.as_ref(), ctx, &mut child);
        self.advance(ctx, index, status, child)
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        if let Some(TaskData::Active { index, mut child }) = ctx.take_task_data() {
            if let Some(task) = self.children.get(index) {
                lifecycle::interrupt(task.as_ref(), ctx, &mut child);
            }
        }
    }

    fn children(&self) -> Option<&Children> {
        Some(&self.children)
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        Some(&mut self.children)
    }
}
