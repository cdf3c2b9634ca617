//! Leaf tasks shipped with the runtime.
//!
//! Game actions are supplied by the embedding application, either as their own [`Task`] impls or
//! through [`FnTask`].

use std::fmt;

use ai_core::{BbKey, Blackboard, ExecutionStatus, TaskParameter};

use crate::{AgentContext, Decision, DecisionData, Task, TaskData};

/// Always wants to run and succeeds on activation.
#[derive(Debug, Clone)]
pub struct Succeed {
    name: String,
}

impl Succeed {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for Succeed {
    fn default() -> Self {
        Self::new("Succeed")
    }
}

impl Task for Succeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, _ctx: &mut AgentContext) -> Decision {
        Decision::new(1.0)
    }
}

/// Always wants to run and fails on activation.
#[derive(Debug, Clone)]
pub struct Fail {
    name: String,
}

impl Fail {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for Fail {
    fn default() -> Self {
        Self::new("Fail")
    }
}

impl Task for Fail {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, _ctx: &mut AgentContext) -> Decision {
        Decision::new(1.0)
    }

    fn activate(&self, _ctx: &mut AgentContext, _decision: DecisionData) -> ExecutionStatus {
        ExecutionStatus::Failed
    }

    fn update(&self, _ctx: &mut AgentContext) -> ExecutionStatus {
        ExecutionStatus::Failed
    }
}

/// Wants to run (and succeeds instantly) while a blackboard predicate holds.
pub struct Condition<F> {
    name: String,
    predicate: F,
}

impl<F> Condition<F>
where
    F: Fn(&Blackboard) -> bool + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> Task for Condition<F>
where
    F: Fn(&Blackboard) -> bool + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        if (self.predicate)(ctx.blackboard().as_ref()) {
            Decision::new(1.0)
        } else {
            Decision::reject()
        }
    }
}

impl<F> fmt::Debug for Condition<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").field("name", &self.name).finish()
    }
}

type ScoreFn = Box<dyn Fn(&mut AgentContext) -> f32 + Send + Sync>;
type StatusFn = Box<dyn Fn(&mut AgentContext) -> ExecutionStatus + Send + Sync>;
type HookFn = Box<dyn Fn(&mut AgentContext) + Send + Sync>;

/// A leaf assembled from closures.
///
/// Defaults: decide `1.0`, activate and update succeed, deactivate does nothing. Closures share the
/// task's statelessness rule: per-agent state belongs in the context's task data or blackboard.
pub struct FnTask {
    name: String,
    score: ScoreFn,
    on_activate: StatusFn,
    on_update: StatusFn,
    on_deactivate: HookFn,
}

impl FnTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: Box::new(|_| 1.0),
            on_activate: Box::new(|_| ExecutionStatus::Success),
            on_update: Box::new(|_| ExecutionStatus::Success),
            on_deactivate: Box::new(|_| {}),
        }
    }

    pub fn with_score(
        mut self,
        score: impl Fn(&mut AgentContext) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.score = Box::new(score);
        self
    }

    pub fn on_activate(
        mut self,
        f: impl Fn(&mut AgentContext) -> ExecutionStatus + Send + Sync + 'static,
    ) -> Self {
        self.on_activate = Box::new(f);
        self
    }

    pub fn on_update(
        mut self,
        f: impl Fn(&mut AgentContext) -> ExecutionStatus + Send + Sync + 'static,
    ) -> Self {
        self.on_update = Box::new(f);
        self
    }

    pub fn on_deactivate(mut self, f: impl Fn(&mut AgentContext) + Send + Sync + 'static) -> Self {
        self.on_deactivate = Box::new(f);
        self
    }
}

impl Task for FnTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        Decision::new((self.score)(ctx))
    }

    fn activate(&self, ctx: &mut AgentContext, _decision: DecisionData) -> ExecutionStatus {
        (self.on_activate)(ctx)
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        (self.on_update)(ctx)
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        (self.on_deactivate)(ctx);
    }
}

impl fmt::Debug for FnTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask").field("name", &self.name).finish()
    }
}

/// Keeps running for a number of updates, then succeeds.
///
/// The count is read when the task activates; a count of zero succeeds immediately. A parameter
/// that does not resolve makes the task refuse to run.
#[derive(Debug, Clone)]
pub struct Wait {
    name: String,
    updates: TaskParameter<u32>,
}

impl Wait {
    pub fn new(name: impl Into<String>, updates: impl Into<TaskParameter<u32>>) -> Self {
        Self {
            name: name.into(),
            updates: updates.into(),
        }
    }

    pub fn updates(&self) -> &TaskParameter<u32> {
        &self.updates
    }
}

impl Task for Wait {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        match self.updates.resolve(ctx.blackboard()) {
            Some(_) => Decision::new(1.0),
            None => Decision::reject(),
        }
    }

    fn activate(&self, ctx: &mut AgentContext, _decision: DecisionData) -> ExecutionStatus {
        let Some(updates) = self.updates.resolve(ctx.blackboard()) else {
            tracing::warn!(task = self.name(), "wait duration did not resolve");
            return ExecutionStatus::Failed;
        };
        if updates == 0 {
            return ExecutionStatus::Success;
        }
        ctx.set_task_data(TaskData::Counter(u64::from(updates)));
        ExecutionStatus::Running
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        let Some(TaskData::Counter(remaining)) = ctx.take_task_data() else {
            tracing::warn!(task = self.name(), "wait updated without its counter");
            return ExecutionStatus::Failed;
        };
        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            return ExecutionStatus::Success;
        }
        ctx.set_task_data(TaskData::Counter(remaining));
        ExecutionStatus::Running
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        ctx.take_task_data();
    }
}

/// Writes a resolved parameter into the current blackboard scope and succeeds.
///
/// Inside a `CreateBlackboard` the write lands in the local scope.
#[derive(Debug, Clone)]
pub struct SetValue<T: 'static> {
    name: String,
    key: BbKey<T>,
    value: TaskParameter<T>,
}

impl<T> SetValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, key: BbKey<T>, value: impl Into<TaskParameter<T>>) -> Self {
        Self {
            name: name.into(),
            key,
            value: value.into(),
        }
    }
}

impl<T> Task for SetValue<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, _ctx: &mut AgentContext) -> Decision {
        Decision::new(1.0)
    }

    fn activate(&self, ctx: &mut AgentContext, _decision: DecisionData) -> ExecutionStatus {
        match self.value.resolve(ctx.blackboard()) {
            Some(value) => {
                ctx.blackboard().set_value(&self.key, value);
                ExecutionStatus::Success
            }
            None => {
                tracing::warn!(task = self.name(), key = %self.key.id(), "value to set did not resolve");
                ExecutionStatus::Failed
            }
        }
    }
}
