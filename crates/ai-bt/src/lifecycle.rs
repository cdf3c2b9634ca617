//! Calls into a child task on behalf of its owner.
//!
//! Every container goes through these helpers rather than calling [`Task`] methods directly, so
//! that the decider level, the recursion guard and lifecycle tracing are applied uniformly.

use ai_core::ExecutionStatus;
use ai_tools::TracePhase;

use crate::{AgentContext, Decision, DecisionData, Task, TaskData};

pub fn decide(task: &dyn Task, ctx: &mut AgentContext) -> Decision {
    if ctx.decider_level() >= ctx.config().max_decider_level {
        tracing::warn!(
            task = task.name(),
            level = ctx.decider_level(),
            "decider level limit reached; rejecting"
        );
        return Decision::reject();
    }

    let mut scope = ctx.enter_decider();
    let decision = task.decide(&mut scope);
    tracing::trace!(task = task.name(), score = decision.score, "decide");
    scope.trace(TracePhase::Decide, task.name(), |e| e.with_score(decision.score));
    decision
}

pub fn activate(task: &dyn Task, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
    let mut scope = ctx.enter_decider();
    let status = task.activate(&mut scope, decision);
    tracing::trace!(task = task.name(), ?status, "activate");
    scope.trace(TracePhase::Activate, task.name(), |e| e.with_status(status));
    status
}

pub fn update(task: &dyn Task, ctx: &mut AgentContext) -> ExecutionStatus {
    let mut scope = ctx.enter_decider();
    let status = task.update(&mut scope);
    tracing::trace!(task = task.name(), ?status, "update");
    scope.trace(TracePhase::Update, task.name(), |e| e.with_status(status));
    status
}

pub fn deactivate(task: &dyn Task, ctx: &mut AgentContext) {
    let mut scope = ctx.enter_decider();
    task.deactivate(&mut scope);
    tracing::trace!(task = task.name(), "deactivate");
    scope.trace(TracePhase::Deactivate, task.name(), |e| e);
}

/// Runs `f` with a child's stored task data in the context slot, then stores the child's data
/// back into `data` and restores the owner's slot.
pub fn with_child_data<R>(
    ctx: &mut AgentContext,
    data: &mut Option<Box<TaskData>>,
    f: impl FnOnce(&mut AgentContext) -> R,
) -> R {
    let mut scope = ctx.scoped_task_data(data.take().map(|child| *child));
    let result = f(&mut *scope);
    *data = scope.finish().map(Box::new);
    result
}

/// Activates a freshly decided child and deactivates it straight away if it finished on the spot.
///
/// Returns the child's status; `data` holds the child's task data while it keeps running and is
/// cleared otherwise.
pub fn start(
    task: &dyn Task,
    ctx: &mut AgentContext,
    decision: DecisionData,
    data: &mut Option<Box<TaskData>>,
) -> ExecutionStatus {
    let status = with_child_data(ctx, data, |ctx| {
        let status = activate(task, ctx, decision);
        if status.is_finished() {
            deactivate(task, ctx);
        }
        status
    });
    if status.is_finished() {
        *data = None;
    }
    status
}

/// Updates a running child, deactivating it when it reaches a terminal status.
pub fn resume(
    task: &dyn Task,
    ctx: &mut AgentContext,
    data: &mut Option<Box<TaskData>>,
) -> ExecutionStatus {
    let status = with_child_data(ctx, data, |ctx| {
        let status = update(task, ctx);
        if status.is_finished() {
            deactivate(task, ctx);
        }
        status
    });
    if status.is_finished() {
        *data = None;
    }
    status
}

/// Forcibly deactivates a running child and drops its task data.
pub fn interrupt(task: &dyn Task, ctx: &mut AgentContext, data: &mut Option<Box<TaskData>>) {
    with_child_data(ctx, data, |ctx| deactivate(task, ctx));
    *data = None;
}
