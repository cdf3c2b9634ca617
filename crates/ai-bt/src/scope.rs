use std::fmt;

use ai_core::{Blackboard, BlackboardRef, ExecutionStatus};

use crate::decorator::Decorator;
use crate::lifecycle;
use crate::{AgentContext, Children, Decision, DecisionData, Task, TaskData, TaskRef};

/// Runs its child inside a fresh blackboard scope.
///
/// The scope's parents are the optional template (looked up first) and the agent's blackboard at
/// decision time. The scope created while deciding travels in the decision data, so the child is
/// activated against the same scope it was scored against. Writes made by the child land in the
/// scope and vanish with it on deactivation.
pub struct CreateBlackboard {
    inner: Decorator,
    template: Option<BlackboardRef>,
}

impl CreateBlackboard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Decorator::new(name),
            template: None,
        }
    }

    pub fn with_template(mut self, template: BlackboardRef) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_child(mut self, child: TaskRef) -> Self {
        self.inner = self.inner.with_child(child);
        self
    }

    pub fn template(&self) -> Option<&BlackboardRef> {
        self.template.as_ref()
    }

    pub fn child(&self) -> Option<&TaskRef> {
        self.inner.child()
    }

    fn new_scope(&self, ctx: &AgentContext) -> BlackboardRef {
        let ambient = ctx.blackboard();
        Blackboard::with_parents(self.template.iter().chain(std::iter::once(ambient))).into_ref()
    }
}

impl Task for CreateBlackboard {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        let blackboard = self.new_scope(ctx);
        let decision = {
            let mut scope = ctx.scoped_blackboard(blackboard.clone());
            self.inner.decide_child(&mut scope)
        };
        if !decision.wants_to_run() {
            return Decision::reject();
        }
        Decision::with_data(
            decision.score,
            DecisionData::Scope {
                blackboard,
                child: Box::new(decision.data),
            },
        )
    }

    fn activate(&self, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
        let (blackboard, child_decision) = match decision {
            DecisionData::Scope { blackboard, child } => (blackboard, *child),
            other => {
                tracing::debug!(
                    task = self.name(),
                    decision = ?other,
                    "activated without a decided scope; creating one"
                );
                (self.new_scope(ctx), DecisionData::None)
            }
        };

        let mut child = None;
        let status = {
            let mut scope = ctx.scoped_blackboard(blackboard.clone());
            lifecycle::with_child_data(&mut scope, &mut child, |ctx| {
                self.inner.activate_child(ctx, child_decision)
            })
        };
        ctx.set_task_data(TaskData::Scope { blackboard, child });
        status
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        let Some(TaskData::Scope {
            blackboard,
            mut child,
        }) = ctx.take_task_data()
        else {
            tracing::warn!(task = self.name(), "updated without an active scope");
            return ExecutionStatus::Failed;
        };

        let status = {
            let mut scope = ctx.scoped_blackboard(blackboard.clone());
            lifecycle::with_child_data(&mut scope, &mut child, |ctx| self.inner.update_child(ctx))
        };
        ctx.set_task_data(TaskData::Scope { blackboard, child });
        status
    }

    fn deactivate(&self, ctx: &mut AgentContext) {
        match ctx.take_task_data() {
            Some(TaskData::Scope {
                blackboard,
                mut child,
            }) => {
                let mut scope = ctx.scoped_blackboard(blackboard);
                lifecycle::with_child_data(&mut scope, &mut child, |ctx| {
                    self.inner.deactivate_child(ctx)
                });
            }
            _ => self.inner.deactivate_child(ctx),
        }
    }

    fn children(&self) -> Option<&Children> {
        self.inner.children()
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        self.inner.children_mut()
    }
}

impl fmt::Debug for CreateBlackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateBlackboard")
            .field("inner", &self.inner)
            .field("template", &self.template.is_some())
            .finish()
    }
}
