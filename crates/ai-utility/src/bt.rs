use ai_bt::lifecycle;
use ai_bt::{AgentContext, Children, Decision, DecisionData, Task, TaskData, TaskRef};
use ai_core::ExecutionStatus;

use crate::{select_best, UtilityConfig};

/// Composite that runs its highest-scoring child.
///
/// Deciding scores every child (stable tie-break by child order) and reports the winner's score,
/// or refuses when no child clears `min_score`. With `reevaluate` set, every update re-scores the
/// children and switches to a new winner, interrupting the running one. The selector finishes with
/// the status of the child it is running.
#[derive(Debug)]
pub struct UtilitySelector {
    name: String,
    children: Children,
    config: UtilityConfig,
}

impl UtilitySelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Children::new(),
            config: UtilityConfig::default(),
        }
    }

    pub fn with_config(mut self, config: UtilityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = TaskRef>) -> Self {
        self.children = self.children.iter().cloned().chain(children).collect();
        self
    }

    pub fn config(&self) -> &UtilityConfig {
        &self.config
    }

    /// Decides every child and keeps the winner's decision.
    fn choose(&self, ctx: &mut AgentContext) -> Option<(usize, Decision)> {
        let mut decisions: Vec<Decision> = self
            .children
            .iter()
            .map(|child| lifecycle::decide(child.as_ref(), ctx))
            .collect();
        let scores = decisions.iter().map(|decision| {
            if decision.wants_to_run() {
                decision.score
            } else {
                f32::NEG_INFINITY
            }
        });

        let (index, _) = select_best(scores, &self.config)?;
        Some((index, std::mem::take(&mut decisions[index])))
    }

    fn start(&self, ctx: &mut AgentContext, index: usize, decision: DecisionData) -> ExecutionStatus {
        let Some(child) = self.children.get(index) else {
            return ExecutionStatus::Failed;
        };
        let mut data = None;
        let status = lifecycle::start(child.as_ref(), ctx, decision, &mut data);
        if status.is_running() {
            ctx.set_task_data(TaskData::Active { index, child: data });
        }
        status
    }
}

impl Task for UtilitySelector {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, ctx: &mut AgentContext) -> Decision {
        match self.choose(ctx) {
            Some((index, decision)) => Decision::with_data(
                decision.score,
                DecisionData::Selected {
                    index,
                    child: Box::new(decision.data),
                },
            ),
            None => Decision::reject(),
        }
    }

    fn activate(&self, ctx: &mut AgentContext, decision: DecisionData) -> ExecutionStatus {
        match decision {
            DecisionData::Selected { index, child } => self.start(ctx, index, *child),
            _ => match self.choose(ctx) {
                Some((index, decision)) => self.start(ctx, index, decision.data),
                None => ExecutionStatus::Failed,
            },
        }
    }

    fn update(&self, ctx: &mut AgentContext) -> ExecutionStatus {
        let Some(TaskData::Active { index, mut child }) = ctx.take_task_data() else {
            tracing::warn!(task = self.name(), "utility selector updated without a running child");
            return ExecutionStatus::Failed;
        };
        let Some(running) = self.children.get(index) else {
            return ExecutionStatus::Failed;
        };

        if self.config.reevaluate {
            if let Some((winner, decision)) = self.choose(ctx) {
                if winner != index {
                    tracing::debug!(task = self.name(), from = index, to = winner, "switching");
                    lifecycle::interrupt(running.as_ref(), ctx, &mut child);
                    return self.start(ctx, winner, decision.data);
                }
            }
        }

        let status = lifecycle::resume(running.as_ref(), ctx, &mut child);
        if status.is_running() {
            ctx.set_task_data(TaskData::Active { index, child });
        }
        status
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
