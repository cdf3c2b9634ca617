use ai_core::ExecutionStatus;

use crate::lifecycle;
use crate::{AgentContext, TaskData, TaskRef};

/// Drives one agent through a (usually shared) tree, one tick at a time.
///
/// While idle each tick decides the root and activates it when it wants to run; while the root is
/// running each tick updates it. The root is deactivated as soon as it finishes.
#[derive(Debug)]
pub struct TreeAgent {
    root: TaskRef,
    context: AgentContext,
    active: Option<Option<Box<TaskData>>>,
    last: Option<ExecutionStatus>,
}

impl TreeAgent {
    pub fn new(root: TaskRef, context: AgentContext) -> Self {
        Self {
            root,
            context,
            active: None,
            last: None,
        }
    }

    pub fn agent(&self) -> u64 {
        self.context.agent()
    }

    pub fn root(&self) -> &TaskRef {
        &self.root
    }

    pub fn context(&self) -> &AgentContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AgentContext {
        &mut self.context
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Status reported by the last tick; `None` if the root refused to run.
    pub fn last_status(&self) -> Option<ExecutionStatus> {
        self.last
    }

    /// Runs one tick. Returns `None` when the root was idle and refused to run.
    pub fn tick(&mut self) -> Option<ExecutionStatus> {
        let root = self.root.as_ref();
        let ctx = &mut self.context;

        let status = match self.active.take() {
            Some(mut data) => {
                let status = lifecycle::resume(root, ctx, &mut data);
                if status.is_running() {
                    self.active = Some(data);
                }
                Some(status)
            }
            None => {
                let decision = lifecycle::decide(root, ctx);
                if decision.wants_to_run() {
                    let mut data = None;
                    let status = lifecycle::start(root, ctx, decision.data, &mut data);
                    if status.is_running() {
                        self.active = Some(data);
                    }
                    Some(status)
                } else {
                    None
                }
            }
        };

        ctx.set_tick(ctx.tick().wrapping_add(1));
        self.last = status;
        status
    }

    /// Forcibly deactivates a running root. Returns `false` if nothing was running.
    pub fn interrupt(&mut self) -> bool {
        let Some(mut data) = self.active.take() else {
            return false;
        };
        tracing::debug!(agent = self.context.agent(), "interrupting tree");
        lifecycle::interrupt(self.root.as_ref(), &mut self.context, &mut data);
        true
    }
}

/// Ticks every agent once, in stable agent-id order. The slice itself is left in its order.
pub fn tick_agents(agents: &mut [TreeAgent]) {
    let mut order: Vec<usize> = (0..agents.len()).collect();
    order.sort_by_key(|&index| agents[index].agent());
    for index in order {
        agents[index].tick();
    }
}
