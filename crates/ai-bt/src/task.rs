use std::any::Any;
use std::fmt;
use std::sync::Arc;

use ai_core::{BlackboardRef, ExecutionStatus};

use crate::{AgentContext, Children, SubTreeReference};

/// Shared handle to a task. Trees, library entries and resolved references all link tasks this way.
pub type TaskRef = Arc<dyn Task>;

/// A behavior tree node.
///
/// A task graph is shared between every agent running it, so implementations must not keep
/// per-agent state in fields: anything that lives across ticks goes into the context's task data
/// slot, and anything computed while deciding goes into the returned [`Decision`].
///
/// Protocol, per agent and per task:
/// - the owner calls [`decide`](Task::decide); a score `> 0.0` makes the task eligible,
/// - [`activate`](Task::activate) is called once with the data of that decision,
/// - [`update`](Task::update) is called on later ticks while the status stays `Running`,
/// - [`deactivate`](Task::deactivate) is called exactly once when the task finishes (including
///   when `activate` itself returned a terminal status) or is interrupted by its owner.
pub trait Task: Send + Sync + 'static {
    /// Diagnostic name; not required to be unique.
    fn name(&self) -> &str;

    /// Scores the task for the current agent. May be called speculatively, so it must not leave
    /// side effects behind except through the returned decision data.
    fn decide(&self, _ctx: &mut AgentContext) -> Decision {
        Decision::reject()
    }

    fn activate(&self, _ctx: &mut AgentContext, _decision: DecisionData) -> ExecutionStatus {
        ExecutionStatus::Success
    }

    fn update(&self, _ctx: &mut AgentContext) -> ExecutionStatus {
        ExecutionStatus::Success
    }

    fn deactivate(&self, _ctx: &mut AgentContext) {}

    fn children(&self) -> Option<&Children> {
        None
    }

    fn children_mut(&mut self) -> Option<&mut Children> {
        None
    }

    fn as_sub_tree_reference(&self) -> Option<&SubTreeReference> {
        None
    }
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("children", &self.children().map(Children::len))
            .finish()
    }
}

/// Outcome of [`Task::decide`]: a utility score plus whatever `activate` must reuse.
#[derive(Debug, Default)]
pub struct Decision {
    pub score: f32,
    pub data: DecisionData,
}

impl Decision {
    /// Negative and NaN scores are stored as `0.0`.
    pub fn new(score: f32) -> Self {
        Self::with_data(score, DecisionData::None)
    }

    pub fn with_data(score: f32, data: DecisionData) -> Self {
        let score = if score > 0.0 { score } else { 0.0 };
        Self { score, data }
    }

    pub fn reject() -> Self {
        Self::default()
    }

    #[inline]
    pub fn wants_to_run(&self) -> bool {
        self.score > 0.0
    }
}

/// State produced by `decide` and handed unchanged to the matching `activate`.
#[derive(Default)]
pub enum DecisionData {
    #[default]
    None,
    /// A freshly created blackboard scope and the wrapped child's decision.
    Scope {
        blackboard: BlackboardRef,
        child: Box<DecisionData>,
    },
    /// The child a composite picked and that child's decision.
    Selected {
        index: usize,
        child: Box<DecisionData>,
    },
    Custom(Box<dyn Any + Send>),
}

impl fmt::Debug for DecisionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionData::None => f.write_str("None"),
            DecisionData::Scope { blackboard, child } => f
                .debug_struct("Scope")
                .field("blackboard", blackboard)
                .field("child", child)
                .finish(),
            DecisionData::Selected { index, child } => f
                .debug_struct("Selected")
                .field("index", index)
                .field("child", child)
                .finish(),
            DecisionData::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Per-agent transient state of an active task, kept in the context between ticks.
///
/// Containers nest their active child's data inside their own variant.
pub enum TaskData {
    Scope {
        blackboard: BlackboardRef,
        child: Option<Box<TaskData>>,
    },
    Loop {
        child_status: ExecutionStatus,
        child: Option<Box<TaskData>>,
    },
    /// Running child of a composite.
    Active {
        index: usize,
        child: Option<Box<TaskData>>,
    },
    Counter(u64),
    Custom(Box<dyn Any + Send>),
}

impl TaskData {
    pub fn custom<T: Any + Send>(value: T) -> Self {
        TaskData::Custom(Box::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            TaskData::Custom(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            TaskData::Custom(value) => value.downcast_mut::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for TaskData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskData::Scope { blackboard, child } => f
                .debug_struct("Scope")
                .field("blackboard", blackboard)
                .field("child", child)
                .finish(),
            TaskData::Loop {
                child_status,
                child,
            } => f
                .debug_struct("Loop")
                .field("child_status", child_status)
                .field("child", child)
                .finish(),
            TaskData::Active { index, child } => f
                .debug_struct("Active")
                .field("index", index)
                .field("child", child)
                .finish(),
            TaskData::Counter(n) => f.debug_tuple("Counter").field(n).finish(),
            TaskData::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Wraps a concrete task into a shared [`TaskRef`].
pub fn task(task: impl Task) -> TaskRef {
    Arc::new(task)
}
