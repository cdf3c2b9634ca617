//! Utility-scored behavior tree runtime built on `ai-core`.
//!
//! Task graphs are immutable while they run and can be shared between any number of agents; every
//! per-agent datum lives in the [`AgentContext`] threaded through the decide / activate / update /
//! deactivate protocol.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod children;
pub mod composite;
pub mod context;
pub mod decorator;
pub mod error;
pub mod leaf;
pub mod library;
pub mod lifecycle;
pub mod observer;
pub mod reference;
pub mod scope;
pub mod search;
pub mod task;

pub use agent::{tick_agents, TreeAgent};
pub use children::{ChildEvent, Children};
pub use composite::{Selector, SelectorConfig, Sequence};
pub use context::{AgentContext, BlackboardScope, ContextConfig, DeciderScope, TaskDataScope};
pub use decorator::{Decorator, LoopDecorator, NotDecorator};
pub use error::TreeError;
pub use leaf::{Condition, Fail, FnTask, SetValue, Succeed, Wait};
pub use library::{BehaviorTreeLibrary, LibraryEvent};
pub use observer::{ObserverId, Observers};
pub use reference::SubTreeReference;
pub use scope::CreateBlackboard;
pub use search::{children_at_mut, find_tasks, task_at, TaskMatch, TaskPath};
pub use task::{task, Decision, DecisionData, Task, TaskData, TaskRef};
