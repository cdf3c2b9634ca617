use std::fmt;
use std::ops::{Deref, DerefMut};

use ai_core::BlackboardRef;
use ai_tools::{TraceEvent, TracePhase, TraceSink};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::TaskData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContextConfig {
    /// Deepest decider nesting allowed before a child's decision is rejected outright.
    ///
    /// Guards against runaway recursion through manually wired sub-trees.
    pub max_decider_level: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_decider_level: 128,
        }
    }
}

/// Everything mutable one agent needs while walking a shared tree.
///
/// A context must only be used by one tick at a time. It is `Send`, so agents can be moved between
/// worker threads between ticks.
pub struct AgentContext {
    agent: u64,
    tick: u64,
    config: ContextConfig,
    blackboard: BlackboardRef,
    task_data: Option<TaskData>,
    decider_level: u32,
    trace: Option<Box<dyn TraceSink>>,
}

impl AgentContext {
    pub fn new(agent: u64, blackboard: BlackboardRef) -> Self {
        Self {
            agent,
            tick: 0,
            config: ContextConfig::default(),
            blackboard,
            task_data: None,
            decider_level: 0,
            trace: None,
        }
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Some(Box::new(sink));
        self
    }

    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.trace = sink;
    }

    pub fn agent(&self) -> u64 {
        self.agent
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// The blackboard scope lookups currently go through.
    pub fn blackboard(&self) -> &BlackboardRef {
        &self.blackboard
    }

    /// Replaces the current scope, returning the previous one.
    ///
    /// Tasks that only need a scope for the duration of a call should use
    /// [`scoped_blackboard`](Self::scoped_blackboard) instead.
    pub fn set_blackboard(&mut self, blackboard: BlackboardRef) -> BlackboardRef {
        std::mem::replace(&mut self.blackboard, blackboard)
    }

    pub fn task_data(&self) -> Option<&TaskData> {
        self.task_data.as_ref()
    }

    pub fn task_data_mut(&mut self) -> Option<&mut TaskData> {
        self.task_data.as_mut()
    }

    pub fn set_task_data(&mut self, data: TaskData) {
        self.task_data = Some(data);
    }

    pub fn take_task_data(&mut self) -> Option<TaskData> {
        self.task_data.take()
    }

    pub fn decider_level(&self) -> u32 {
        self.decider_level
    }

    /// Increments the decider level until the returned guard drops.
    pub fn enter_decider(&mut self) -> DeciderScope<'_> {
        self.decider_level = self.decider_level.saturating_add(1);
        DeciderScope { ctx: self }
    }

    /// Makes `blackboard` current until the returned guard drops, then restores the previous scope.
    pub fn scoped_blackboard(&mut self, blackboard: BlackboardRef) -> BlackboardScope<'_> {
        let saved = self.set_blackboard(blackboard);
        BlackboardScope {
            ctx: self,
            saved: Some(saved),
        }
    }

    /// Puts a child's task data into the slot until the guard finishes or drops.
    ///
    /// [`TaskDataScope::finish`] hands back whatever the child left in the slot; dropping the guard
    /// without finishing discards it. Either way the previous slot content is restored.
    pub fn scoped_task_data(&mut self, data: Option<TaskData>) -> TaskDataScope<'_> {
        let saved = std::mem::replace(&mut self.task_data, data);
        TaskDataScope {
            ctx: self,
            saved: Some(saved),
        }
    }

    pub fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    /// Records a lifecycle event if a sink is installed. The event is only built when needed.
    pub fn trace(
        &mut self,
        phase: TracePhase,
        task: &str,
        build: impl FnOnce(TraceEvent) -> TraceEvent,
    ) {
        let Some(sink) = self.trace.as_mut() else {
            return;
        };
        let event = TraceEvent::new(self.tick, self.agent, phase, task).with_depth(self.decider_level);
        sink.emit(build(event));
    }
}

impl fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentContext")
            .field("agent", &self.agent)
            .field("tick", &self.tick)
            .field("config", &self.config)
            .field("blackboard", &self.blackboard)
            .field("task_data", &self.task_data)
            .field("decider_level", &self.decider_level)
            .field("tracing", &self.trace.is_some())
            .finish()
    }
}

pub struct DeciderScope<'a> {
    ctx: &'a mut AgentContext,
}

impl Deref for DeciderScope<'_> {
    type Target = AgentContext;

    fn deref(&self) -> &AgentContext {
        self.ctx
    }
}

impl DerefMut for DeciderScope<'_> {
    fn deref_mut(&mut self) -> &mut AgentContext {
        self.ctx
    }
}

impl Drop for DeciderScope<'_> {
    fn drop(&mut self) {
        self.ctx.decider_level = self.ctx.decider_level.saturating_sub(1);
    }
}

pub struct BlackboardScope<'a> {
    ctx: &'a mut AgentContext,
    saved: Option<BlackboardRef>,
}

impl Deref for BlackboardScope<'_> {
    type Target = AgentContext;

    fn deref(&self) -> &AgentContext {
        self.ctx
    }
}

impl DerefMut for BlackboardScope<'_> {
    fn deref_mut(&mut self) -> &mut AgentContext {
        self.ctx
    }
}

impl Drop for BlackboardScope<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.ctx.blackboard = saved;
        }
    }
}

pub struct TaskDataScope<'a> {
    ctx: &'a mut AgentContext,
    saved: Option<Option<TaskData>>,
}

impl TaskDataScope<'_> {
    /// Restores the previous slot content and returns what the child left behind.
    pub fn finish(mut self) -> Option<TaskData> {
        let saved = self.saved.take().flatten();
        std::mem::replace(&mut self.ctx.task_data, saved)
    }
}

impl Deref for TaskDataScope<'_> {
    type Target = AgentContext;

    fn deref(&self) -> &AgentContext {
        self.ctx
    }
}

impl DerefMut for TaskDataScope<'_> {
    fn deref_mut(&mut self) -> &mut AgentContext {
        self.ctx
    }
}

impl Drop for TaskDataScope<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.ctx.task_data = saved;
        }
    }
}
