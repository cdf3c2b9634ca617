use std::sync::Arc;

use ai_core::ExecutionStatus;
use parking_lot::Mutex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle step a [`TraceEvent`] was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TracePhase {
    Decide,
    Activate,
    Update,
    Deactivate,
}

/// A small trace record of one task lifecycle call.
///
/// This is "dumb data" so it can be recorded while ticking and rendered later by tooling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub agent: u64,
    pub phase: TracePhase,
    pub task: String,
    /// Decider depth the call ran at.
    pub depth: u32,
    pub score: Option<f32>,
    pub status: Option<ExecutionStatus>,
}

impl TraceEvent {
    pub fn new(tick: u64, agent: u64, phase: TracePhase, task: impl Into<String>) -> Self {
        Self {
            tick,
            agent,
            phase,
            task: task.into(),
            depth: 0,
            score: None,
            status: None,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.status = Some(status);
        self
    }
}

pub trait TraceSink: Send {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events recorded for the named task, in emission order.
    pub fn for_task<'a>(&'a self, task: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.task == task)
    }

    pub fn count(&self, task: &str, phase: TracePhase) -> usize {
        self.for_task(task).filter(|e| e.phase == phase).count()
    }
}

/// Sink writing into a log shared with the caller, e.g. a test or an inspector thread.
#[derive(Debug, Clone, Default)]
pub struct SharedTraceLog(Arc<Mutex<TraceLog>>);

impl SharedTraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the recorded events out, leaving the log empty.
    pub fn take(&self) -> TraceLog {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn with<R>(&self, f: impl FnOnce(&TraceLog) -> R) -> R {
        f(&self.0.lock())
    }
}

impl TraceSink for SharedTraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.0.lock().push(event);
    }
}
