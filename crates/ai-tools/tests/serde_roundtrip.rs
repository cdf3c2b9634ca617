#![cfg(feature = "serde")]

use ai_core::ExecutionStatus;
use ai_tools::{TraceEvent, TraceLog, TracePhase};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::new(1, 3, TracePhase::Decide, "loop").with_score(1.0),
            TraceEvent::new(1, 3, TracePhase::Activate, "loop")
                .with_status(ExecutionStatus::Running),
            TraceEvent::new(2, 3, TracePhase::Deactivate, "loop").with_depth(1),
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}
