use std::collections::BTreeSet;

use ai_bt::{
    task, AgentContext, Condition, Fail, FnTask, Selector, SelectorConfig, Sequence, Succeed,
    TaskRef, TreeAgent, Wait,
};
use ai_core::{BbKey, Blackboard, BlackboardRef, ExecutionStatus};
use ai_tools::{SharedTraceLog, TraceLog, TracePhase};

const ALARM: BbKey<bool> = BbKey::named("alarm");

fn traced_agent(root: TaskRef) -> (TreeAgent, SharedTraceLog, BlackboardRef) {
    let log = SharedTraceLog::new();
    let blackboard = Blackboard::new().into_ref();
    let ctx = AgentContext::new(1, blackboard.clone()).with_trace_sink(log.clone());
    (TreeAgent::new(root, ctx), log, blackboard)
}

fn alarm_response() -> TaskRef {
    task(
        FnTask::new("respond")
            .with_score(|ctx| {
                if ctx.blackboard().get(&ALARM).unwrap_or(false) {
                    1.0
                } else {
                    0.0
                }
            })
            .on_activate(|_| ExecutionStatus::Running)
            .on_update(|_| ExecutionStatus::Running),
    )
}

/// Every task that was activated was deactivated exactly as often.
fn assert_paired(log: &TraceLog) {
    let names: BTreeSet<_> = log.events.iter().map(|e| e.task.as_str()).collect();
    for name in names {
        assert_eq!(
            log.count(name, TracePhase::Activate),
            log.count(name, TracePhase::Deactivate),
            "unpaired lifecycle for {name}"
        );
    }
}

#[test]
fn selector_preempts_lower_priority_child() {
    let root = task(
        Selector::new("root")
            .with_child(alarm_response())
            .with_child(task(Wait::new("idle", 100u32))),
    );
    let (mut agent, log, blackboard) = traced_agent(root);

    assert_eq!(agent.tick(), Some(ExecutionStatus::Running));
    assert_eq!(agent.tick(), Some(ExecutionStatus::Running));
    blackboard.set_value(&ALARM, true);
    assert_eq!(agent.tick(), Some(ExecutionStatus::Running));

    log.with(|log| {
        assert_eq!(log.count("idle", TracePhase::Activate), 1);
        assert_eq!(log.count("idle", TracePhase::Deactivate), 1);
        assert_eq!(log.count("respond", TracePhase::Activate), 1);
        assert_eq!(log.count("respond", TracePhase::Deactivate), 0);
    });

    assert!(agent.interrupt());
    log.with(assert_paired);
}

#[test]
fn selector_without_preemption_keeps_the_running_child() {
    let root = task(
        Selector::new("root")
            .with_config(SelectorConfig { preemption: false })
            .with_child(alarm_response())
            .with_child(task(Wait::new("idle", 100u32))),
    );
    let (mut agent, log, blackboard) = traced_agent(root);

    agent.tick();
    blackboard.set_value(&ALARM, true);
    agent.tick();
    agent.tick();

    log.with(|log| {
        assert_eq!(log.count("respond", TracePhase::Activate), 0);
        assert_eq!(log.count("idle", TracePhase::Update), 2);
    });
}

#[test]
fn selector_falls_back_when_the_chosen_child_fails() {
    let root = task(
        Selector::new("root")
            .with_child(task(Fail::new("first")))
            .with_child(task(Condition::new("never", |_: &Blackboard| false)))
            .with_child(task(Succeed::new("last"))),
    );
    let (mut agent, log, _) = traced_agent(root);

    assert_eq!(agent.tick(), Some(ExecutionStatus::Success));
    log.with(|log| {
        assert_eq!(log.count("first", TracePhase::Activate), 1);
        assert_eq!(log.count("never", TracePhase::Activate), 0);
        assert_eq!(log.count("last", TracePhase::Activate), 1);
        assert_paired(log);
    });
}

#[test]
fn selector_fails_when_every_child_fails() {
    let root = task(
        Selector::new("root")
            .with_child(task(Fail::new("a")))
            .with_child(task(Fail::new("b"))),
    );
    let (mut agent, log, _) = traced_agent(root);

    assert_eq!(agent.tick(), Some(ExecutionStatus::Failed));
    log.with(assert_paired);
}

#[test]
fn empty_selector_refuses() {
    let (mut agent, _, _) = traced_agent(task(Selector::new("root")));
    assert_eq!(agent.tick(), None);
}

#[test]
fn sequence_runs_children_in_order() {
    let root = task(
        Sequence::new("root")
            .with_child(task(Succeed::new("a")))
            .with_child(task(Wait::new("b", 2u32)))
            .with_child(task(Succeed::new("c"))),
    );
    let (mut agent, log, _) = traced_agent(root);

    assert_eq!(agent.tick(), Some(ExecutionStatus::Running));
    assert_eq!(agent.tick(), Some(ExecutionStatus::Running));
    assert_eq!(agent.tick(), Some(ExecutionStatus::Success));

    log.with(|log| {
        let activations: Vec<_> = log
            .events
            .iter()
            .filter(|e| e.phase == TracePhase::Activate && e.task != "root")
            .map(|e| e.task.as_str())
            .collect();
        assert_eq!(activations, vec!["a", "b", "c"]);
        assert_paired(log);
    });
}

#[test]
fn sequence_fails_on_refusal_or_failure() {
    let refusing = task(
        Sequence::new("root")
            .with_child(task(Succeed::new("a")))
            .with_child(task(Condition::new("never", |_: &Blackboard| false)))
            .with_child(task(Succeed::new("c"))),
    );
    let (mut agent, log, _) = traced_agent(refusing);
    assert_eq!(agent.tick(), Some(ExecutionStatus::Failed));
    log.with(|log| assert_eq!(log.count("c", TracePhase::Decide), 0));

    let failing = task(
        Sequence::new("root")
            .with_child(task(Fail::new("a")))
            .with_child(task(Succeed::new("b"))),
    );
    let (mut agent, log, _) = traced_agent(failing);
    assert_eq!(agent.tick(), Some(ExecutionStatus::Failed));
    log.with(|log| {
        assert_eq!(log.count("b", TracePhase::Activate), 0);
        assert_paired(log);
    });
}

#[test]
fn sequence_decides_like_its_first_child() {
    let root = task(
        Sequence::new("root")
            .with_child(task(Condition::new("gate", |bb: &Blackboard| {
                bb.get(&ALARM).unwrap_or(false)
            })))
            .with_child(task(Succeed::new("after"))),
    );
    let (mut agent, _, blackboard) = traced_agent(root);

    assert_eq!(agent.tick(), None);
    blackboard.set_value(&ALARM, true);
    assert_eq!(agent.tick(), Some(ExecutionStatus::Success));
}

#[test]
fn interrupting_a_sequence_reaches_the_running_child() {
    let root = task(
        Sequence::new("root")
            .with_child(task(Succeed::new("a")))
            .with_child(task(Wait::new("b", 10u32))),
    );
    let (mut agent, log, _) = traced_agent(root);

    agent.tick();
    agent.tick();
    agent.interrupt();

    log.with(|log| {
        assert_eq!(log.count("b", TracePhase::Deactivate), 1);
        assert_paired(log);
    });
}
