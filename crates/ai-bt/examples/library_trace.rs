//! Builds a small library of trees, wires the sub-tree references and prints the lifecycle trace of
//! a few ticks.
//!
//! Run with `RUST_LOG=ai_bt=trace` to also see the runtime's own tracing output.

use ai_bt::{
    task, AgentContext, BehaviorTreeLibrary, Condition, CreateBlackboard, FnTask, LoopDecorator,
    Selector, Sequence, SetValue, SubTreeReference, TreeAgent, Wait,
};
use ai_core::{BbKey, Blackboard, ExecutionStatus};
use ai_tools::SharedTraceLog;
use tracing_subscriber::EnvFilter;

const HUNGRY: BbKey<bool> = BbKey::named("hungry");
const MEAL: BbKey<String> = BbKey::named("meal");

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut library = BehaviorTreeLibrary::new();
    library.add(
        "Eat",
        task(
            CreateBlackboard::new("eat-scope").with_child(task(
                Sequence::new("eat")
                    .with_child(task(SetValue::new("pick-meal", MEAL, "stew".to_string())))
                    .with_child(task(Wait::new("chew", 2u32)))
                    .with_child(task(SetValue::new("sated", HUNGRY, false))),
            )),
        ),
    )?;
    library.add(
        "Idle",
        task(FnTask::new("idle").on_activate(|_| ExecutionStatus::Running)),
    )?;
    library.add(
        "Root",
        task(
            LoopDecorator::new("life").with_child(task(
                Selector::new("choose")
                    .with_child(task(
                        Sequence::new("when-hungry")
                            .with_child(task(Condition::new("hungry?", |bb: &Blackboard| {
                                bb.get(&HUNGRY).unwrap_or(false)
                            })))
                            .with_child(task(SubTreeReference::new("Eat"))),
                    ))
                    .with_child(task(SubTreeReference::new("Idle"))),
            )),
        ),
    )?;
    library.solve_library()?;

    let root = library.try_get("Root")?.clone();
    let log = SharedTraceLog::new();
    let blackboard = Blackboard::new().into_ref();
    blackboard.set_value(&HUNGRY, true);
    let mut agent =
        TreeAgent::new(root, AgentContext::new(1, blackboard.clone()).with_trace_sink(log.clone()));

    for _ in 0..5 {
        let status = agent.tick();
        tracing::info!(?status, hungry = ?blackboard.get(&HUNGRY), "ticked");
    }

    for event in log.take().events {
        let indent = "  ".repeat(event.depth.saturating_sub(1) as usize);
        println!(
            "tick {:>2} {indent}{:?} {} score={:?} status={:?}",
            event.tick, event.phase, event.task, event.score, event.status
        );
    }
    Ok(())
}
