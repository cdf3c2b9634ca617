use ai_bt::{task, AgentContext, Condition, LoopDecorator, Sequence, TaskRef, TreeAgent, Wait};
use ai_core::Blackboard;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn agent(root: TaskRef) -> TreeAgent {
    TreeAgent::new(root, AgentContext::new(1, Blackboard::new().into_ref()))
}

fn bench_sequence(c: &mut Criterion) {
    let root = task(
        (0..32)
            .map(|i| task(Condition::new(format!("cond{i}"), |_: &Blackboard| true)))
            .fold(Sequence::new("root"), Sequence::with_child),
    );
    let mut agent = agent(root);

    c.bench_function("ai-bt/tick(sequence, conditions=32)", |b| {
        b.iter(|| black_box(agent.tick()))
    });
}

fn bench_loop(c: &mut Criterion) {
    let root = task(LoopDecorator::new("loop").with_child(task(Wait::new("wait", 4u32))));
    let mut agent = agent(root);

    c.bench_function("ai-bt/tick(loop, wait=4)", |b| b.iter(|| black_box(agent.tick())));
}

criterion_group!(benches, bench_sequence, bench_loop);
criterion_main!(benches);
