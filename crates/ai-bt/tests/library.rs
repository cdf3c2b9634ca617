use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use ai_bt::lifecycle;
use ai_bt::{
    find_tasks, task, AgentContext, BehaviorTreeLibrary, DecisionData, Fail, LibraryEvent,
    Selector, Sequence, SubTreeReference, Succeed, Task, TaskRef, TreeError,
};
use ai_core::{Blackboard, ExecutionStatus};

fn library_with(names: &[&str]) -> BehaviorTreeLibrary {
    let mut library = BehaviorTreeLibrary::new();
    for name in names {
        library.add(*name, task(Succeed::new(*name))).unwrap();
    }
    library
}

fn child_names(task: &TaskRef) -> Vec<String> {
    task.children()
        .map(|children| children.iter().map(|c| c.name().to_owned()).collect())
        .unwrap_or_default()
}

fn reference_count(root: &TaskRef) -> usize {
    find_tasks(root, |task| task.as_sub_tree_reference().is_some()).len()
}

#[test]
fn library_add_set_remove_and_notifications() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut library = BehaviorTreeLibrary::new();
    let sink = events.clone();
    let id = library.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    library.add("patrol", task(Succeed::new("a"))).unwrap();
    assert_eq!(
        library.add("patrol", task(Succeed::new("b"))),
        Err(TreeError::DuplicateTree {
            name: "patrol".into()
        })
    );
    assert_eq!(library.get("patrol").unwrap().name(), "a");

    let previous = library.set("patrol", task(Succeed::new("c"))).unwrap();
    assert_eq!(previous.name(), "a");
    assert!(library.contains("patrol"));
    assert_eq!(library.names().collect::<Vec<_>>(), vec!["patrol"]);

    assert!(library.remove("patrol").is_some());
    assert!(library.remove("patrol").is_none());
    assert_eq!(
        library.try_get("patrol").err(),
        Some(TreeError::UnknownTree {
            name: "patrol".into()
        })
    );

    assert!(library.unsubscribe(id));
    library.add("late", task(Succeed::new("late"))).unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            LibraryEvent::Added {
                name: "patrol".into()
            },
            LibraryEvent::Replaced {
                name: "patrol".into()
            },
            LibraryEvent::Removed {
                name: "patrol".into()
            },
        ]
    );
}

#[test]
fn references_are_replaced_at_the_same_index() {
    let library = library_with(&["patrol"]);
    let mut root = task(
        Selector::new("root")
            .with_child(task(Fail::new("first")))
            .with_child(task(SubTreeReference::new("patrol")))
            .with_child(task(Succeed::new("last"))),
    );

    library.solve_references(&mut root).unwrap();

    assert_eq!(child_names(&root), vec!["first", "patrol", "last"]);
    let linked = root.children().unwrap().get(1).unwrap();
    assert!(Arc::ptr_eq(linked, library.get("patrol").unwrap()));
    assert_eq!(reference_count(&root), 0);
}

#[test]
fn root_reference_becomes_the_library_root() {
    let library = library_with(&["patrol"]);
    let mut root = task(SubTreeReference::new("patrol"));

    library.solve_references(&mut root).unwrap();

    assert!(Arc::ptr_eq(&root, library.get("patrol").unwrap()));
}

#[test]
fn reference_with_initial_blackboard_is_wrapped_in_a_scope() {
    let library = library_with(&["patrol"]);
    let initial = Blackboard::new().into_ref();
    let mut root = task(
        Sequence::new("root").with_child(task(
            SubTreeReference::new("patrol")
                .with_name("patrol-with-bb")
                .with_blackboard(initial),
        )),
    );

    library.solve_references(&mut root).unwrap();

    let wrapper = root.children().unwrap().first().unwrap().clone();
    assert_eq!(wrapper.name(), "patrol-with-bb");
    assert!(wrapper.as_sub_tree_reference().is_none());
    let inner = wrapper.children().unwrap().first().unwrap();
    assert!(Arc::ptr_eq(inner, library.get("patrol").unwrap()));
}

#[test]
fn missing_name_fails_and_leaves_the_tree_untouched() {
    let library = library_with(&["patrol"]);
    let mut root = task(
        Selector::new("root")
            .with_child(task(SubTreeReference::new("patrol")))
            .with_child(task(SubTreeReference::new("Missing"))),
    );

    assert_eq!(
        library.solve_references(&mut root),
        Err(TreeError::UnresolvedReference {
            name: "Missing".into()
        })
    );
    assert_eq!(reference_count(&root), 2);
    assert_eq!(child_names(&root), vec!["SubTree(patrol)", "SubTree(Missing)"]);
}

#[test]
fn shared_subtree_cannot_be_spliced() {
    let library = library_with(&["patrol"]);
    let inner = task(Sequence::new("inner").with_child(task(SubTreeReference::new("patrol"))));
    let mut root = task(Selector::new("root").with_child(inner.clone()));

    assert_eq!(
        library.solve_references(&mut root),
        Err(TreeError::SharedSubtree { path: vec![0] })
    );
    assert_eq!(reference_count(&root), 1);

    drop(inner);
    library.solve_references(&mut root).unwrap();
    assert_eq!(reference_count(&root), 0);
}

#[test]
fn unnamed_reference_is_left_in_place() {
    let library = library_with(&["patrol"]);
    let mut root = task(Selector::new("root").with_child(task(SubTreeReference::new(""))));

    library.solve_references(&mut root).unwrap();
    assert_eq!(reference_count(&root), 1);
}

#[test]
fn resolution_goes_one_level_deep() {
    let mut library = library_with(&["inner"]);
    library
        .add(
            "outer",
            task(Sequence::new("outer").with_child(task(SubTreeReference::new("inner")))),
        )
        .unwrap();

    let mut root = task(Selector::new("root").with_child(task(SubTreeReference::new("outer"))));
    library.solve_references(&mut root).unwrap();

    // The linked "outer" tree still holds its own reference.
    assert_eq!(child_names(&root), vec!["outer"]);
    assert_eq!(reference_count(&root), 1);

    // It sits below the library's shared handle, so another pass cannot splice it.
    assert_eq!(
        library.solve_references(&mut root),
        Err(TreeError::SharedSubtree { path: vec![0] })
    );
    assert_eq!(reference_count(&root), 1);

    // Solving the library first makes a single pass enough.
    drop(root);
    library.solve_library().unwrap();
    let mut root = task(Selector::new("root").with_child(task(SubTreeReference::new("outer"))));
    library.solve_references(&mut root).unwrap();
    assert_eq!(reference_count(&root), 0);
}

#[test]
fn solved_library_resolves_trees_in_one_pass() {
    let mut library = library_with(&["leaf"]);
    library
        .add(
            "middle",
            task(Sequence::new("middle").with_child(task(SubTreeReference::new("leaf")))),
        )
        .unwrap();
    library
        .add(
            "top",
            task(Selector::new("top").with_child(task(SubTreeReference::new("middle")))),
        )
        .unwrap();

    library.solve_library().unwrap();
    for (_, root) in library.iter() {
        assert_eq!(reference_count(root), 0);
    }

    let mut root = task(SubTreeReference::new("top"));
    library.solve_references(&mut root).unwrap();
    assert_eq!(reference_count(&root), 0);

    let mut ctx = AgentContext::new(1, Blackboard::new().into_ref());
    let decision = lifecycle::decide(root.as_ref(), &mut ctx);
    assert_eq!(
        lifecycle::activate(root.as_ref(), &mut ctx, decision.data),
        ExecutionStatus::Success
    );
}

#[test]
fn reference_cycles_are_reported() {
    let mut library = BehaviorTreeLibrary::new();
    library
        .add("a", task(Sequence::new("a").with_child(task(SubTreeReference::new("b")))))
        .unwrap();
    library
        .add("b", task(Sequence::new("b").with_child(task(SubTreeReference::new("a")))))
        .unwrap();
    library
        .add("c", task(Sequence::new("c").with_child(task(SubTreeReference::new("c")))))
        .unwrap();
    library.add("free", task(Succeed::new("free"))).unwrap();

    assert_eq!(
        library.solve_library(),
        Err(TreeError::ReferenceCycle {
            names: vec!["a".into(), "b".into(), "c".into()]
        })
    );
}

#[test]
fn solve_library_reports_missing_names_before_editing() {
    let mut library = library_with(&["leaf"]);
    library
        .add(
            "ok",
            task(Sequence::new("ok").with_child(task(SubTreeReference::new("leaf")))),
        )
        .unwrap();
    library
        .add(
            "broken",
            task(Sequence::new("broken").with_child(task(SubTreeReference::new("gone")))),
        )
        .unwrap();

    assert_eq!(
        library.solve_library(),
        Err(TreeError::UnresolvedReference {
            name: "gone".into()
        })
    );
    assert_eq!(reference_count(library.get("ok").unwrap()), 1);
}

#[test]
fn references_compare_by_tree_name() {
    let plain = SubTreeReference::new("patrol");
    let scoped = SubTreeReference::new("patrol")
        .with_name("other display name")
        .with_blackboard(Blackboard::new().into_ref());
    assert_eq!(plain, scoped);
    assert_ne!(plain, SubTreeReference::new("guard"));

    let set: HashSet<_> = [plain, scoped].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn unresolved_reference_refuses_to_run() {
    let reference = SubTreeReference::new("patrol");
    let mut ctx = AgentContext::new(1, Blackboard::new().into_ref());

    assert!(!lifecycle::decide(&reference, &mut ctx).wants_to_run());
    assert_eq!(
        lifecycle::activate(&reference, &mut ctx, DecisionData::None),
        ExecutionStatus::Failed
    );
    assert_eq!(lifecycle::update(&reference, &mut ctx), ExecutionStatus::Failed);
}

#[test]
fn manually_wired_reference_delegates() {
    let reference = SubTreeReference::new("patrol").with_sub_tree(task(Fail::new("wired")));
    let mut ctx = AgentContext::new(1, Blackboard::new().into_ref());

    let decision = lifecycle::decide(&reference, &mut ctx);
    assert_eq!(decision.score, 1.0);
    assert_eq!(
        lifecycle::activate(&reference, &mut ctx, decision.data),
        ExecutionStatus::Failed
    );
}

#[test]
fn unknown_tag_placeholder_resolves_by_tag() {
    let library = library_with(&["CustomNode"]);
    let placeholder = SubTreeReference::for_unknown_tag("CustomNode");
    assert_eq!(placeholder.name(), "CustomNode");
    assert_eq!(placeholder.tree_name(), "CustomNode");

    let resolved = placeholder.resolve_with(&library).unwrap().unwrap();
    assert!(Arc::ptr_eq(&resolved, library.get("CustomNode").unwrap()));
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn unresolved_reference_warns_only_once() {
    let captured = CapturedLog::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let reference = SubTreeReference::new("patrol");
    tracing::subscriber::with_default(subscriber, || {
        let mut ctx = AgentContext::new(1, Blackboard::new().into_ref());
        for _ in 0..5 {
            lifecycle::decide(&reference, &mut ctx);
        }
        lifecycle::update(&reference, &mut ctx);
    });

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert_eq!(output.matches("executed before it was resolved").count(), 1);
}
