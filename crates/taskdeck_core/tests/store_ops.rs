use taskdeck_core::{
    EntityStore, IndexError, StoreError, StoreState, TaskDraft, ValidationError,
};

#[test]
fn new_task_lands_at_index_zero() {
    let mut store = EntityStore::new();
    let list = store.add_list("Personal").unwrap();

    store
        .add_task(&list, TaskDraft::new("older"), 1_000)
        .unwrap();
    let newest = store
        .add_task(&list, TaskDraft::new("newest"), 2_000)
        .unwrap();

    let active = store.active_tasks(&list);
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].id, newest);
    assert_eq!(active[0].text, "newest");
    assert_eq!(active[1].text, "older");
}

#[test]
fn completing_stamps_and_clearing_unstamps() {
    let mut store = EntityStore::new();
    let list = store.add_list("Personal").unwrap();
    store
        .add_task(&list, TaskDraft::new("water plants"), 1_000)
        .unwrap();

    let (task, changed) = store.set_task_done(&list, 0, true, 5_000).unwrap();
    assert!(changed);
    assert!(task.done);
    assert_eq!(task.completed_at, Some(5_000));
    assert!(task.completed_at.unwrap() >= task.created);

    // Same value again is a no-op.
    let (_, changed) = store.set_task_done(&list, 0, true, 6_000).unwrap();
    assert!(!changed);

    let (task, changed) = store.set_task_done(&list, 0, false, 7_000).unwrap();
    assert!(changed);
    assert!(!task.done);
    assert_eq!(task.completed_at, None);
}

#[test]
fn expired_task_refuses_completion() {
    let mut store = EntityStore::new();
    let list = store.add_list("Bills").unwrap();
    store
        .add_task(&list, TaskDraft::new("pay rent").due(1_000), 500)
        .unwrap();

    let err = store.set_task_done(&list, 0, true, 2_000).unwrap_err();
    assert_eq!(
        err,
        StoreError::Validation(ValidationError::TaskExpired)
    );
    assert!(!store.active_tasks(&list)[0].done);
}

#[test]
fn archive_then_remove_targets_the_archive() {
    let mut store = EntityStore::new();
    let list = store.add_list("Chores").unwrap();
    store
        .add_task(&list, TaskDraft::new("keep me"), 1_000)
        .unwrap();
    store
        .add_task(&list, TaskDraft::new("shelve me"), 2_000)
        .unwrap();

    let (archived, origin) = store.archive_task(&list, 0).unwrap();
    assert_eq!(archived.text, "shelve me");
    assert!(archived.archived);
    assert_eq!(origin, 0);
    assert_eq!(store.archived_tasks(&list).len(), 1);

    let removed = store.remove_task(&list, 0, true).unwrap();
    assert_eq!(removed.text, "shelve me");
    assert!(store.archived_tasks(&list).is_empty());
    assert_eq!(store.active_tasks(&list).len(), 1);
    assert_eq!(store.active_tasks(&list)[0].text, "keep me");
}

#[test]
fn duplicate_text_and_due_date_is_rejected() {
    let mut store = EntityStore::new();
    let list = store.add_list("Bills").unwrap();
    store
        .add_task(&list, TaskDraft::new("Pay bills").due(10_000), 1_000)
        .unwrap();

    let err = store
        .add_task(&list, TaskDraft::new("Pay bills").due(10_000), 2_000)
        .unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateTask { .. }));
    assert_eq!(store.active_tasks(&list).len(), 1);

    // A different due date is a different submission.
    store
        .add_task(&list, TaskDraft::new("Pay bills").due(20_000), 2_000)
        .unwrap();
    assert_eq!(store.active_tasks(&list).len(), 2);

    // The guard is per list, not global.
    let other = store.add_list("Work").unwrap();
    store
        .add_task(&other, TaskDraft::new("Pay bills").due(10_000), 2_000)
        .unwrap();
}

#[test]
fn list_name_rules() {
    let mut store = EntityStore::new();

    assert_eq!(
        store.add_list("   ").unwrap_err(),
        ValidationError::EmptyListName
    );
    assert!(matches!(
        store.add_list("abcdefghijklmnopqrstuvwxyz").unwrap_err(),
        ValidationError::ListNameTooLong { length: 26, max: 25 }
    ));

    store.add_list("Work").unwrap();
    assert!(matches!(
        store.add_list("Work").unwrap_err(),
        ValidationError::DuplicateListName(_)
    ));
    // Name comparison is case-sensitive.
    store.add_list("work").unwrap();
}

#[test]
fn removing_a_list_detaches_its_data() {
    let mut store = EntityStore::new();
    let list = store.add_list("Groceries").unwrap();
    store
        .add_task(&list, TaskDraft::new("milk"), 1_000)
        .unwrap();
    store
        .add_task(&list, TaskDraft::new("bread"), 2_000)
        .unwrap();
    store.archive_task(&list, 0).unwrap();

    let (removed_list, tasks, archive) = store.remove_list(&list).unwrap();
    assert_eq!(removed_list.id, list);
    assert_eq!(tasks.len(), 1);
    assert_eq!(archive.len(), 1);
    assert!(store.lists().is_empty());
    assert!(store.active_tasks(&list).is_empty());

    store.restore_list(removed_list.clone(), tasks, archive);
    assert_eq!(store.lists().len(), 1);
    assert_eq!(store.active_tasks(&list).len(), 1);
    assert_eq!(store.archived_tasks(&list).len(), 1);

    // Restoring an existing id is a no-op.
    store.restore_list(removed_list, Vec::new(), Vec::new());
    assert_eq!(store.active_tasks(&list).len(), 1);
}

#[test]
fn restore_task_clamps_a_stale_index() {
    let mut store = EntityStore::new();
    let list = store.add_list("Chores").unwrap();
    store
        .add_task(&list, TaskDraft::new("only"), 1_000)
        .unwrap();
    let removed = store.remove_task(&list, 0, false).unwrap();

    store.restore_task(&list, removed, 7, false).unwrap();
    assert_eq!(store.active_tasks(&list).len(), 1);
    assert_eq!(store.active_tasks(&list)[0].text, "only");
}

#[test]
fn stale_indices_are_refused() {
    let mut store = EntityStore::new();
    let list = store.add_list("Personal").unwrap();
    store
        .add_task(&list, TaskDraft::new("single"), 1_000)
        .unwrap();

    let err = store.set_task_done(&list, 3, true, 2_000).unwrap_err();
    assert_eq!(err, StoreError::Index(IndexError { index: 3, len: 1 }));

    let err = store.remove_task(&list, 1, false).unwrap_err();
    assert_eq!(err, StoreError::Index(IndexError { index: 1, len: 1 }));

    let err = store.archive_task(&list, 9).unwrap_err();
    assert!(matches!(err, StoreError::Index(_)));
}

#[test]
fn unknown_list_is_a_validation_error() {
    let mut store = EntityStore::new();
    let ghost = "ghost-00000000".to_string();

    let err = store
        .add_task(&ghost, TaskDraft::new("nowhere"), 1_000)
        .unwrap_err();
    assert!(matches!(err, ValidationError::UnknownList(_)));
    assert!(matches!(
        store.clear_archive(&ghost).unwrap_err(),
        ValidationError::UnknownList(_)
    ));
}

#[test]
fn task_text_is_normalized_and_validated() {
    let mut store = EntityStore::new();
    let list = store.add_list("Notes").unwrap();

    assert_eq!(
        store
            .add_task(&list, TaskDraft::new("  \n "), 1_000)
            .unwrap_err(),
        ValidationError::EmptyTaskText
    );

    let oversized = "x".repeat(101);
    assert!(matches!(
        store
            .add_task(&list, TaskDraft::new(oversized), 1_000)
            .unwrap_err(),
        ValidationError::TaskTextTooLong { length: 101, max: 100 }
    ));

    store
        .add_task(&list, TaskDraft::new(" call\nthe bank "), 1_000)
        .unwrap();
    assert_eq!(store.active_tasks(&list)[0].text, "call the bank");
}

#[test]
fn clear_archive_reports_drained_count() {
    let mut store = EntityStore::new();
    let list = store.add_list("Chores").unwrap();
    for text in ["a", "b", "c"] {
        store.add_task(&list, TaskDraft::new(text), 1_000).unwrap();
    }
    store.archive_task(&list, 0).unwrap();
    store.archive_task(&list, 0).unwrap();

    assert_eq!(store.clear_archive(&list).unwrap(), 2);
    assert!(store.archived_tasks(&list).is_empty());
    assert_eq!(store.active_tasks(&list).len(), 1);
}

#[test]
fn loaded_state_gets_missing_buckets_repaired() {
    let mut handcrafted = StoreState::default();
    handcrafted.lists.push(taskdeck_core::List {
        id: "orphan-00000000".to_string(),
        name: "Orphan".to_string(),
    });
    handcrafted
        .tasks
        .insert("dangling-00000000".to_string(), Vec::new());

    let store = EntityStore::from_state(handcrafted);
    let id = "orphan-00000000".to_string();
    assert!(store.active_tasks(&id).is_empty());
    assert!(store.archived_tasks(&id).is_empty());
    assert!(store.state().tasks.contains_key(&id));
    assert!(!store.state().tasks.contains_key("dangling-00000000"));
}
