use planpin_core::db::migrations::latest_version;
use planpin_core::db::open_db_in_memory;
use planpin_core::{
    default_checklist, ChecklistItem, RepoError, SqliteTaskRepository, Task, TaskDraft,
    TaskField, TaskRepository, TaskService, TaskValidationError, DEFAULT_POSITION,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut task = Task::new("Install sockets", default_checklist(), "alice");
    task.x = 0.25;
    task.y = 0.75;
    let id = repo.insert_task(&task).unwrap();
    assert_eq!(id, task.id);

    let loaded = repo.get_task(id).unwrap().unwrap();
    assert_eq!(loaded, task);
}

#[test]
fn get_missing_task_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    assert!(repo.get_task(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn validation_failure_blocks_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let blank_title = Task::new("   ", default_checklist(), "alice");
    let err = repo.insert_task(&blank_title).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::EmptyTitle)
    ));

    let empty_checklist = Task::new("Valid title", Vec::new(), "alice");
    let err = repo.insert_task(&empty_checklist).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::EmptyChecklist)
    ));

    let mut off_plan = Task::new("Valid title", default_checklist(), "alice");
    off_plan.x = 1.5;
    let err = repo.insert_task(&off_plan).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::PositionOutOfRange { .. })
    ));

    assert!(repo.list_tasks_by_user("alice").unwrap().is_empty());
}

#[test]
fn duplicate_id_insert_is_a_db_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("Mount railing", default_checklist(), "alice");
    repo.insert_task(&task).unwrap();

    let duplicate = Task::with_id(task.id, "Mount railing again", default_checklist(), "bob");
    let err = repo.insert_task(&duplicate).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let stored = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(stored, task);
}

#[test]
fn update_merges_only_the_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let mut task = Task::new("Fuse box", default_checklist(), "alice");
    task.x = 0.2;
    task.y = 0.8;
    repo.insert_task(&task).unwrap();

    let retitled = repo
        .update_task(task.id, &[TaskField::Title("Rewire panel".to_string())])
        .unwrap()
        .unwrap();
    assert_eq!(retitled.title, "Rewire panel");
    assert_eq!(retitled.checklist, task.checklist);
    assert_eq!((retitled.x, retitled.y), (0.2, 0.8));
    assert_eq!(retitled.user_id, "alice");

    let moved = repo
        .update_task(task.id, &[TaskField::Position { x: 0.9, y: 0.1 }])
        .unwrap()
        .unwrap();
    assert_eq!(moved.title, "Rewire panel");
    assert_eq!((moved.x, moved.y), (0.9, 0.1));

    let reloaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(reloaded, moved);
}

#[test]
fn update_can_apply_several_fields_at_once() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("Fuse box", default_checklist(), "alice");
    repo.insert_task(&task).unwrap();

    let replacement_checklist = vec![ChecklistItem::with_id("a", "Only step")];
    let updated = repo
        .update_task(
            task.id,
            &[
                TaskField::Title("Fuse box check".to_string()),
                TaskField::Checklist(replacement_checklist.clone()),
                TaskField::Position { x: 0.4, y: 0.6 },
            ],
        )
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Fuse box check");
    assert_eq!(updated.checklist, replacement_checklist);
    assert_eq!((updated.x, updated.y), (0.4, 0.6));
}

#[test]
fn update_missing_task_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let merged = repo
        .update_task(Uuid::new_v4(), &[TaskField::Title("ghost".to_string())])
        .unwrap();
    assert!(merged.is_none());
}

#[test]
fn invalid_merge_leaves_the_stored_task_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("Fuse box", default_checklist(), "alice");
    repo.insert_task(&task).unwrap();

    let err = repo
        .update_task(task.id, &[TaskField::Title("   ".to_string())])
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::EmptyTitle)
    ));

    let err = repo
        .update_task(task.id, &[TaskField::Position { x: 2.0, y: 0.5 }])
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(TaskValidationError::PositionOutOfRange { .. })
    ));

    let reloaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(reloaded, task);
}

#[test]
fn remove_task_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let task = Task::new("Throwaway", default_checklist(), "alice");
    repo.insert_task(&task).unwrap();

    assert!(repo.remove_task(task.id).unwrap());
    assert!(!repo.remove_task(task.id).unwrap());
    assert!(repo.get_task(task.id).unwrap().is_none());
}

#[test]
fn list_returns_only_the_users_tasks_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    let first = Task::new("First", default_checklist(), "alice");
    let foreign = Task::new("Bob task", default_checklist(), "bob");
    let second = Task::new("Second", default_checklist(), "alice");
    repo.insert_task(&first).unwrap();
    repo.insert_task(&foreign).unwrap();
    repo.insert_task(&second).unwrap();

    let tasks = repo.list_tasks_by_user("alice").unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, first.id);
    assert_eq!(tasks[1].id, second.id);

    assert!(repo.list_tasks_by_user("nobody").unwrap().is_empty());
}

#[test]
fn service_applies_draft_defaults() {
    let conn = open_db_in_memory().unwrap();
    let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let created = service
        .create_task(&TaskDraft::new("From service", "alice"))
        .unwrap();
    assert_eq!((created.x, created.y), DEFAULT_POSITION);
    assert_eq!(created.checklist, default_checklist());

    let fetched = service.get_task(created.id).unwrap().unwrap();
    assert_eq!(fetched, created);

    let pinned = service
        .create_task(
            &TaskDraft::new("Pinned", "alice")
                .at(0.3, 0.7)
                .with_checklist(vec![ChecklistItem::with_id("1", "Only step")]),
        )
        .unwrap();
    assert_eq!((pinned.x, pinned.y), (0.3, 0.7));
    assert_eq!(pinned.checklist.len(), 1);

    let titles: Vec<String> = service
        .list_tasks_by_user("alice")
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, ["From service", "Pinned"]);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tasks_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("tasks"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_tasks_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE tasks (
            uuid TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            checklist TEXT NOT NULL,
            x REAL NOT NULL,
            y REAL NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTaskRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "tasks",
            column: "user_id"
        })
    ));
}

#[test]
fn corrupt_checklist_column_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO tasks (uuid, title, checklist, x, y, user_id)
         VALUES ('00000000-0000-4000-8000-000000000001', 'broken', 'not json', 0.5, 0.5, 'alice');",
        [],
    )
    .unwrap();

    let err = repo
        .get_task(Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap())
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn stored_row_violating_model_invariants_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    conn.execute_batch(
        r#"
        INSERT INTO tasks (uuid, title, checklist, x, y, user_id)
        VALUES ('00000000-0000-4000-8000-000000000002', '   ',
                '[{"id":"1","text":"Step","status":"not_started"}]', 0.5, 0.5, 'alice');
        INSERT INTO tasks (uuid, title, checklist, x, y, user_id)
        VALUES ('00000000-0000-4000-8000-000000000003', 'No items left', '[]',
                0.5, 0.5, 'alice');
        "#,
    )
    .unwrap();

    let blank_title = repo
        .get_task(Uuid::parse_str("00000000-0000-4000-8000-000000000002").unwrap())
        .unwrap_err();
    assert!(matches!(blank_title, RepoError::InvalidData(_)));

    let empty_checklist = repo
        .get_task(Uuid::parse_str("00000000-0000-4000-8000-000000000003").unwrap())
        .unwrap_err();
    assert!(matches!(empty_checklist, RepoError::InvalidData(_)));
}
