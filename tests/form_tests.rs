//! Forms validated against a live store.

use task_manager::db::Database;
use task_manager::forms::{
    FormData, TaskForm, USERNAME_TAKEN, WorkerCreationForm, WorkerForm,
};
use task_manager::password::{hash_password, verify_password};
use task_manager::query::QueryParams;
use task_manager::types::WorkerInput;

fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn data(pairs: &[(&str, &str)]) -> FormData {
    QueryParams::from_pairs(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

fn add_worker(db: &Database, username: &str) -> i64 {
    db.create_worker(
        &WorkerInput {
            username: username.into(),
            ..Default::default()
        },
        "hash",
    )
    .expect("Failed to create worker")
    .id
}

#[test]
fn creation_form_checks_usernames_in_the_store() {
    let db = setup_db();
    add_worker(&db, "existing_user");
    let form = WorkerCreationForm::new(&[]);

    let errors = form
        .clean(
            &data(&[
                ("username", "existing_user"),
                ("password1", "pass123"),
                ("password2", "pass123"),
            ]),
            |u| db.username_exists(u, None),
        )
        .expect("Failed to query usernames")
        .unwrap_err();
    assert_eq!(errors.get("username"), [USERNAME_TAKEN]);

    let new_worker = form
        .clean(
            &data(&[
                ("username", "new_user"),
                ("password1", "pass123"),
                ("password2", "pass123"),
            ]),
            |u| db.username_exists(u, None),
        )
        .expect("Failed to query usernames")
        .expect("Form should be valid");

    let hash = hash_password(&new_worker.password).expect("Failed to hash password");
    let created = db
        .create_worker(&new_worker.input, &hash)
        .expect("Failed to create worker");
    let (_, stored) = db
        .get_worker_credentials("new_user")
        .expect("Failed to load credentials")
        .expect("Worker should exist");
    assert_eq!(created.username, "new_user");
    assert!(verify_password("pass123", &stored).expect("Failed to verify"));
}

#[test]
fn update_form_allows_keeping_own_username() {
    let db = setup_db();
    let id = add_worker(&db, "alice");
    add_worker(&db, "bob");
    let positions = vec![db.create_position("Developer", "").expect("Failed to create position")];
    let form = WorkerForm::new(&positions);

    let position = positions[0].id.to_string();
    let input = form
        .clean(
            &data(&[("username", "alice"), ("position", position.as_str())]),
            |u| db.username_exists(u, Some(id)),
        )
        .expect("Failed to query usernames")
        .expect("Own username should be accepted");
    assert_eq!(input.position_id, Some(positions[0].id));

    let errors = form
        .clean(&data(&[("username", "bob")]), |u| {
            db.username_exists(u, Some(id))
        })
        .expect("Failed to query usernames")
        .unwrap_err();
    assert_eq!(errors.get("username"), [USERNAME_TAKEN]);
}

#[test]
fn task_form_round_trips_through_the_store() {
    let db = setup_db();
    let alice = add_worker(&db, "alice");
    let bug = db.create_task_type("Bug", "").expect("Failed to create task type");
    let form = TaskForm::new(
        &db.all_task_types().expect("Failed to list task types"),
        &db.all_workers().expect("Failed to list workers"),
    );

    let bug_id = bug.id.to_string();
    let alice_id = alice.to_string();
    let errors = form
        .clean(&data(&[
            ("name", "Fix login"),
            ("description", "Users are logged out"),
            ("priority", "urgent"),
            ("status", "pending"),
            ("task_type", bug_id.as_str()),
            ("assignee", alice_id.as_str()),
            ("deadline", "2026-11-02T17:30"),
        ]))
        .unwrap_err();
    assert!(errors.contains("priority"));

    let input = form
        .clean(&data(&[
            ("name", "Fix login"),
            ("description", "Users are logged out"),
            ("priority", "critical"),
            ("status", "pending"),
            ("task_type", bug_id.as_str()),
            ("assignee", alice_id.as_str()),
            ("deadline", "2026-11-02T17:30"),
        ]))
        .expect("Form should be valid");
    let task = db.create_task(&input).expect("Failed to create task");

    // Editing an unchanged task yields the same input.
    let reloaded = db
        .get_task(task.id)
        .expect("Failed to load task")
        .expect("Task should exist");
    assert_eq!(form.clean(&FormData::from(&reloaded)), Ok(input));
    assert_eq!(reloaded.task_type_name.as_deref(), Some("Bug"));
}
