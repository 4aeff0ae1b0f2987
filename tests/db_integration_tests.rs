//! Integration tests for the database layer.
//!
//! These tests verify the store against an in-memory SQLite database.
//! Tests are organized by entity.

use chrono::{NaiveDate, NaiveDateTime};
use task_manager::db::{Database, PageRequest, PageSelector};
use task_manager::types::{Priority, Status, TaskInput, WorkerInput};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn add_worker(db: &Database, username: &str) -> i64 {
    db.create_worker(
        &WorkerInput {
            username: username.to_string(),
            ..Default::default()
        },
        "hash",
    )
    .expect("Failed to create worker")
    .id
}

fn deadline(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn task_input(name: &str) -> TaskInput {
    TaskInput {
        name: name.to_string(),
        description: format!("{} description", name),
        ..Default::default()
    }
}

fn first_page() -> PageRequest {
    PageRequest::new(PageSelector::Number(1), 10)
}

mod task_type_tests {
    use super::*;

    #[test]
    fn crud_round() {
        let db = setup_db();
        let bug = db.create_task_type("Bug", "Something broken").unwrap();
        assert_eq!(bug.name, "Bug");

        assert!(db.update_task_type(bug.id, "Defect", "").unwrap());
        let fetched = db.get_task_type(bug.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Defect");
        assert_eq!(fetched.description, "");

        assert!(db.delete_task_type(bug.id).unwrap());
        assert!(db.get_task_type(bug.id).unwrap().is_none());
        assert!(!db.delete_task_type(bug.id).unwrap());
    }

    #[test]
    fn listed_by_name_with_search() {
        let db = setup_db();
        for name in ["Research", "Bug", "Feature", "Bugfix"] {
            db.create_task_type(name, "").unwrap();
        }

        let page = db.list_task_types(None, first_page()).unwrap().unwrap();
        let names: Vec<_> = page.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Bug", "Bugfix", "Feature", "Research"]);

        let page = db.list_task_types(Some("bug"), first_page()).unwrap().unwrap();
        assert_eq!(page.total, 2);
    }

    #[test]
    fn deleting_a_type_keeps_its_tasks() {
        let db = setup_db();
        let bug = db.create_task_type("Bug", "").unwrap();
        let task = db
            .create_task(&TaskInput {
                task_type_id: Some(bug.id),
                ..task_input("Fix login")
            })
            .unwrap();
        assert_eq!(task.task_type_name.as_deref(), Some("Bug"));

        db.delete_task_type(bug.id).unwrap();

        let task = db.get_task(task.id).unwrap().expect("task survives");
        assert_eq!(task.task_type_id, None);
        assert_eq!(task.task_type_name, None);
    }
}

mod position_tests {
    use super::*;

    #[test]
    fn deleting_a_position_keeps_its_workers() {
        let db = setup_db();
        let dev = db.create_position("Developer", "").unwrap();
        let worker = db
            .create_worker(
                &WorkerInput {
                    username: "alice".into(),
                    position_id: Some(dev.id),
                    ..Default::default()
                },
                "hash",
            )
            .unwrap();
        assert_eq!(worker.position_name.as_deref(), Some("Developer"));
        assert_eq!(db.workers_with_position(dev.id).unwrap().len(), 1);

        db.delete_position(dev.id).unwrap();

        let worker = db.get_worker(worker.id).unwrap().expect("worker survives");
        assert_eq!(worker.position_id, None);
    }
}

mod worker_tests {
    use super::*;
    use task_manager::db::workers::UsernameTaken;

    #[test]
    fn usernames_are_unique() {
        let db = setup_db();
        let id = add_worker(&db, "alice");

        assert!(db.username_exists("alice", None).unwrap());
        assert!(!db.username_exists("alice", Some(id)).unwrap());
        assert!(!db.username_exists("bob", None).unwrap());

        let duplicate = db.create_worker(
            &WorkerInput {
                username: "alice".into(),
                ..Default::default()
            },
            "hash",
        );
        let err = duplicate.unwrap_err();
        assert_eq!(
            err.downcast_ref::<UsernameTaken>().map(|e| e.0.as_str()),
            Some("alice")
        );
    }

    #[test]
    fn renaming_onto_a_taken_username_is_a_typed_conflict() {
        let db = setup_db();
        add_worker(&db, "alice");
        let bob = add_worker(&db, "bob");

        let err = db
            .update_worker(
                bob,
                &WorkerInput {
                    username: "alice".into(),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is::<UsernameTaken>());
        assert_eq!(db.get_worker(bob).unwrap().unwrap().username, "bob");

        // Other constraint failures are not reported as a taken username.
        let err = db
            .update_worker(
                bob,
                &WorkerInput {
                    username: "bob".into(),
                    position_id: Some(999),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(!err.is::<UsernameTaken>());
    }

    #[test]
    fn credentials_include_the_hash() {
        let db = setup_db();
        add_worker(&db, "alice");
        let (worker, hash) = db.get_worker_credentials("alice").unwrap().unwrap();
        assert_eq!(worker.username, "alice");
        assert_eq!(hash, "hash");
        assert!(db.get_worker_credentials("nobody").unwrap().is_none());
    }

    #[test]
    fn list_orders_by_last_name_and_searches_names() {
        let db = setup_db();
        for (username, first, last) in [
            ("zed", "Zed", "Adams"),
            ("amy", "Amy", "Young"),
            ("dev_one", "Carl", "Miller"),
        ] {
            db.create_worker(
                &WorkerInput {
                    username: username.into(),
                    first_name: first.into(),
                    last_name: last.into(),
                    ..Default::default()
                },
                "hash",
            )
            .unwrap();
        }

        let page = db.list_workers(None, first_page()).unwrap().unwrap();
        let usernames: Vec<_> = page.items.iter().map(|w| w.username.as_str()).collect();
        assert_eq!(usernames, ["zed", "dev_one", "amy"]);

        let page = db.list_workers(Some("dev"), first_page()).unwrap().unwrap();
        assert_eq!(page.total, 1);
        let page = db.list_workers(Some("YOUNG"), first_page()).unwrap().unwrap();
        assert_eq!(page.items[0].username, "amy");
    }

    #[test]
    fn deleting_a_worker_removes_links_comments_and_sessions() {
        let db = setup_db();
        let alice = add_worker(&db, "alice");
        let bob = add_worker(&db, "bob");
        let task = db
            .create_task(&TaskInput {
                assignee_ids: vec![alice, bob],
                ..task_input("Shared")
            })
            .unwrap();
        db.add_comment(task.id, alice, "mine").unwrap();
        db.add_comment(task.id, bob, "theirs").unwrap();
        let token = db.create_session(alice, 1).unwrap();

        assert!(db.delete_worker(alice).unwrap());

        let task = db.get_task(task.id).unwrap().unwrap();
        let assignees: Vec<_> = task.assignees.iter().map(|a| a.id).collect();
        assert_eq!(assignees, vec![bob]);
        let comments = db.comments_for_task(task.id).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author_username, "bob");
        assert!(db.worker_for_session(&token).unwrap().is_none());
    }

    #[test]
    fn password_can_be_replaced() {
        let db = setup_db();
        let id = add_worker(&db, "alice");
        assert!(db.set_worker_password(id, "new-hash").unwrap());
        let (_, hash) = db.get_worker_credentials("alice").unwrap().unwrap();
        assert_eq!(hash, "new-hash");
    }
}

mod task_tests {
    use super::*;
    use task_manager::filters::TaskFilter;

    #[test]
    fn create_uses_defaults_and_allows_no_assignees() {
        let db = setup_db();
        let task = db.create_task(&task_input("Write docs")).unwrap();
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.priority, Priority::Low);
        assert!(task.assignees.is_empty());
        assert!(task.deadline.is_none());
        assert!(task.created_at > 0);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn update_replaces_assignees() {
        let db = setup_db();
        let alice = add_worker(&db, "alice");
        let bob = add_worker(&db, "bob");
        let task = db
            .create_task(&TaskInput {
                assignee_ids: vec![alice],
                ..task_input("Review")
            })
            .unwrap();

        let changed = db
            .update_task(
                task.id,
                &TaskInput {
                    status: Status::InProgress,
                    priority: Priority::High,
                    deadline: Some(deadline(2026, 10, 20, 9)),
                    assignee_ids: vec![bob],
                    ..task_input("Review again")
                },
            )
            .unwrap();
        assert!(changed);

        let task = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(task.name, "Review again");
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.deadline, Some(deadline(2026, 10, 20, 9)));
        let usernames: Vec<_> = task.assignees.iter().map(|a| a.username.as_str()).collect();
        assert_eq!(usernames, ["bob"]);

        assert!(!db.update_task(9999, &task_input("Ghost")).unwrap());
    }

    #[test]
    fn deleting_a_task_removes_its_comments() {
        let db = setup_db();
        let alice = add_worker(&db, "alice");
        let task = db.create_task(&task_input("Temp")).unwrap();
        let comment = db.add_comment(task.id, alice, "note").unwrap();

        assert!(db.delete_task(task.id).unwrap());
        assert!(db.get_comment(comment.id).unwrap().is_none());
    }

    #[test]
    fn list_orders_by_deadline_with_undated_first() {
        let db = setup_db();
        db.create_task(&TaskInput {
            deadline: Some(deadline(2026, 12, 1, 9)),
            ..task_input("Later")
        })
        .unwrap();
        db.create_task(&TaskInput {
            deadline: Some(deadline(2026, 11, 1, 9)),
            ..task_input("Sooner")
        })
        .unwrap();
        db.create_task(&task_input("Whenever")).unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let page = db
            .list_tasks(&TaskFilter::default(), today, first_page())
            .unwrap()
            .unwrap();
        let names: Vec<_> = page.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Whenever", "Sooner", "Later"]);
    }

    #[test]
    fn pagination_windows() {
        let db = setup_db();
        for i in 0..25 {
            db.create_task(&task_input(&format!("Task {i:02}"))).unwrap();
        }
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let filter = TaskFilter::default();

        let page = db
            .list_tasks(&filter, today, PageRequest::new(PageSelector::Number(3), 10))
            .unwrap()
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.start_index(), 21);
        assert_eq!(page.end_index(), 25);
        assert!(!page.has_next());

        let last = db
            .list_tasks(&filter, today, PageRequest::new(PageSelector::Last, 10))
            .unwrap()
            .unwrap();
        assert_eq!(last.page, 3);

        let beyond = db
            .list_tasks(&filter, today, PageRequest::new(PageSelector::Number(4), 10))
            .unwrap();
        assert!(beyond.is_none());
    }

    #[test]
    fn worker_views_of_tasks() {
        let db = setup_db();
        let alice = add_worker(&db, "alice");
        let bug = db.create_task_type("Bug", "").unwrap();
        db.create_task(&TaskInput {
            assignee_ids: vec![alice],
            deadline: Some(deadline(2026, 10, 30, 9)),
            task_type_id: Some(bug.id),
            ..task_input("Open")
        })
        .unwrap();
        db.create_task(&TaskInput {
            assignee_ids: vec![alice],
            status: Status::Completed,
            ..task_input("Done")
        })
        .unwrap();
        db.create_task(&task_input("Unassigned")).unwrap();

        let active: Vec<_> = db
            .active_tasks_for_worker(alice)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(active, ["Open"]);
        assert_eq!(db.tasks_assigned_to(alice).unwrap().len(), 2);
        assert_eq!(db.tasks_of_type(bug.id).unwrap().len(), 1);
    }

    #[test]
    fn home_counts() {
        let db = setup_db();
        add_worker(&db, "alice");
        db.create_task(&task_input("Open")).unwrap();
        db.create_task(&TaskInput {
            status: Status::Blocked,
            ..task_input("Stuck")
        })
        .unwrap();

        let counts = db.home_counts().unwrap();
        assert_eq!(counts.num_tasks, 2);
        assert_eq!(counts.num_workers, 1);
        assert_eq!(counts.num_active_tasks, 1);
    }
}

mod comment_tests {
    use super::*;

    #[test]
    fn only_the_author_can_edit_or_delete() {
        let db = setup_db();
        let alice = add_worker(&db, "alice");
        let bob = add_worker(&db, "bob");
        let task = db.create_task(&task_input("Discuss")).unwrap();
        let comment = db.add_comment(task.id, alice, "first").unwrap();
        assert_eq!(comment.to_string(), "alice on Discuss");

        assert!(db.get_comment_by_author(comment.id, bob).unwrap().is_none());
        assert!(!db.update_comment(comment.id, bob, "hijack").unwrap());
        assert!(!db.delete_comment(comment.id, bob).unwrap());

        assert!(db.update_comment(comment.id, alice, "edited").unwrap());
        assert_eq!(db.get_comment(comment.id).unwrap().unwrap().content, "edited");
        assert!(db.delete_comment(comment.id, alice).unwrap());
    }

    #[test]
    fn comments_are_oldest_first() {
        let db = setup_db();
        let alice = add_worker(&db, "alice");
        let task = db.create_task(&task_input("Thread")).unwrap();
        for content in ["one", "two", "three"] {
            db.add_comment(task.id, alice, content).unwrap();
        }
        let contents: Vec<_> = db
            .comments_for_task(task.id)
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, ["one", "two", "three"]);
    }
}

mod session_tests {
    use super::*;

    #[test]
    fn sessions_resolve_until_deleted() {
        let db = setup_db();
        let alice = add_worker(&db, "alice");
        let token = db.create_session(alice, 1).unwrap();

        let worker = db.worker_for_session(&token).unwrap().unwrap();
        assert_eq!(worker.id, alice);
        assert!(db.worker_for_session("not-a-token").unwrap().is_none());

        assert!(db.delete_session(&token).unwrap());
        assert!(db.worker_for_session(&token).unwrap().is_none());
    }

    #[test]
    fn expired_sessions_are_ignored_and_purged() {
        let db = setup_db();
        let alice = add_worker(&db, "alice");
        let expired = db.create_session(alice, 0).unwrap();
        let live = db.create_session(alice, 1).unwrap();

        assert!(db.worker_for_session(&expired).unwrap().is_none());
        assert_eq!(db.purge_expired_sessions().unwrap(), 1);
        assert!(db.worker_for_session(&live).unwrap().is_some());
    }
}
