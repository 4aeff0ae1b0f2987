//! Task list filtering against a real store with a pinned current date.
//!
//! "Today" is Wednesday 2026-10-14, so this week ends Sunday 2026-10-18 and
//! next week runs 2026-10-19 to 2026-10-25.

use axum::http::Uri;
use chrono::{NaiveDate, NaiveDateTime};
use task_manager::db::{Database, PageRequest, PageSelector};
use task_manager::filters::TaskFilter;
use task_manager::query::QueryParams;
use task_manager::types::{Priority, Status, TaskInput, WorkerInput};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
}

fn at(m: u32, d: u32, h: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2026, m, d).and_then(|date| date.and_hms_opt(h, 0, 0))
}

struct Fixture {
    db: Database,
    alice: i64,
    bug_type: i64,
}

/// One task per interesting deadline plus a spread of statuses.
fn fixture() -> Fixture {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    let alice = db
        .create_worker(
            &WorkerInput {
                username: "alice".into(),
                ..Default::default()
            },
            "hash",
        )
        .unwrap()
        .id;
    let bug_type = db.create_task_type("Bug", "").unwrap().id;

    let tasks = [
        ("Overdue report", at(10, 13, 17), Status::Pending, Priority::High),
        ("Standup notes", at(10, 14, 23), Status::InProgress, Priority::Low),
        ("Deploy fix", at(10, 15, 9), Status::Reviewing, Priority::Critical),
        ("Weekend cleanup", at(10, 18, 12), Status::Paused, Priority::Medium),
        ("Sprint planning", at(10, 19, 10), Status::Pending, Priority::Medium),
        ("Retro", at(10, 25, 16), Status::Completed, Priority::Low),
        ("Someday", None, Status::Blocked, Priority::Low),
    ];
    for (name, deadline, status, priority) in tasks {
        db.create_task(&TaskInput {
            name: name.to_string(),
            description: format!("{name} details"),
            deadline,
            status,
            priority,
            task_type_id: (name == "Deploy fix").then_some(bug_type),
            assignee_ids: if name.starts_with('S') { vec![alice] } else { vec![] },
        })
        .unwrap();
    }
    Fixture { db, alice, bug_type }
}

fn query(raw: &str) -> QueryParams {
    let uri: Uri = format!("/tasks/?{raw}").parse().expect("Failed to build URI");
    QueryParams::from_uri(&uri).expect("Failed to parse query")
}

fn names(fixture: &Fixture, raw: &str) -> Vec<String> {
    let mut filter = TaskFilter::from_query(&query(raw));
    let task_types: Vec<i64> = fixture.db.all_task_types().unwrap().iter().map(|t| t.id).collect();
    let workers: Vec<i64> = fixture.db.all_workers().unwrap().iter().map(|w| w.id).collect();
    filter.check_choices(&task_types, &workers);
    fixture
        .db
        .list_tasks(&filter, today(), PageRequest::new(PageSelector::Number(1), 50))
        .unwrap()
        .unwrap()
        .items
        .into_iter()
        .map(|t| t.name)
        .collect()
}

#[test]
fn bare_request_shows_active_tasks() {
    let f = fixture();
    assert_eq!(
        names(&f, ""),
        [
            "Overdue report",
            "Standup notes",
            "Deploy fix",
            "Weekend cleanup",
            "Sprint planning"
        ]
    );
}

#[test]
fn inactive_grouping() {
    let f = fixture();
    assert_eq!(names(&f, "active_filter=deactive"), ["Someday", "Retro"]);
    assert_eq!(names(&f, "active_filter=inactive"), ["Someday", "Retro"]);
}

#[test]
fn explicit_empty_activity_shows_everything() {
    let f = fixture();
    assert_eq!(names(&f, "active_filter=").len(), 7);
}

#[test]
fn deadline_buckets() {
    let f = fixture();
    assert_eq!(names(&f, "deadline_filter=today"), ["Standup notes"]);
    assert_eq!(names(&f, "deadline_filter=overdue"), ["Overdue report"]);
    assert_eq!(names(&f, "deadline_filter=tomorrow"), ["Deploy fix"]);
    assert_eq!(
        names(&f, "deadline_filter=this_week"),
        ["Standup notes", "Deploy fix", "Weekend cleanup"]
    );
    assert_eq!(
        names(&f, "deadline_filter=next_week"),
        ["Sprint planning", "Retro"]
    );
}

#[test]
fn bucket_and_explicit_range_intersect() {
    let f = fixture();
    assert_eq!(
        names(&f, "deadline_filter=this_week&deadline_after=2026-10-15&deadline_before=2026-10-15"),
        ["Deploy fix"]
    );
    assert_eq!(
        names(&f, "deadline_after=2026-10-18&deadline_before=2026-10-19"),
        ["Weekend cleanup", "Sprint planning"]
    );
}

#[test]
fn search_matches_name_description_type_and_assignee() {
    let f = fixture();
    assert_eq!(names(&f, "q=retro"), ["Retro"]);
    assert_eq!(names(&f, "q=planning+details"), ["Sprint planning"]);
    assert_eq!(names(&f, "q=bug"), ["Deploy fix"]);
    assert_eq!(
        names(&f, "q=alice"),
        ["Someday", "Standup notes", "Sprint planning"]
    );
}

#[test]
fn filters_combine() {
    let f = fixture();
    let query = format!("assignee={}&active_filter=active&priority=medium", f.alice);
    assert_eq!(names(&f, &query), ["Sprint planning"]);

    let query = format!("task_type={}&status=reviewing", f.bug_type);
    assert_eq!(names(&f, &query), ["Deploy fix"]);

    assert!(names(&f, "status=completed&priority=high").is_empty());
}

#[test]
fn bad_values_are_reported_and_ignored() {
    let f = fixture();
    let filter = TaskFilter::from_query(&query(
        "priority=urgent&deadline_filter=someday&deadline_after=14/10/2026",
    ));
    assert!(!filter.is_valid());
    let fields: Vec<_> = filter.errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, ["priority", "deadline_filter", "deadline_after"]);

    let page = f
        .db
        .list_tasks(&filter, today(), PageRequest::new(PageSelector::Number(1), 50))
        .unwrap()
        .unwrap();
    assert_eq!(page.total, 7);
}

#[test]
fn results_are_distinct_with_several_matching_assignees() {
    let f = fixture();
    let namesake = f
        .db
        .create_worker(
            &WorkerInput {
                username: "alice2".into(),
                ..Default::default()
            },
            "hash",
        )
        .unwrap()
        .id;
    let task = f
        .db
        .create_task(&TaskInput {
            name: "Pair work".into(),
            description: "together".into(),
            assignee_ids: vec![f.alice, namesake],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(task.assignees.len(), 2);
    assert_eq!(names(&f, "q=pair&active_filter=").len(), 1);
    assert_eq!(
        names(&f, "q=alice&active_filter=active"),
        ["Pair work", "Standup notes", "Sprint planning"]
    );
}

#[test]
fn search_folds_case_beyond_ascii() {
    let f = fixture();
    for name in ["Звіт за квартал", "Überprüfung"] {
        f.db.create_task(&TaskInput {
            name: name.into(),
            description: "quarterly".into(),
            ..Default::default()
        })
        .unwrap();
    }
    assert_eq!(names(&f, "q=звіт"), ["Звіт за квартал"]);
    assert_eq!(names(&f, "q=ЗВІТ"), ["Звіт за квартал"]);
    assert_eq!(names(&f, "q=überprüfung"), ["Überprüfung"]);
    assert_eq!(names(&f, "q=%D0%B7%D0%B2%D1%96%D1%82"), ["Звіт за квартал"]);
}

#[test]
fn unknown_type_and_assignee_are_reported_and_ignored() {
    let f = fixture();
    let raw = format!("task_type={}&assignee=999&active_filter=", f.bug_type + 100);
    let mut filter = TaskFilter::from_query(&query(&raw));
    filter.check_choices(&[f.bug_type], &[f.alice]);
    let fields: Vec<_> = filter.errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, ["task_type", "assignee"]);
    assert_eq!(names(&f, &raw).len(), 7);
}
