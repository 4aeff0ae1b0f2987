//! Task CRUD, assignee links and the filtered task list.

use super::{Database, Page, PageRequest, like_pattern, now_ms};
use crate::filters::{ActiveFilter, TaskFilter};
use crate::types::{Assignee, DEADLINE_FORMAT, Status, Task, TaskInput};
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

const TASK_COLUMNS: &str = "t.id, t.name, t.description, t.deadline, t.status, t.priority,
     t.task_type_id, tt.name AS task_type_name, t.created_at, t.updated_at";

const TASK_FROM: &str = "FROM tasks t LEFT JOIN task_types tt ON tt.id = t.task_type_id";

/// Tasks without a deadline sort first, as NULL is the smallest value in SQLite.
const TASK_ORDER: &str = "ORDER BY t.deadline ASC, t.id ASC";

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

/// Parse a task row. Assignees are loaded separately.
fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let deadline: Option<String> = row.get("deadline")?;
    let deadline = deadline
        .map(|raw| {
            NaiveDateTime::parse_from_str(&raw, DEADLINE_FORMAT)
                .map_err(|e| conversion_error(3, format!("bad deadline {:?}: {}", raw, e)))
        })
        .transpose()?;
    let status: String = row.get("status")?;
    let priority: String = row.get("priority")?;

    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        deadline,
        status: status.parse().map_err(|e| conversion_error(4, e))?,
        priority: priority.parse().map_err(|e| conversion_error(5, e))?,
        task_type_id: row.get("task_type_id")?,
        task_type_name: row.get("task_type_name")?,
        assignees: Vec::new(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_assignees(conn: &Connection, task_id: i64) -> Result<Vec<Assignee>> {
    let mut stmt = conn.prepare_cached(
        "SELECT w.id, w.username, w.first_name, w.last_name
         FROM task_assignees ta
         JOIN workers w ON w.id = ta.worker_id
         WHERE ta.task_id = ?1
         ORDER BY w.last_name, w.id",
    )?;
    let assignees = stmt
        .query_map(params![task_id], |row| {
            Ok(Assignee {
                id: row.get(0)?,
                username: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(assignees)
}

/// Replace a task's assignee set.
fn sync_assignees(conn: &Connection, task_id: i64, worker_ids: &[i64]) -> Result<()> {
    conn.execute("DELETE FROM task_assignees WHERE task_id = ?1", params![task_id])?;
    for worker_id in worker_ids {
        conn.execute(
            "INSERT OR IGNORE INTO task_assignees (task_id, worker_id) VALUES (?1, ?2)",
            params![task_id, worker_id],
        )?;
    }
    Ok(())
}

fn get_task_internal(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} {TASK_FROM} WHERE t.id = ?1"),
            params![task_id],
            parse_task_row,
        )
        .optional()?;
    match task {
        Some(mut task) => {
            task.assignees = load_assignees(conn, task.id)?;
            Ok(Some(task))
        }
        None => Ok(None),
    }
}

/// Run a task query and attach assignees to every row.
fn query_tasks(conn: &Connection, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(sql)?;
    let mut tasks = stmt
        .query_map(params, parse_task_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for task in &mut tasks {
        task.assignees = load_assignees(conn, task.id)?;
    }
    Ok(tasks)
}

fn format_deadline(deadline: Option<NaiveDateTime>) -> Option<String> {
    deadline.map(|d| d.format(DEADLINE_FORMAT).to_string())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn status_list(statuses: &[Status]) -> String {
    statuses
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Translate a filter into a WHERE clause and its bound parameters.
fn filter_clause(filter: &TaskFilter, today: NaiveDate) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(ref search) = filter.search {
        clauses.push(format!(
            "(casefold(t.name) LIKE ?{0} ESCAPE '\\'
              OR casefold(t.description) LIKE ?{0} ESCAPE '\\'
              OR casefold(tt.name) LIKE ?{0} ESCAPE '\\'
              OR EXISTS (SELECT 1 FROM task_assignees sa
                         JOIN workers sw ON sw.id = sa.worker_id
                         WHERE sa.task_id = t.id AND casefold(sw.username) LIKE ?{0} ESCAPE '\\'))",
            param_idx
        ));
        params_vec.push(Box::new(like_pattern(search)));
        param_idx += 1;
    }

    if let Some(task_type) = filter.task_type {
        clauses.push(format!("t.task_type_id = ?{}", param_idx));
        params_vec.push(Box::new(task_type));
        param_idx += 1;
    }

    if let Some(assignee) = filter.assignee {
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM task_assignees fa WHERE fa.task_id = t.id AND fa.worker_id = ?{})",
            param_idx
        ));
        params_vec.push(Box::new(assignee));
        param_idx += 1;
    }

    if let Some(priority) = filter.priority {
        clauses.push(format!("t.priority = ?{}", param_idx));
        params_vec.push(Box::new(priority.as_str()));
        param_idx += 1;
    }

    if let Some(status) = filter.status {
        clauses.push(format!("t.status = ?{}", param_idx));
        params_vec.push(Box::new(status.as_str()));
        param_idx += 1;
    }

    match filter.active {
        Some(ActiveFilter::Active) => clauses.push(format!(
            "t.status NOT IN ({})",
            status_list(&Status::INACTIVE)
        )),
        Some(ActiveFilter::Inactive) => {
            clauses.push(format!("t.status IN ({})", status_list(&Status::INACTIVE)))
        }
        None => {}
    }

    let range = filter.deadline_range(today);
    if !range.is_unbounded() {
        clauses.push("t.deadline IS NOT NULL".to_string());
    }
    if let Some(start) = range.start {
        clauses.push(format!("date(t.deadline) >= ?{}", param_idx));
        params_vec.push(Box::new(format_date(start)));
        param_idx += 1;
    }
    if let Some(end) = range.end {
        clauses.push(format!("date(t.deadline) <= ?{}", param_idx));
        params_vec.push(Box::new(format_date(end)));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (where_clause, params_vec)
}

impl Database {
    /// Create a task and its assignee links.
    pub fn create_task(&self, input: &TaskInput) -> Result<Task> {
        self.with_conn_mut(|conn| {
            let now = now_ms();
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO tasks (name, description, deadline, status, priority, task_type_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    input.name,
                    input.description,
                    format_deadline(input.deadline),
                    input.status.as_str(),
                    input.priority.as_str(),
                    input.task_type_id,
                    now
                ],
            )?;
            let id = tx.last_insert_rowid();
            sync_assignees(&tx, id, &input.assignee_ids)?;
            tx.commit()?;

            get_task_internal(conn, id)?.ok_or_else(|| anyhow!("task {} vanished after insert", id))
        })
    }

    /// Get a task with its assignees.
    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Replace every editable field of a task, including its assignee set.
    /// Returns false when the task does not exist.
    pub fn update_task(&self, task_id: i64, input: &TaskInput) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE tasks
                 SET name = ?1, description = ?2, deadline = ?3, status = ?4, priority = ?5,
                     task_type_id = ?6, updated_at = ?7
                 WHERE id = ?8",
                params![
                    input.name,
                    input.description,
                    format_deadline(input.deadline),
                    input.status.as_str(),
                    input.priority.as_str(),
                    input.task_type_id,
                    now_ms(),
                    task_id
                ],
            )?;
            if changed == 0 {
                return Ok(false);
            }
            sync_assignees(&tx, task_id, &input.assignee_ids)?;
            tx.commit()?;
            Ok(true)
        })
    }

    /// Delete a task. Comments and assignee links go with it.
    pub fn delete_task(&self, task_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            Ok(changed > 0)
        })
    }

    /// One page of tasks matching `filter`, ordered by deadline.
    /// Returns `None` when the requested page is out of range.
    pub fn list_tasks(
        &self,
        filter: &TaskFilter,
        today: NaiveDate,
        request: PageRequest,
    ) -> Result<Option<Page<Task>>> {
        self.with_conn(|conn| {
            let (where_clause, params_vec) = filter_clause(filter, today);
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|b| b.as_ref()).collect();

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) {TASK_FROM}{where_clause}"),
                params_refs.as_slice(),
                |row| row.get(0),
            )?;

            let Some(window) = request.resolve(total) else {
                return Ok(None);
            };

            let sql = format!(
                "SELECT {TASK_COLUMNS} {TASK_FROM}{where_clause} {TASK_ORDER} LIMIT {} OFFSET {}",
                window.limit, window.offset
            );
            let tasks = query_tasks(conn, &sql, params_refs.as_slice())?;

            Ok(Some(Page::new(tasks, total, window)))
        })
    }

    /// Active tasks assigned to a worker, earliest deadline first.
    pub fn active_tasks_for_worker(&self, worker_id: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TASK_COLUMNS} {TASK_FROM}
                 WHERE t.status NOT IN ({})
                   AND EXISTS (SELECT 1 FROM task_assignees ta WHERE ta.task_id = t.id AND ta.worker_id = ?1)
                 {TASK_ORDER}",
                status_list(&Status::INACTIVE)
            );
            query_tasks(conn, &sql, params![worker_id])
        })
    }

    /// Every task assigned to a worker, earliest deadline first.
    pub fn tasks_assigned_to(&self, worker_id: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TASK_COLUMNS} {TASK_FROM}
                 WHERE EXISTS (SELECT 1 FROM task_assignees ta WHERE ta.task_id = t.id AND ta.worker_id = ?1)
                 {TASK_ORDER}"
            );
            query_tasks(conn, &sql, params![worker_id])
        })
    }

    /// Tasks of one type, earliest deadline first.
    pub fn tasks_of_type(&self, task_type_id: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {TASK_COLUMNS} {TASK_FROM} WHERE t.task_type_id = ?1 {TASK_ORDER}");
            query_tasks(conn, &sql, params![task_type_id])
        })
    }
}
