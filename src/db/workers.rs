//! Worker accounts.

use super::{Database, Page, PageRequest, like_pattern, now_ms};
use crate::types::{Worker, WorkerInput};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const WORKER_COLUMNS: &str = "w.id, w.username, w.first_name, w.last_name, w.email,
     w.position_id, p.name AS position_name, w.date_joined";

fn parse_worker_row(row: &Row) -> rusqlite::Result<Worker> {
    Ok(Worker {
        id: row.get("id")?,
        username: row.get("username")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        position_id: row.get("position_id")?,
        position_name: row.get("position_name")?,
        date_joined: row.get("date_joined")?,
    })
}

/// Another account already holds this username.
#[derive(Debug, thiserror::Error)]
#[error("username {0} is already taken")]
pub struct UsernameTaken(pub String);

/// Turn a failed write on the `username` UNIQUE column into `UsernameTaken`.
fn map_username_conflict(err: rusqlite::Error, username: &str) -> anyhow::Error {
    match err {
        rusqlite::Error::SqliteFailure(ref e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            UsernameTaken(username.to_string()).into()
        }
        other => other.into(),
    }
}

fn get_worker_internal(conn: &Connection, worker_id: i64) -> Result<Option<Worker>> {
    let worker = conn
        .query_row(
            &format!(
                "SELECT {WORKER_COLUMNS} FROM workers w
                 LEFT JOIN positions p ON p.id = w.position_id
                 WHERE w.id = ?1"
            ),
            params![worker_id],
            parse_worker_row,
        )
        .optional()?;
    Ok(worker)
}

impl Database {
    /// Create a worker account with an already hashed password.
    pub fn create_worker(&self, input: &WorkerInput, password_hash: &str) -> Result<Worker> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO workers (username, first_name, last_name, email, position_id, password_hash, date_joined)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    input.username,
                    input.first_name,
                    input.last_name,
                    input.email,
                    input.position_id,
                    password_hash,
                    now_ms()
                ],
            )
            .map_err(|e| map_username_conflict(e, &input.username))?;
            let id = conn.last_insert_rowid();
            get_worker_internal(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("worker {} vanished after insert", id))
        })
    }

    /// Get a worker by ID.
    pub fn get_worker(&self, worker_id: i64) -> Result<Option<Worker>> {
        self.with_conn(|conn| get_worker_internal(conn, worker_id))
    }

    /// Look up a worker and their password hash by username (for login).
    pub fn get_worker_credentials(&self, username: &str) -> Result<Option<(Worker, String)>> {
        self.with_conn(|conn| {
            let found: Option<(i64, String)> = conn
                .query_row(
                    "SELECT id, password_hash FROM workers WHERE username = ?1",
                    params![username],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            match found {
                Some((id, hash)) => Ok(get_worker_internal(conn, id)?.map(|w| (w, hash))),
                None => Ok(None),
            }
        })
    }

    /// Check whether a username is taken, optionally ignoring one worker (the one being edited).
    pub fn username_exists(&self, username: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM workers WHERE username = ?1 AND (?2 IS NULL OR id != ?2)",
                params![username, exclude_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Replace a worker's profile fields. Returns false when the worker does not exist.
    pub fn update_worker(&self, worker_id: i64, input: &WorkerInput) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE workers
                 SET username = ?1, first_name = ?2, last_name = ?3, email = ?4, position_id = ?5
                 WHERE id = ?6",
                params![
                    input.username,
                    input.first_name,
                    input.last_name,
                    input.email,
                    input.position_id,
                    worker_id
                ],
            )
            .map_err(|e| map_username_conflict(e, &input.username))?;
            Ok(changed > 0)
        })
    }

    /// Replace a worker's password hash.
    pub fn set_worker_password(&self, worker_id: i64, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE workers SET password_hash = ?1 WHERE id = ?2",
                params![password_hash, worker_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete a worker. Assignments, comments and sessions go with it.
    pub fn delete_worker(&self, worker_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM workers WHERE id = ?1", params![worker_id])?;
            Ok(changed > 0)
        })
    }

    /// All workers ordered by last name (for assignee widgets).
    pub fn all_workers(&self) -> Result<Vec<Worker>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {WORKER_COLUMNS} FROM workers w
                 LEFT JOIN positions p ON p.id = w.position_id
                 ORDER BY w.last_name, w.id"
            ))?;
            let workers = stmt
                .query_map([], parse_worker_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(workers)
        })
    }

    /// Workers holding a position.
    pub fn workers_with_position(&self, position_id: i64) -> Result<Vec<Worker>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {WORKER_COLUMNS} FROM workers w
                 LEFT JOIN positions p ON p.id = w.position_id
                 WHERE w.position_id = ?1
                 ORDER BY w.last_name, w.id"
            ))?;
            let workers = stmt
                .query_map(params![position_id], parse_worker_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(workers)
        })
    }

    /// One page of workers whose username, first or last name contains `search`.
    pub fn list_workers(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Option<Page<Worker>>> {
        self.with_conn(|conn| {
            let pattern = search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(like_pattern);

            let mut where_clause = String::new();
            let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::new();
            if let Some(ref p) = pattern {
                where_clause.push_str(
                    " WHERE (casefold(w.username) LIKE ?1 ESCAPE '\\'
                        OR casefold(w.first_name) LIKE ?1 ESCAPE '\\'
                        OR casefold(w.last_name) LIKE ?1 ESCAPE '\\')",
                );
                params_vec.push(p);
            }

            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM workers w{where_clause}"),
                params_vec.as_slice(),
                |row| row.get(0),
            )?;

            let Some(window) = request.resolve(total) else {
                return Ok(None);
            };

            let mut stmt = conn.prepare(&format!(
                "SELECT {WORKER_COLUMNS} FROM workers w
                 LEFT JOIN positions p ON p.id = w.position_id
                 {where_clause}
                 ORDER BY w.last_name, w.id
                 LIMIT {} OFFSET {}",
                window.limit, window.offset
            ))?;
            let workers = stmt
                .query_map(params_vec.as_slice(), parse_worker_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(Some(Page::new(workers, total, window)))
        })
    }
}
