//! Login sessions keyed by an opaque token.

use super::{Database, now_ms};
use crate::types::Worker;
use anyhow::Result;
use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

impl Database {
    /// Start a session for a worker and return its token.
    pub fn create_session(&self, worker_id: i64, ttl_hours: i64) -> Result<String> {
        let token = Uuid::new_v4().simple().to_string();
        self.with_conn(|conn| {
            let now = now_ms();
            conn.execute(
                "INSERT INTO sessions (token, worker_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                params![token, worker_id, now, now + ttl_hours * MS_PER_HOUR],
            )?;
            Ok(())
        })?;
        Ok(token)
    }

    /// The worker a live session belongs to.
    pub fn worker_for_session(&self, token: &str) -> Result<Option<Worker>> {
        let worker_id: Option<i64> = self.with_conn(|conn| {
            let id = conn
                .query_row(
                    "SELECT worker_id FROM sessions WHERE token = ?1 AND expires_at > ?2",
                    params![token, now_ms()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })?;
        match worker_id {
            Some(id) => self.get_worker(id),
            None => Ok(None),
        }
    }

    pub fn delete_session(&self, token: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
            Ok(changed > 0)
        })
    }

    /// Drop expired sessions. Returns how many were removed.
    pub fn purge_expired_sessions(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now_ms()])?;
            Ok(removed)
        })
    }
}
