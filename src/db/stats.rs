//! Counts shown on the home page.

use super::Database;
use crate::types::Status;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HomeCounts {
    pub num_tasks: i64,
    pub num_workers: i64,
    pub num_active_tasks: i64,
}

impl Database {
    pub fn home_counts(&self) -> Result<HomeCounts> {
        self.with_conn(|conn| {
            let inactive = Status::INACTIVE
                .iter()
                .map(|s| format!("'{}'", s.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            let (num_tasks, num_active_tasks): (i64, i64) = conn.query_row(
                &format!(
                    "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status NOT IN ({inactive}) THEN 1 ELSE 0 END), 0)
                     FROM tasks"
                ),
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let num_workers: i64 =
                conn.query_row("SELECT COUNT(*) FROM workers", [], |row| row.get(0))?;
            Ok(HomeCounts {
                num_tasks,
                num_workers,
                num_active_tasks,
            })
        })
    }
}
