//! Task type catalog.

use super::named::{self, NamedRow};
use super::{Database, Page, PageRequest};
use crate::types::TaskType;
use anyhow::Result;

const TABLE: &str = "task_types";

fn from_row((id, name, description): NamedRow) -> TaskType {
    TaskType {
        id,
        name,
        description,
    }
}

impl Database {
    /// Create a task type.
    pub fn create_task_type(&self, name: &str, description: &str) -> Result<TaskType> {
        self.with_conn(|conn| {
            let id = named::insert(conn, TABLE, name, description)?;
            Ok(TaskType {
                id,
                name: name.to_string(),
                description: description.to_string(),
            })
        })
    }

    /// Get a task type by ID.
    pub fn get_task_type(&self, id: i64) -> Result<Option<TaskType>> {
        self.with_conn(|conn| Ok(named::get(conn, TABLE, id)?.map(from_row)))
    }

    /// Replace a task type's fields. Returns false when it does not exist.
    pub fn update_task_type(&self, id: i64, name: &str, description: &str) -> Result<bool> {
        self.with_conn(|conn| named::update(conn, TABLE, id, name, description))
    }

    /// Delete a task type. Tasks of this type keep existing with no type.
    pub fn delete_task_type(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| named::delete(conn, TABLE, id))
    }

    /// All task types ordered by name (for select widgets).
    pub fn all_task_types(&self) -> Result<Vec<TaskType>> {
        self.with_conn(|conn| Ok(named::all(conn, TABLE)?.into_iter().map(from_row).collect()))
    }

    /// One page of task types whose name contains `search`.
    pub fn list_task_types(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Option<Page<TaskType>>> {
        self.with_conn(|conn| {
            Ok(named::list(conn, TABLE, search, request)?.map(|page| page.map(from_row)))
        })
    }
}
