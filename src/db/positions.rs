//! Worker position catalog.

use super::named::{self, NamedRow};
use super::{Database, Page, PageRequest};
use crate::types::Position;
use anyhow::Result;

const TABLE: &str = "positions";

fn from_row((id, name, description): NamedRow) -> Position {
    Position {
        id,
        name,
        description,
    }
}

impl Database {
    /// Create a position.
    pub fn create_position(&self, name: &str, description: &str) -> Result<Position> {
        self.with_conn(|conn| {
            let id = named::insert(conn, TABLE, name, description)?;
            Ok(Position {
                id,
                name: name.to_string(),
                description: description.to_string(),
            })
        })
    }

    /// Get a position by ID.
    pub fn get_position(&self, id: i64) -> Result<Option<Position>> {
        self.with_conn(|conn| Ok(named::get(conn, TABLE, id)?.map(from_row)))
    }

    /// Replace a position's fields. Returns false when it does not exist.
    pub fn update_position(&self, id: i64, name: &str, description: &str) -> Result<bool> {
        self.with_conn(|conn| named::update(conn, TABLE, id, name, description))
    }

    /// Delete a position. Workers holding it keep existing with no position.
    pub fn delete_position(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| named::delete(conn, TABLE, id))
    }

    /// All positions ordered by name (for select widgets).
    pub fn all_positions(&self) -> Result<Vec<Position>> {
        self.with_conn(|conn| Ok(named::all(conn, TABLE)?.into_iter().map(from_row).collect()))
    }

    /// One page of positions whose name contains `search`.
    pub fn list_positions(
        &self,
        search: Option<&str>,
        request: PageRequest,
    ) -> Result<Option<Page<Position>>> {
        self.with_conn(|conn| {
            Ok(named::list(conn, TABLE, search, request)?.map(|page| page.map(from_row)))
        })
    }
}
