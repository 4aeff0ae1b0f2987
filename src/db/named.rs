//! Shared storage for the two name/description catalogs (task types, positions).

use super::{Page, PageRequest, like_pattern};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// A raw catalog row: (id, name, description).
pub(crate) type NamedRow = (i64, String, String);

pub(crate) fn insert(conn: &Connection, table: &str, name: &str, description: &str) -> Result<i64> {
    conn.execute(
        &format!("INSERT INTO {table} (name, description) VALUES (?1, ?2)"),
        params![name, description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn get(conn: &Connection, table: &str, id: i64) -> Result<Option<NamedRow>> {
    let row = conn
        .query_row(
            &format!("SELECT id, name, description FROM {table} WHERE id = ?1"),
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;
    Ok(row)
}

pub(crate) fn update(
    conn: &Connection,
    table: &str,
    id: i64,
    name: &str,
    description: &str,
) -> Result<bool> {
    let changed = conn.execute(
        &format!("UPDATE {table} SET name = ?1, description = ?2 WHERE id = ?3"),
        params![name, description, id],
    )?;
    Ok(changed > 0)
}

pub(crate) fn delete(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
    Ok(changed > 0)
}

pub(crate) fn all(conn: &Connection, table: &str) -> Result<Vec<NamedRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, description FROM {table} ORDER BY name, id"
    ))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Paginated listing filtered by a case-insensitive name substring.
pub(crate) fn list(
    conn: &Connection,
    table: &str,
    search: Option<&str>,
    request: PageRequest,
) -> Result<Option<Page<NamedRow>>> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);

    let (where_clause, params_vec): (&str, Vec<&dyn rusqlite::ToSql>) = match pattern.as_ref() {
        Some(p) => (" WHERE casefold(name) LIKE ?1 ESCAPE '\\'", vec![p as &dyn rusqlite::ToSql]),
        None => ("", vec![]),
    };

    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table}{where_clause}"),
        params_vec.as_slice(),
        |row| row.get(0),
    )?;

    let Some(window) = request.resolve(total) else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, description FROM {table}{where_clause}
         ORDER BY name, id LIMIT {} OFFSET {}",
        window.limit, window.offset
    ))?;
    let items = stmt
        .query_map(params_vec.as_slice(), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(Page::new(items, total, window)))
}
