//! Comments on tasks.

use super::{Database, now_ms};
use crate::types::Comment;
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COMMENT_SELECT: &str = "SELECT c.id, c.task_id, t.name AS task_name, c.author_id,
            w.username AS author_username, c.content, c.created_at, c.updated_at
     FROM comments c
     JOIN tasks t ON t.id = c.task_id
     JOIN workers w ON w.id = c.author_id";

fn parse_comment_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        task_name: row.get("task_name")?,
        author_id: row.get("author_id")?,
        author_username: row.get("author_username")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn get_comment_internal(conn: &Connection, comment_id: i64) -> Result<Option<Comment>> {
    let comment = conn
        .query_row(
            &format!("{COMMENT_SELECT} WHERE c.id = ?1"),
            params![comment_id],
            parse_comment_row,
        )
        .optional()?;
    Ok(comment)
}

impl Database {
    /// Add a comment to a task.
    pub fn add_comment(&self, task_id: i64, author_id: i64, content: &str) -> Result<Comment> {
        self.with_conn(|conn| {
            let now = now_ms();
            conn.execute(
                "INSERT INTO comments (task_id, author_id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![task_id, author_id, content, now],
            )?;
            let id = conn.last_insert_rowid();
            get_comment_internal(conn, id)?
                .ok_or_else(|| anyhow!("comment {} vanished after insert", id))
        })
    }

    pub fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        self.with_conn(|conn| get_comment_internal(conn, comment_id))
    }

    /// Get a comment only if `author_id` wrote it.
    pub fn get_comment_by_author(&self, comment_id: i64, author_id: i64) -> Result<Option<Comment>> {
        Ok(self
            .get_comment(comment_id)?
            .filter(|comment| comment.author_id == author_id))
    }

    /// Comments on a task, oldest first.
    pub fn comments_for_task(&self, task_id: i64) -> Result<Vec<Comment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE c.task_id = ?1 ORDER BY c.created_at ASC, c.id ASC"
            ))?;
            let comments = stmt
                .query_map(params![task_id], parse_comment_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(comments)
        })
    }

    /// Edit a comment. Only its author may; returns false otherwise.
    pub fn update_comment(&self, comment_id: i64, author_id: i64, content: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3 AND author_id = ?4",
                params![content, now_ms(), comment_id, author_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete a comment. Only its author may; returns false otherwise.
    pub fn delete_comment(&self, comment_id: i64, author_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM comments WHERE id = ?1 AND author_id = ?2",
                params![comment_id, author_id],
            )?;
            Ok(changed > 0)
        })
    }
}
