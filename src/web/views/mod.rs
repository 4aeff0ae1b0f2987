//! Request handlers, one module per entity.

pub mod catalog;
pub mod comments;
pub mod index;
pub mod tasks;
pub mod workers;

use axum::response::Html;

use super::templates;
use crate::error::{WebError, WebResult};
use crate::types::Worker;

/// Record ids in paths are positive integers; anything else is unknown.
pub(crate) fn parse_id(raw: &str, what: &str) -> WebResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(WebError::not_found(what)),
    }
}

pub(crate) fn render(title: &str, worker: &Worker, content: &str) -> Html<String> {
    Html(templates::page(title, Some(worker), content))
}
