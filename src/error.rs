//! Structured error types for web responses.

use crate::web::render::html_escape;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    Unauthorized,
    Database,
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unauthorized => StatusCode::SEE_OTHER,
            ErrorCode::Database | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned by request handlers.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct WebError {
    pub code: ErrorCode,
    pub message: String,
    /// Where to return after logging in (for `Unauthorized`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl WebError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            next: None,
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found", what))
    }

    pub fn invalid_page() -> Self {
        Self::new(ErrorCode::NotFound, "Invalid page")
    }

    /// Send an anonymous visitor to the login page, remembering `path`.
    pub fn login_required(path: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Unauthorized,
            message: "Login required".into(),
            next: Some(path.into()),
        }
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Database, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Internal, err.to_string())
    }

    /// Login URL carrying the `next` parameter.
    pub fn login_url(&self) -> String {
        match &self.next {
            Some(next) => format!("/accounts/login/?next={}", urlencoding::encode(next)),
            None => "/accounts/login/".to_string(),
        }
    }
}

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<WebError>() {
            Ok(web_err) => web_err,
            Err(err) => match err.downcast::<rusqlite::Error>() {
                Ok(db_err) => WebError::database(db_err),
                Err(err) => WebError::internal(err),
            },
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        match self.code {
            ErrorCode::Unauthorized => {
                (status, [(header::LOCATION, self.login_url())]).into_response()
            }
            ErrorCode::Database | ErrorCode::Internal => {
                tracing::error!(code = ?self.code, "{}", self.message);
                (status, Html(error_page(status, "Something went wrong on our side."))).into_response()
            }
            ErrorCode::NotFound => {
                tracing::debug!(code = ?self.code, "{}", self.message);
                (status, Html(error_page(status, &self.message))).into_response()
            }
        }
    }
}

fn error_page(status: StatusCode, message: &str) -> String {
    let title = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{message}</p><p><a href=\"/\">Home</a></p></body></html>",
        title = html_escape(&title),
        message = html_escape(message)
    )
}

/// Result type for request handlers.
pub type WebResult<T> = std::result::Result<T, WebError>;
