//! Browser UI.
//!
//! Server-rendered HTML pages over the task database, served by axum.

pub mod auth;
pub mod render;
pub mod server;
pub mod templates;
pub mod views;

pub use server::{AppState, build_router, serve, start_server};
