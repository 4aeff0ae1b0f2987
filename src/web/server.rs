//! HTTP server for the task manager.
//!
//! This module builds the axum router, owns the state shared across
//! handlers and runs the listener with graceful shutdown.

use axum::{
    Router,
    response::{IntoResponse, Json},
    routing::get,
};
use chrono::NaiveDate;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::auth;
use super::views::{catalog, comments, index, tasks, workers};
use crate::config::Config;
use crate::db::{Database, PageRequest, PageSelector};
use crate::error::{WebError, WebResult};
use crate::query::QueryParams;
use crate::types::{Position, TaskType};

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Reference to the task database.
    pub db: Arc<Database>,
    /// Loaded configuration.
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// Get the database reference.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The page requested by `?page=`, sized from configuration.
    pub fn page_request(&self, query: &QueryParams) -> WebResult<PageRequest> {
        let page = PageSelector::parse(query.get("page")).ok_or_else(WebError::invalid_page)?;
        Ok(PageRequest::new(page, self.config.pagination.page_size))
    }

    /// The server's local date, used by the relative deadline filters.
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the router with every page route.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::home))
        .route("/health", get(health))
        // Accounts
        .route("/accounts/login/", get(auth::login_page).post(auth::login_submit))
        .route("/accounts/logout/", axum::routing::post(auth::logout))
        // Task types
        .route("/task-types/", get(catalog::list::<TaskType>))
        .route(
            "/task-types/create/",
            get(catalog::create_page::<TaskType>).post(catalog::create_submit::<TaskType>),
        )
        .route("/task-types/{id}/", get(catalog::detail::<TaskType>))
        .route(
            "/task-types/{id}/update/",
            get(catalog::update_page::<TaskType>).post(catalog::update_submit::<TaskType>),
        )
        .route(
            "/task-types/{id}/delete/",
            get(catalog::delete_page::<TaskType>).post(catalog::delete_submit::<TaskType>),
        )
        // Positions
        .route("/positions/", get(catalog::list::<Position>))
        .route(
            "/positions/create/",
            get(catalog::create_page::<Position>).post(catalog::create_submit::<Position>),
        )
        .route("/positions/{id}/", get(catalog::detail::<Position>))
        .route(
            "/positions/{id}/update/",
            get(catalog::update_page::<Position>).post(catalog::update_submit::<Position>),
        )
        .route(
            "/positions/{id}/delete/",
            get(catalog::delete_page::<Position>).post(catalog::delete_submit::<Position>),
        )
        // Tasks
        .route("/tasks/", get(tasks::list))
        .route(
            "/tasks/create/",
            get(tasks::create_page).post(tasks::create_submit),
        )
        .route("/tasks/{id}/", get(tasks::detail).post(tasks::add_comment))
        .route(
            "/tasks/{id}/update/",
            get(tasks::update_page).post(tasks::update_submit),
        )
        .route(
            "/tasks/{id}/delete/",
            get(tasks::delete_page).post(tasks::delete_submit),
        )
        // Workers
        .route("/workers/", get(workers::list))
        .route(
            "/workers/create/",
            get(workers::create_page).post(workers::create_submit),
        )
        .route("/workers/{id}/", get(workers::detail))
        .route(
            "/workers/{id}/update/",
            get(workers::update_page).post(workers::update_submit),
        )
        .route(
            "/workers/{id}/delete/",
            get(workers::delete_page).post(workers::delete_submit),
        )
        // Comments
        .route(
            "/comments/{id}/update/",
            get(comments::update_page).post(comments::update_submit),
        )
        .route(
            "/comments/{id}/delete/",
            get(comments::delete_page).post(comments::delete_submit),
        )
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve in the background.
///
/// Returns a shutdown sender and the bound address (useful when the
/// configured port is 0).
pub async fn start_server(
    db: Arc<Database>,
    config: Arc<Config>,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let addr = config.bind_addr();
    let app = build_router(AppState::new(db, config));

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    let bound_addr = listener.local_addr()?;

    info!("Task manager listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Task manager shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

/// Serve until Ctrl-C.
pub async fn serve(db: Arc<Database>, config: Arc<Config>) -> anyhow::Result<()> {
    let purged = db.purge_expired_sessions()?;
    if purged > 0 {
        info!(purged, "Removed expired sessions");
    }

    let (shutdown_tx, _addr) = start_server(db, config).await?;
    tokio::signal::ctrl_c().await?;
    let _ = shutdown_tx.send(());
    // Give in-flight requests a moment to finish.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    Ok(())
}
