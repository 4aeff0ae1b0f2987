use axum::{extract::State, response::Html};

use super::render;
use crate::error::WebResult;
use crate::web::auth::CurrentWorker;
use crate::web::render::task_table;
use crate::web::server::AppState;

/// Home page: overall counts and the visitor's own active tasks.
pub async fn home(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
) -> WebResult<Html<String>> {
    let counts = state.db().home_counts()?;
    let active = state.db().active_tasks_for_worker(worker.id)?;

    let content = format!(
        r#"<div class="grid-stats">
            <div class="card stat">
                <div class="stat-value">{}</div>
                <div class="stat-label">Tasks</div>
            </div>
            <div class="card stat">
                <div class="stat-value">{}</div>
                <div class="stat-label">Workers</div>
            </div>
            <div class="card stat">
                <div class="stat-value">{}</div>
                <div class="stat-label">Active tasks</div>
            </div>
        </div>
        <h2>My active tasks</h2>
        {}"#,
        counts.num_tasks,
        counts.num_workers,
        counts.num_active_tasks,
        task_table(&active),
    );
    Ok(render("Home", &worker, &content))
}
