//! Worker pages: search list, profile with assigned tasks, account forms.

use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::info;

use super::{parse_id, render};
use crate::db::workers::UsernameTaken;
use crate::error::{WebError, WebResult};
use crate::forms::{
    FieldSpec, FormData, FormErrors, SearchForm, USERNAME_TAKEN, WorkerCreationForm, WorkerForm,
};
use crate::password::hash_password;
use crate::query::QueryParams;
use crate::types::Worker;
use crate::web::auth::CurrentWorker;
use crate::web::render::{
    confirm_delete, form, format_timestamp, html_escape, pagination, search_box, task_table,
};
use crate::web::server::AppState;

const LIST_URL: &str = "/workers/";

/// Form errors for a username claimed between validation and the write.
fn taken_errors(err: anyhow::Error) -> WebResult<FormErrors> {
    if !err.is::<UsernameTaken>() {
        return Err(err.into());
    }
    let mut errors = FormErrors::default();
    errors.add("username", USERNAME_TAKEN);
    Ok(errors)
}

fn load(state: &AppState, raw_id: &str) -> WebResult<Worker> {
    let id = parse_id(raw_id, "Worker")?;
    state
        .db()
        .get_worker(id)?
        .ok_or_else(|| WebError::not_found("Worker"))
}

fn form_page(
    viewer: &Worker,
    title: &str,
    fields: &[FieldSpec],
    values: &FormData,
    errors: &FormErrors,
    action: &str,
) -> Html<String> {
    let content = format!(
        r#"<div class="card">{}</div><a href="{LIST_URL}">Back to workers</a>"#,
        form(fields, values, errors, action, "Save")
    );
    render(title, viewer, &content)
}

fn worker_rows(workers: &[Worker]) -> String {
    if workers.is_empty() {
        return r#"<tr><td colspan="5" class="empty-state">No workers found</td></tr>"#.to_string();
    }
    workers
        .iter()
        .map(|w| {
            format!(
                r#"<tr><td><a href="{url}">{username}</a></td><td>{first}</td><td>{last}</td><td>{position}</td><td>{email}</td></tr>"#,
                url = w.url(),
                username = html_escape(&w.username),
                first = html_escape(&w.first_name),
                last = html_escape(&w.last_name),
                position = html_escape(w.position_name.as_deref().unwrap_or("-")),
                email = html_escape(&w.email),
            )
        })
        .collect()
}

pub async fn list(
    State(state): State<AppState>,
    CurrentWorker(viewer): CurrentWorker,
    query: QueryParams,
) -> WebResult<Html<String>> {
    let search = SearchForm::clean(&query);
    let request = state.page_request(&query)?;
    let page = state
        .db()
        .list_workers(Some(search.as_str()), request)?
        .ok_or_else(WebError::invalid_page)?;

    let content = format!(
        r#"<div class="actions">{search}<a href="{LIST_URL}create/">Create worker</a></div>
        <table class="list">
            <thead><tr><th>Username</th><th>First name</th><th>Last name</th><th>Position</th><th>Email</th></tr></thead>
            <tbody>{rows}</tbody>
        </table>
        {pagination}"#,
        search = search_box(&SearchForm::field("Search by username or name"), &query),
        rows = worker_rows(&page.items),
        pagination = pagination(&page, &query, "workers"),
    );
    Ok(render("Workers", &viewer, &content))
}

pub async fn detail(
    State(state): State<AppState>,
    CurrentWorker(viewer): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let worker = load(&state, &id)?;
    let tasks = state.db().tasks_assigned_to(worker.id)?;
    let content = format!(
        r#"<div class="card">
            <p><strong>Username:</strong> {username}</p>
            <p><strong>Name:</strong> {name}</p>
            <p><strong>Email:</strong> {email}</p>
            <p><strong>Position:</strong> {position}</p>
            <p class="muted">Joined {joined}</p>
        </div>
        <div class="actions">
            <a href="{url}update/">Update</a>
            <a href="{url}delete/">Delete</a>
            <a href="{LIST_URL}">Back to workers</a>
        </div>
        <h2>Assigned tasks</h2>
        {tasks}"#,
        username = html_escape(&worker.username),
        name = html_escape(&worker.display_name()),
        email = html_escape(if worker.email.is_empty() { "-" } else { worker.email.as_str() }),
        position = html_escape(worker.position_name.as_deref().unwrap_or("-")),
        joined = format_timestamp(worker.date_joined),
        url = worker.url(),
        tasks = task_table(&tasks),
    );
    Ok(render(&worker.username, &viewer, &content))
}

pub async fn create_page(
    State(state): State<AppState>,
    CurrentWorker(viewer): CurrentWorker,
) -> WebResult<Html<String>> {
    let creation_form = WorkerCreationForm::new(&state.db().all_positions()?);
    Ok(form_page(
        &viewer,
        "Create worker",
        &creation_form.fields(),
        &FormData::default(),
        &FormErrors::default(),
        "/workers/create/",
    ))
}

pub async fn create_submit(
    State(state): State<AppState>,
    CurrentWorker(viewer): CurrentWorker,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let creation_form = WorkerCreationForm::new(&state.db().all_positions()?);
    let data = FormData::from_pairs(pairs);
    let cleaned = creation_form.clean(&data, |username| {
        state.db().username_exists(username, None)
    })?;
    let errors = match cleaned {
        Ok(new_worker) => {
            let hash = hash_password(&new_worker.password)?;
            match state.db().create_worker(&new_worker.input, &hash) {
                Ok(worker) => {
                    info!(worker_id = worker.id, username = %worker.username, "Worker created");
                    return Ok(Redirect::to(LIST_URL).into_response());
                }
                Err(err) => taken_errors(err)?,
            }
        }
        Err(errors) => errors,
    };
    Ok(form_page(
        &viewer,
        "Create worker",
        &creation_form.fields(),
        &data,
        &errors,
        "/workers/create/",
    )
    .into_response())
}

pub async fn update_page(
    State(state): State<AppState>,
    CurrentWorker(viewer): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let worker = load(&state, &id)?;
    let worker_form = WorkerForm::new(&state.db().all_positions()?);
    Ok(form_page(
        &viewer,
        &format!("Update {}", worker.username),
        &worker_form.fields(),
        &FormData::from(&worker),
        &FormErrors::default(),
        &format!("{}update/", worker.url()),
    ))
}

pub async fn update_submit(
    State(state): State<AppState>,
    CurrentWorker(viewer): CurrentWorker,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let worker = load(&state, &id)?;
    let worker_form = WorkerForm::new(&state.db().all_positions()?);
    let data = FormData::from_pairs(pairs);
    let cleaned = worker_form.clean(&data, |username| {
        state.db().username_exists(username, Some(worker.id))
    })?;
    let errors = match cleaned {
        Ok(input) => match state.db().update_worker(worker.id, &input) {
            Ok(true) => {
                info!(worker_id = worker.id, "Worker updated");
                return Ok(Redirect::to(LIST_URL).into_response());
            }
            Ok(false) => return Err(WebError::not_found("Worker")),
            Err(err) => taken_errors(err)?,
        },
        Err(errors) => errors,
    };
    Ok(form_page(
        &viewer,
        &format!("Update {}", worker.username),
        &worker_form.fields(),
        &data,
        &errors,
        &format!("{}update/", worker.url()),
    )
    .into_response())
}

pub async fn delete_page(
    State(state): State<AppState>,
    CurrentWorker(viewer): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let worker = load(&state, &id)?;
    let content = confirm_delete(
        &worker.username,
        &format!("{}delete/", worker.url()),
        &worker.url(),
    );
    Ok(render("Delete worker", &viewer, &content))
}

pub async fn delete_submit(
    State(state): State<AppState>,
    CurrentWorker(_viewer): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Redirect> {
    let id = parse_id(&id, "Worker")?;
    if !state.db().delete_worker(id)? {
        return Err(WebError::not_found("Worker"));
    }
    info!(worker_id = id, "Worker deleted");
    Ok(Redirect::to(LIST_URL))
}
