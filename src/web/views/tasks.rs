//! Task pages: the filtered list, detail with comments, and CRUD forms.

use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::info;

use super::{parse_id, render};
use crate::error::{WebError, WebResult};
use crate::filters::{ActiveFilter, DeadlineBucket, TaskFilter};
use crate::forms::{CommentForm, FormData, FormErrors, TaskForm};
use crate::query::QueryParams;
use crate::types::{Comment, Priority, Status, Task, TaskType, Worker};
use crate::web::auth::CurrentWorker;
use crate::web::render::{
    assignee_list, confirm_delete, form, format_deadline, format_timestamp, html_escape,
    pagination, task_table,
};
use crate::web::server::AppState;

const LIST_URL: &str = "/tasks/";

fn load(state: &AppState, raw_id: &str) -> WebResult<Task> {
    let id = parse_id(raw_id, "Task")?;
    state
        .db()
        .get_task(id)?
        .ok_or_else(|| WebError::not_found("Task"))
}

fn task_form(state: &AppState) -> WebResult<TaskForm> {
    let task_types = state.db().all_task_types()?;
    let workers = state.db().all_workers()?;
    Ok(TaskForm::new(&task_types, &workers))
}

// =============================================================================
// List
// =============================================================================

fn select_filter(name: &str, label: &str, options: &[(String, String)], current: &str) -> String {
    let options: String = std::iter::once(("".to_string(), "---------".to_string()))
        .chain(options.iter().cloned())
        .map(|(value, text)| {
            let selected = if value == current { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                html_escape(&value),
                selected,
                html_escape(&text)
            )
        })
        .collect();
    format!(
        r#"<div class="form-row"><label for="id_{name}">{label}</label><select name="{name}" id="id_{name}">{options}</select></div>"#
    )
}

fn date_filter(name: &str, label: &str, current: &str) -> String {
    format!(
        r#"<div class="form-row"><label for="id_{name}">{label}</label><input type="date" name="{name}" id="id_{name}" value="{value}"></div>"#,
        value = html_escape(current)
    )
}

/// The GET form above the task list. `query` holds the effective parameters.
fn filter_form(query: &QueryParams, task_types: &[TaskType], workers: &[Worker]) -> String {
    let current = |key: &str| query.get(key).unwrap_or("").to_string();

    let task_type_options: Vec<(String, String)> = task_types
        .iter()
        .map(|t| (t.id.to_string(), t.name.clone()))
        .collect();
    let worker_options: Vec<(String, String)> = workers
        .iter()
        .map(|w| (w.id.to_string(), w.username.clone()))
        .collect();
    let priority_options: Vec<(String, String)> = Priority::ALL
        .iter()
        .map(|p| (p.as_str().to_string(), p.label().to_string()))
        .collect();
    let status_options: Vec<(String, String)> = Status::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), s.label().to_string()))
        .collect();
    let active_options: Vec<(String, String)> = [ActiveFilter::Active, ActiveFilter::Inactive]
        .iter()
        .map(|a| (a.as_str().to_string(), a.label().to_string()))
        .collect();
    let deadline_options: Vec<(String, String)> = DeadlineBucket::ALL
        .iter()
        .map(|d| (d.as_str().to_string(), d.label().to_string()))
        .collect();

    format!(
        r#"<form method="get" class="filters">
            <div class="form-row"><label for="id_q">Search</label><input type="text" name="q" id="id_q" value="{q}" placeholder="Name, description, type or assignee"></div>
            {task_type}{assignee}{priority}{status}{active}{deadline}{after}{before}
            <button type="submit">Filter</button>
            <a href="{LIST_URL}">Reset</a>
        </form>"#,
        q = html_escape(&current("q")),
        task_type = select_filter("task_type", "Task type", &task_type_options, &current("task_type")),
        assignee = select_filter("assignee", "Assignee", &worker_options, &current("assignee")),
        priority = select_filter("priority", "Priority", &priority_options, &current("priority")),
        status = select_filter("status", "Status", &status_options, &current("status")),
        active = select_filter("active_filter", "Activity", &active_options, &current("active_filter")),
        deadline = select_filter("deadline_filter", "Deadline", &deadline_options, &current("deadline_filter")),
        after = date_filter("deadline_after", "Deadline from", &current("deadline_after")),
        before = date_filter("deadline_before", "Deadline to", &current("deadline_before")),
    )
}

pub async fn list(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    query: QueryParams,
) -> WebResult<Html<String>> {
    let task_types = state.db().all_task_types()?;
    let workers = state.db().all_workers()?;
    let mut filter = TaskFilter::from_query(&query);
    filter.check_choices(
        &task_types.iter().map(|t| t.id).collect::<Vec<_>>(),
        &workers.iter().map(|w| w.id).collect::<Vec<_>>(),
    );
    let request = state.page_request(&query)?;
    let page = state
        .db()
        .list_tasks(&filter, state.today(), request)?
        .ok_or_else(WebError::invalid_page)?;

    // A bare request is filtered to active tasks; keep that visible in the
    // form and in pagination links.
    let effective = if query.is_empty() {
        query.with("active_filter", Some(ActiveFilter::Active.as_str()))
    } else {
        query.clone()
    };

    let errors = if filter.is_valid() {
        String::new()
    } else {
        let items: String = filter
            .errors
            .iter()
            .map(|e| format!("<li>{}</li>", html_escape(&e.to_string())))
            .collect();
        format!(r#"<ul class="filter-errors">{items}</ul>"#)
    };

    let content = format!(
        r#"{filters}
        {errors}
        <div class="actions"><a href="{LIST_URL}create/">Create task</a></div>
        {table}
        {pagination}"#,
        filters = filter_form(&effective, &task_types, &workers),
        table = task_table(&page.items),
        pagination = pagination(&page, &effective, "tasks"),
    );
    Ok(render("Tasks", &worker, &content))
}

// =============================================================================
// Detail and comments
// =============================================================================

fn comment_html(comment: &Comment, viewer: &Worker) -> String {
    let actions = if comment.author_id == viewer.id {
        format!(
            r#"<a href="/comments/{id}/update/">Edit</a> <a href="/comments/{id}/delete/">Delete</a>"#,
            id = comment.id
        )
    } else {
        String::new()
    };
    format!(
        r#"<div class="comment">
            <div class="muted">{author} &middot; {created}</div>
            <p>{content}</p>
            {actions}
        </div>"#,
        author = html_escape(&comment.author_username),
        created = format_timestamp(comment.created_at),
        content = html_escape(&comment.content),
    )
}

fn detail_page(
    state: &AppState,
    worker: &Worker,
    task: &Task,
    comment_values: &FormData,
    comment_errors: &FormErrors,
) -> WebResult<Html<String>> {
    let comments = state.db().comments_for_task(task.id)?;
    let comment_list: String = if comments.is_empty() {
        r#"<div class="empty-state">No comments yet</div>"#.to_string()
    } else {
        comments.iter().map(|c| comment_html(c, worker)).collect()
    };

    let content = format!(
        r#"<div class="card">
            <p><strong>Type:</strong> {task_type}</p>
            <p><strong>Priority:</strong> <span class="badge priority-{priority}">{priority_label}</span></p>
            <p><strong>Status:</strong> <span class="badge status-{status}">{status_label}</span></p>
            <p><strong>Deadline:</strong> {deadline}</p>
            <p><strong>Assignees:</strong> {assignees}</p>
            <p>{description}</p>
            <p class="muted">Created {created}, updated {updated}</p>
        </div>
        <div class="actions">
            <a href="{url}update/">Update</a>
            <a href="{url}delete/">Delete</a>
            <a href="{LIST_URL}">Back to tasks</a>
        </div>
        <h2>Comments</h2>
        {comment_list}
        <div class="card">{comment_form}</div>"#,
        task_type = html_escape(task.task_type_name.as_deref().unwrap_or("-")),
        priority = task.priority.as_str(),
        priority_label = task.priority.label(),
        status = task.status.as_str(),
        status_label = task.status.label(),
        deadline = format_deadline(task),
        assignees = assignee_list(task),
        description = html_escape(&task.description),
        created = format_timestamp(task.created_at),
        updated = format_timestamp(task.updated_at),
        url = task.url(),
        comment_form = form(
            &CommentForm::fields(),
            comment_values,
            comment_errors,
            &task.url(),
            "Add comment"
        ),
    );
    Ok(render(&task.name, worker, &content))
}

pub async fn detail(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let task = load(&state, &id)?;
    detail_page(&state, &worker, &task, &FormData::default(), &FormErrors::default())
}

/// Add a comment authored by the current worker.
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let task = load(&state, &id)?;
    let data = FormData::from_pairs(pairs);
    match CommentForm::clean(&data) {
        Ok(content) => {
            let comment = state.db().add_comment(task.id, worker.id, &content)?;
            info!(task_id = task.id, comment_id = comment.id, author = worker.id, "Comment added");
            Ok(Redirect::to(&task.url()).into_response())
        }
        Err(errors) => Ok(detail_page(&state, &worker, &task, &data, &errors)?.into_response()),
    }
}

// =============================================================================
// Create, update, delete
// =============================================================================

fn form_page(
    worker: &Worker,
    title: &str,
    task_form: &TaskForm,
    values: &FormData,
    errors: &FormErrors,
    action: &str,
) -> Html<String> {
    let content = format!(
        r#"<div class="card">{}</div><a href="{LIST_URL}">Back to tasks</a>"#,
        form(&task_form.fields(), values, errors, action, "Save")
    );
    render(title, worker, &content)
}

pub async fn create_page(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
) -> WebResult<Html<String>> {
    let task_form = task_form(&state)?;
    Ok(form_page(
        &worker,
        "Create task",
        &task_form,
        &TaskForm::blank(),
        &FormErrors::default(),
        "/tasks/create/",
    ))
}

pub async fn create_submit(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let task_form = task_form(&state)?;
    let data = FormData::from_pairs(pairs);
    match task_form.clean(&data) {
        Ok(input) => {
            let task = state.db().create_task(&input)?;
            info!(task_id = task.id, name = %task.name, "Task created");
            Ok(Redirect::to(LIST_URL).into_response())
        }
        Err(errors) => Ok(form_page(
            &worker,
            "Create task",
            &task_form,
            &data,
            &errors,
            "/tasks/create/",
        )
        .into_response()),
    }
}

pub async fn update_page(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let task = load(&state, &id)?;
    let task_form = task_form(&state)?;
    Ok(form_page(
        &worker,
        &format!("Update {}", task.name),
        &task_form,
        &FormData::from(&task),
        &FormErrors::default(),
        &format!("{}update/", task.url()),
    ))
}

pub async fn update_submit(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let task = load(&state, &id)?;
    let task_form = task_form(&state)?;
    let data = FormData::from_pairs(pairs);
    match task_form.clean(&data) {
        Ok(input) => {
            if !state.db().update_task(task.id, &input)? {
                return Err(WebError::not_found("Task"));
            }
            info!(task_id = task.id, "Task updated");
            Ok(Redirect::to(LIST_URL).into_response())
        }
        Err(errors) => Ok(form_page(
            &worker,
            &format!("Update {}", task.name),
            &task_form,
            &data,
            &errors,
            &format!("{}update/", task.url()),
        )
        .into_response()),
    }
}

pub async fn delete_page(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let task = load(&state, &id)?;
    let content = confirm_delete(&task.name, &format!("{}delete/", task.url()), &task.url());
    Ok(render("Delete task", &worker, &content))
}

pub async fn delete_submit(
    State(state): State<AppState>,
    CurrentWorker(_worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Redirect> {
    let id = parse_id(&id, "Task")?;
    if !state.db().delete_task(id)? {
        return Err(WebError::not_found("Task"));
    }
    info!(task_id = id, "Task deleted");
    Ok(Redirect::to(LIST_URL))
}
