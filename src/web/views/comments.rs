//! Editing and removing comments. Only the author may touch a comment;
//! anyone else gets a 404 as if it did not exist.

use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::info;

use super::{parse_id, render};
use crate::error::{WebError, WebResult};
use crate::forms::{CommentForm, FormData, FormErrors};
use crate::types::{Comment, Worker};
use crate::web::auth::CurrentWorker;
use crate::web::render::{confirm_delete, form};
use crate::web::server::AppState;

fn task_url(comment: &Comment) -> String {
    format!("/tasks/{}/", comment.task_id)
}

fn load_own(state: &AppState, raw_id: &str, author: &Worker) -> WebResult<Comment> {
    let id = parse_id(raw_id, "Comment")?;
    state
        .db()
        .get_comment_by_author(id, author.id)?
        .ok_or_else(|| WebError::not_found("Comment"))
}

fn form_page(worker: &Worker, comment: &Comment, values: &FormData, errors: &FormErrors) -> Html<String> {
    let content = format!(
        r#"<div class="card">{}</div><a href="{}">Back to task</a>"#,
        form(
            &CommentForm::fields(),
            values,
            errors,
            &format!("/comments/{}/update/", comment.id),
            "Save"
        ),
        task_url(comment),
    );
    render("Edit comment", worker, &content)
}

pub async fn update_page(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let comment = load_own(&state, &id, &worker)?;
    let values = FormData::from_pairs(vec![("content".into(), comment.content.clone())]);
    Ok(form_page(&worker, &comment, &values, &FormErrors::default()))
}

pub async fn update_submit(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let comment = load_own(&state, &id, &worker)?;
    let data = FormData::from_pairs(pairs);
    match CommentForm::clean(&data) {
        Ok(content) => {
            if !state.db().update_comment(comment.id, worker.id, &content)? {
                return Err(WebError::not_found("Comment"));
            }
            info!(comment_id = comment.id, "Comment updated");
            Ok(Redirect::to(&task_url(&comment)).into_response())
        }
        Err(errors) => Ok(form_page(&worker, &comment, &data, &errors).into_response()),
    }
}

pub async fn delete_page(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let comment = load_own(&state, &id, &worker)?;
    let content = confirm_delete(
        &comment.to_string(),
        &format!("/comments/{}/delete/", comment.id),
        &task_url(&comment),
    );
    Ok(render("Delete comment", &worker, &content))
}

pub async fn delete_submit(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Redirect> {
    let comment = load_own(&state, &id, &worker)?;
    if !state.db().delete_comment(comment.id, worker.id)? {
        return Err(WebError::not_found("Comment"));
    }
    info!(comment_id = comment.id, task_id = comment.task_id, "Comment deleted");
    Ok(Redirect::to(&task_url(&comment)))
}
