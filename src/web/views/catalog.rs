//! Name/description catalogs: task types and positions.
//!
//! Both share the same five pages, so the handlers are generic over
//! [`Catalog`] and the router instantiates them per record type.

use anyhow::Result;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::info;

use super::{parse_id, render};
use crate::db::{Database, Page, PageRequest};
use crate::error::{WebError, WebResult};
use crate::forms::{FormData, FormErrors, NamedForm, NamedInput, SearchForm};
use crate::query::QueryParams;
use crate::types::{Position, TaskType, Worker};
use crate::web::auth::CurrentWorker;
use crate::web::render::{confirm_delete, form, html_escape, pagination, search_box, task_table};
use crate::web::server::AppState;

/// A record type listed and edited through the catalog pages.
pub trait Catalog: Sized + Send + Sync + 'static {
    /// Human name of one record, e.g. "Task type".
    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    /// URL prefix, with leading and trailing slash.
    const BASE: &'static str;

    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn list(db: &Database, search: Option<&str>, request: PageRequest) -> Result<Option<Page<Self>>>;
    fn get(db: &Database, id: i64) -> Result<Option<Self>>;
    fn create(db: &Database, input: &NamedInput) -> Result<Self>;
    fn update(db: &Database, id: i64, input: &NamedInput) -> Result<bool>;
    fn delete(db: &Database, id: i64) -> Result<bool>;

    /// Detail-page section listing the records that reference this one.
    fn related_html(&self, db: &Database) -> Result<String>;

    fn url(&self) -> String {
        format!("{}{}/", Self::BASE, self.id())
    }
}

impl Catalog for TaskType {
    const SINGULAR: &'static str = "Task type";
    const PLURAL: &'static str = "Task types";
    const BASE: &'static str = "/task-types/";

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn list(db: &Database, search: Option<&str>, request: PageRequest) -> Result<Option<Page<Self>>> {
        db.list_task_types(search, request)
    }

    fn get(db: &Database, id: i64) -> Result<Option<Self>> {
        db.get_task_type(id)
    }

    fn create(db: &Database, input: &NamedInput) -> Result<Self> {
        db.create_task_type(&input.name, &input.description)
    }

    fn update(db: &Database, id: i64, input: &NamedInput) -> Result<bool> {
        db.update_task_type(id, &input.name, &input.description)
    }

    fn delete(db: &Database, id: i64) -> Result<bool> {
        db.delete_task_type(id)
    }

    fn related_html(&self, db: &Database) -> Result<String> {
        let tasks = db.tasks_of_type(self.id)?;
        Ok(format!("<h2>Tasks</h2>{}", task_table(&tasks)))
    }
}

impl Catalog for Position {
    const SINGULAR: &'static str = "Position";
    const PLURAL: &'static str = "Positions";
    const BASE: &'static str = "/positions/";

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn list(db: &Database, search: Option<&str>, request: PageRequest) -> Result<Option<Page<Self>>> {
        db.list_positions(search, request)
    }

    fn get(db: &Database, id: i64) -> Result<Option<Self>> {
        db.get_position(id)
    }

    fn create(db: &Database, input: &NamedInput) -> Result<Self> {
        db.create_position(&input.name, &input.description)
    }

    fn update(db: &Database, id: i64, input: &NamedInput) -> Result<bool> {
        db.update_position(id, &input.name, &input.description)
    }

    fn delete(db: &Database, id: i64) -> Result<bool> {
        db.delete_position(id)
    }

    fn related_html(&self, db: &Database) -> Result<String> {
        let workers = db.workers_with_position(self.id)?;
        if workers.is_empty() {
            return Ok(r#"<h2>Workers</h2><div class="empty-state">No workers hold this position</div>"#.to_string());
        }
        let items: String = workers
            .iter()
            .map(|w| {
                format!(
                    r#"<li><a href="{}">{}</a></li>"#,
                    w.url(),
                    html_escape(&w.display_name())
                )
            })
            .collect();
        Ok(format!("<h2>Workers</h2><ul>{items}</ul>"))
    }
}

fn load<C: Catalog>(state: &AppState, raw_id: &str) -> WebResult<C> {
    let id = parse_id(raw_id, C::SINGULAR)?;
    C::get(state.db(), id)?.ok_or_else(|| WebError::not_found(C::SINGULAR))
}

fn form_page<C: Catalog>(
    worker: &Worker,
    title: &str,
    values: &FormData,
    errors: &FormErrors,
    action: &str,
) -> Html<String> {
    let content = format!(
        r#"<div class="card">{}</div><a href="{}">Back to {}</a>"#,
        form(&NamedForm::fields(), values, errors, action, "Save"),
        C::BASE,
        C::PLURAL.to_lowercase(),
    );
    render(title, worker, &content)
}

pub async fn list<C: Catalog>(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    query: QueryParams,
) -> WebResult<Html<String>> {
    let search = SearchForm::clean(&query);
    let request = state.page_request(&query)?;
    let page = C::list(state.db(), Some(search.as_str()), request)?
        .ok_or_else(WebError::invalid_page)?;

    let rows: String = if page.items.is_empty() {
        format!(
            r#"<tr><td colspan="2" class="empty-state">No {} found</td></tr>"#,
            C::PLURAL.to_lowercase()
        )
    } else {
        page.items
            .iter()
            .map(|record| {
                format!(
                    r#"<tr><td><a href="{}">{}</a></td><td>{}</td></tr>"#,
                    record.url(),
                    html_escape(record.name()),
                    html_escape(record.description()),
                )
            })
            .collect()
    };

    let content = format!(
        r#"<div class="actions">{search}<a href="{base}create/">Create {singular}</a></div>
        <table class="list">
            <thead><tr><th>Name</th><th>Description</th></tr></thead>
            <tbody>{rows}</tbody>
        </table>
        {pagination}"#,
        search = search_box(&SearchForm::field("Search by name"), &query),
        base = C::BASE,
        singular = C::SINGULAR.to_lowercase(),
        rows = rows,
        pagination = pagination(&page, &query, &C::PLURAL.to_lowercase()),
    );
    Ok(render(C::PLURAL, &worker, &content))
}

pub async fn detail<C: Catalog>(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let record = load::<C>(&state, &id)?;
    let related = record.related_html(state.db())?;
    let description = if record.description().is_empty() {
        r#"<span class="muted">No description</span>"#.to_string()
    } else {
        html_escape(record.description())
    };
    let content = format!(
        r#"<div class="card"><p>{description}</p></div>
        <div class="actions">
            <a href="{url}update/">Update</a>
            <a href="{url}delete/">Delete</a>
            <a href="{base}">Back to {plural}</a>
        </div>
        {related}"#,
        url = record.url(),
        base = C::BASE,
        plural = C::PLURAL.to_lowercase(),
    );
    Ok(render(record.name(), &worker, &content))
}

pub async fn create_page<C: Catalog>(CurrentWorker(worker): CurrentWorker) -> Html<String> {
    form_page::<C>(
        &worker,
        &format!("Create {}", C::SINGULAR.to_lowercase()),
        &FormData::default(),
        &FormErrors::default(),
        &format!("{}create/", C::BASE),
    )
}

pub async fn create_submit<C: Catalog>(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let data = FormData::from_pairs(pairs);
    match NamedForm::clean(&data) {
        Ok(input) => {
            let record = C::create(state.db(), &input)?;
            info!(kind = C::SINGULAR, id = record.id(), "Created");
            Ok(Redirect::to(C::BASE).into_response())
        }
        Err(errors) => Ok(form_page::<C>(
            &worker,
            &format!("Create {}", C::SINGULAR.to_lowercase()),
            &data,
            &errors,
            &format!("{}create/", C::BASE),
        )
        .into_response()),
    }
}

pub async fn update_page<C: Catalog>(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let record = load::<C>(&state, &id)?;
    Ok(form_page::<C>(
        &worker,
        &format!("Update {}", record.name()),
        &NamedForm::initial(record.name(), record.description()),
        &FormErrors::default(),
        &format!("{}update/", record.url()),
    ))
}

pub async fn update_submit<C: Catalog>(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let record = load::<C>(&state, &id)?;
    let data = FormData::from_pairs(pairs);
    match NamedForm::clean(&data) {
        Ok(input) => {
            if !C::update(state.db(), record.id(), &input)? {
                return Err(WebError::not_found(C::SINGULAR));
            }
            info!(kind = C::SINGULAR, id = record.id(), "Updated");
            Ok(Redirect::to(C::BASE).into_response())
        }
        Err(errors) => Ok(form_page::<C>(
            &worker,
            &format!("Update {}", record.name()),
            &data,
            &errors,
            &format!("{}update/", record.url()),
        )
        .into_response()),
    }
}

pub async fn delete_page<C: Catalog>(
    State(state): State<AppState>,
    CurrentWorker(worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Html<String>> {
    let record = load::<C>(&state, &id)?;
    let content = confirm_delete(
        record.name(),
        &format!("{}delete/", record.url()),
        &record.url(),
    );
    Ok(render(&format!("Delete {}", C::SINGULAR.to_lowercase()), &worker, &content))
}

pub async fn delete_submit<C: Catalog>(
    State(state): State<AppState>,
    CurrentWorker(_worker): CurrentWorker,
    Path(id): Path<String>,
) -> WebResult<Redirect> {
    let id = parse_id(&id, C::SINGULAR)?;
    if !C::delete(state.db(), id)? {
        return Err(WebError::not_found(C::SINGULAR));
    }
    info!(kind = C::SINGULAR, id, "Deleted");
    Ok(Redirect::to(C::BASE))
}
