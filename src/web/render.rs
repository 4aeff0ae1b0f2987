//! HTML fragment builders shared by the views.

use crate::db::Page;
use crate::forms::{FieldSpec, FormData, FormErrors, WidgetKind};
use crate::query::QueryParams;
use crate::types::{DEADLINE_FORMAT, Task};
use chrono::{Local, TimeZone};

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Format a millisecond timestamp in local time.
pub fn format_timestamp(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}

pub fn format_deadline(task: &Task) -> String {
    task.deadline
        .map(|d| d.format(DEADLINE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Comma-separated assignee usernames.
pub fn assignee_list(task: &Task) -> String {
    if task.assignees.is_empty() {
        return "-".to_string();
    }
    task.assignees
        .iter()
        .map(|a| html_escape(&a.username))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Previous/next links for a list page. Every other query parameter is kept.
pub fn pagination<T>(page: &Page<T>, query: &QueryParams, noun: &str) -> String {
    if page.total_pages <= 1 {
        return String::new();
    }

    let link = |target: &str, label: &str| {
        format!(
            r#"<a class="page-link" href="?{}">{}</a>"#,
            html_escape(&query.transform(&[("page", Some(target))])),
            label
        )
    };

    let mut controls = String::new();
    if page.has_previous() {
        controls.push_str(&link("1", "&laquo; first"));
        controls.push_str(&link(&(page.page - 1).to_string(), "previous"));
    }
    controls.push_str(&format!(
        r#"<span class="page-number">Page {} of {}</span>"#,
        page.page, page.total_pages
    ));
    if page.has_next() {
        controls.push_str(&link(&(page.page + 1).to_string(), "next"));
        controls.push_str(&link("last", "last &raquo;"));
    }

    format!(
        r#"<div class="pagination">
            <div class="pagination-info">Showing {start} - {end} of {total} {noun}</div>
            <div class="pagination-controls">{controls}</div>
        </div>"#,
        start = page.start_index(),
        end = page.end_index(),
        total = page.total,
        noun = noun,
        controls = controls,
    )
}

/// A GET search box bound to the `q` parameter.
pub fn search_box(field: &FieldSpec, query: &QueryParams) -> String {
    format!(
        r#"<form method="get" class="search-form">
            <input type="text" name="{name}" value="{value}" placeholder="{placeholder}" maxlength="{max}">
            <button type="submit">Search</button>
        </form>"#,
        name = field.name,
        value = html_escape(query.get("q").unwrap_or("")),
        placeholder = html_escape(field.label),
        max = field.max_length.unwrap_or(255),
    )
}

fn render_errors(messages: &[String]) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", html_escape(m)))
        .collect();
    format!(r#"<ul class="errorlist">{items}</ul>"#)
}

fn render_widget(field: &FieldSpec, values: &FormData) -> String {
    let name = field.name;
    let value = html_escape(values.get(name).unwrap_or(""));
    let required = if field.required { " required" } else { "" };
    let maxlength = field
        .max_length
        .map(|m| format!(r#" maxlength="{m}""#))
        .unwrap_or_default();

    match field.widget {
        WidgetKind::Text | WidgetKind::Email => {
            let input_type = if field.widget == WidgetKind::Email { "email" } else { "text" };
            format!(
                r#"<input type="{input_type}" name="{name}" id="id_{name}" value="{value}"{maxlength}{required}>"#
            )
        }
        // Passwords are never echoed back.
        WidgetKind::Password => {
            format!(r#"<input type="password" name="{name}" id="id_{name}"{required}>"#)
        }
        WidgetKind::DateTimeLocal => {
            format!(r#"<input type="datetime-local" name="{name}" id="id_{name}" value="{value}">"#)
        }
        WidgetKind::TextArea => {
            format!(r#"<textarea name="{name}" id="id_{name}" rows="6"{required}>{value}</textarea>"#)
        }
        WidgetKind::Select | WidgetKind::SelectMultiple => {
            let selected_values = values.get_all(name);
            let options: String = field
                .choices
                .iter()
                .map(|choice| {
                    let selected = if selected_values.contains(&choice.value.as_str()) {
                        " selected"
                    } else {
                        ""
                    };
                    format!(
                        r#"<option value="{}"{}>{}</option>"#,
                        html_escape(&choice.value),
                        selected,
                        html_escape(&choice.label)
                    )
                })
                .collect();
            let multiple = if field.widget == WidgetKind::SelectMultiple { " multiple" } else { "" };
            format!(r#"<select name="{name}" id="id_{name}"{multiple}{required}>{options}</select>"#)
        }
    }
}

/// A POST form with one labelled row per field.
pub fn form(
    fields: &[FieldSpec],
    values: &FormData,
    errors: &FormErrors,
    action: &str,
    submit_label: &str,
) -> String {
    let rows: String = fields
        .iter()
        .map(|field| {
            format!(
                r#"<div class="form-row">
                    <label for="id_{name}">{label}{marker}</label>
                    {widget}
                    {errors}
                </div>"#,
                name = field.name,
                label = html_escape(field.label),
                marker = if field.required { " *" } else { "" },
                widget = render_widget(field, values),
                errors = render_errors(errors.get(field.name)),
            )
        })
        .collect();

    format!(
        r#"<form method="post" action="{action}" class="entity-form">
            {rows}
            <button type="submit">{submit}</button>
        </form>"#,
        action = html_escape(action),
        rows = rows,
        submit = html_escape(submit_label),
    )
}

/// Confirmation form for a delete page.
pub fn confirm_delete(object: &str, action: &str, cancel_url: &str) -> String {
    format!(
        r#"<p>Are you sure you want to delete "{object}"?</p>
        <form method="post" action="{action}">
            <button type="submit" class="danger">Yes, delete</button>
            <a href="{cancel}">Cancel</a>
        </form>"#,
        object = html_escape(object),
        action = html_escape(action),
        cancel = html_escape(cancel_url),
    )
}

/// Table rows for a task list.
pub fn task_rows(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return r#"<tr><td colspan="6" class="empty-state">No tasks found</td></tr>"#.to_string();
    }
    tasks
        .iter()
        .map(|task| {
            format!(
                r#"<tr>
                    <td><a href="{url}">{name}</a></td>
                    <td>{task_type}</td>
                    <td><span class="badge priority-{priority}">{priority_label}</span></td>
                    <td><span class="badge status-{status}">{status_label}</span></td>
                    <td>{deadline}</td>
                    <td>{assignees}</td>
                </tr>"#,
                url = task.url(),
                name = html_escape(&task.name),
                task_type = html_escape(task.task_type_name.as_deref().unwrap_or("-")),
                priority = task.priority.as_str(),
                priority_label = task.priority.label(),
                status = task.status.as_str(),
                status_label = task.status.label(),
                deadline = format_deadline(task),
                assignees = assignee_list(task),
            )
        })
        .collect()
}

/// A task table with header.
pub fn task_table(tasks: &[Task]) -> String {
    format!(
        r#"<table class="list">
            <thead><tr><th>Name</th><th>Type</th><th>Priority</th><th>Status</th><th>Deadline</th><th>Assignees</th></tr></thead>
            <tbody>{}</tbody>
        </table>"#,
        task_rows(tasks)
    )
}
