//! Page layout.
//!
//! The base layout is embedded at compile time using `include_str!` and
//! filled with plain placeholder substitution.

use super::render::html_escape;
use crate::types::Worker;

/// The base HTML template with navigation and layout.
pub const BASE_TEMPLATE: &str = include_str!("templates/base.html");

const NAV_LINKS: [(&str, &str); 4] = [
    ("/tasks/", "Tasks"),
    ("/workers/", "Workers"),
    ("/task-types/", "Task types"),
    ("/positions/", "Positions"),
];

fn nav(worker: Option<&Worker>) -> String {
    let Some(worker) = worker else {
        return String::new();
    };
    let links: String = NAV_LINKS
        .iter()
        .map(|(href, label)| format!(r#"<a href="{href}">{label}</a>"#))
        .collect();
    format!(
        r#"{links}
        <span class="spacer"></span>
        <a href="{url}">{username}</a>
        <form method="post" action="/accounts/logout/"><button type="submit" class="link">Log out</button></form>"#,
        url = worker.url(),
        username = html_escape(&worker.username),
    )
}

/// Substitute `{{key}}` placeholders in one pass, so placeholder text inside
/// a substituted value is left alone. Unknown placeholders are kept.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Wrap `content` in the base layout. `title` is escaped; `content` is
/// inserted as-is.
pub fn page(title: &str, worker: Option<&Worker>, content: &str) -> String {
    let title = html_escape(title);
    let nav = nav(worker);
    fill(
        BASE_TEMPLATE,
        &[("title", title.as_str()), ("nav", nav.as_str()), ("content", content)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_keeps_unknown_placeholders() {
        assert_eq!(fill("a {{x}} {{y}} {{", &[("x", "{{y}}")]), "a {{y}} {{y}} {{");
    }

    #[test]
    fn anonymous_page_has_no_navigation() {
        let html = page("Login", None, "<form></form>");
        assert!(html.contains("<title>Login | Task Manager</title>"));
        assert!(!html.contains("/accounts/logout/"));
        assert!(html.contains("<form></form>"));
    }

    #[test]
    fn title_is_escaped_and_content_is_not_reexpanded() {
        let worker = Worker {
            id: 2,
            username: "bob".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            position_id: None,
            position_name: None,
            date_joined: 0,
        };
        let html = page("<Tasks>", Some(&worker), "{{title}}");
        assert!(html.contains("<h1>&lt;Tasks&gt;</h1>"));
        assert!(html.contains("{{title}}"));
        assert!(!html.contains("<title>{{title}}"));
        assert!(html.contains(r#"<a href="/workers/2/">bob</a>"#));
    }
}
