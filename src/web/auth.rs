//! Session login and the current-worker extractor.

use axum::{
    extract::{Form, FromRequestParts, State},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_cookies::{Cookie, Cookies};
use tracing::{info, warn};

use super::render::html_escape;
use super::server::AppState;
use super::templates;
use crate::error::{WebError, WebResult};
use crate::forms::FormData;
use crate::password::verify_password;
use crate::query::QueryParams;
use crate::types::Worker;

pub const LOGIN_PATH: &str = "/accounts/login/";

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// The logged-in worker. Rejects anonymous requests with a redirect to the
/// login page that remembers where the visitor was going.
#[derive(Debug, Clone)]
pub struct CurrentWorker(pub Worker);

impl FromRequestParts<AppState> for CurrentWorker {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let requested = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| WebError::internal(msg))?;

        let Some(token) = cookies
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_string())
        else {
            return Err(WebError::login_required(requested));
        };

        match state.db().worker_for_session(&token)? {
            Some(worker) => Ok(CurrentWorker(worker)),
            None => Err(WebError::login_required(requested)),
        }
    }
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((state.config.session.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(tower_cookies::cookie::SameSite::Lax)
        .max_age(time::Duration::hours(state.config.session.ttl_hours))
        .build()
}

fn login_form(username: &str, next: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<ul class="errorlist"><li>{}</li></ul>"#, html_escape(e)))
        .unwrap_or_default();
    let content = format!(
        r#"<div class="card">
            {error}
            <form method="post" action="{LOGIN_PATH}">
                <div class="form-row">
                    <label for="id_username">Username</label>
                    <input type="text" name="username" id="id_username" value="{username}" maxlength="150" required autofocus>
                </div>
                <div class="form-row">
                    <label for="id_password">Password</label>
                    <input type="password" name="password" id="id_password" required>
                </div>
                <input type="hidden" name="next" value="{next}">
                <button type="submit">Log in</button>
            </form>
        </div>"#,
        username = html_escape(username),
        next = html_escape(next),
    );
    templates::page("Log in", None, &content)
}

pub async fn login_page(query: QueryParams) -> Html<String> {
    Html(login_form("", query.get("next").unwrap_or(""), None))
}

pub async fn login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(pairs): Form<Vec<(String, String)>>,
) -> WebResult<Response> {
    let data = FormData::from_pairs(pairs);
    let username = data.get("username").unwrap_or("").trim();
    let password = data.get("password").unwrap_or("");
    let next = data.get("next").unwrap_or("");

    let worker = match state.db().get_worker_credentials(username)? {
        Some((worker, hash)) if verify_password(password, &hash)? => worker,
        _ => {
            warn!(username, "Failed login");
            return Ok(Html(login_form(username, next, Some(INVALID_LOGIN))).into_response());
        }
    };

    let token = state
        .db()
        .create_session(worker.id, state.config.session.ttl_hours)?;
    cookies.add(session_cookie(&state, token));
    info!(worker_id = worker.id, username = %worker.username, "Logged in");

    Ok(Redirect::to(safe_next(Some(next))).into_response())
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> WebResult<Redirect> {
    let name = state.config.session.cookie_name.clone();
    if let Some(cookie) = cookies.get(&name) {
        state.db().delete_session(cookie.value())?;
    }
    cookies.remove(Cookie::build((name, "")).path("/").build());
    Ok(Redirect::to(LOGIN_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_a_local_path() {
        assert_eq!(safe_next(Some("/tasks/?page=2")), "/tasks/?page=2");
        assert_eq!(safe_next(Some("")), "/");
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
    }

    #[test]
    fn login_form_escapes_input() {
        let html = login_form("<bob>", "/tasks/", Some(INVALID_LOGIN));
        assert!(html.contains(r#"value="&lt;bob&gt;""#));
        assert!(html.contains(r#"name="next" value="/tasks/""#));
        assert!(html.contains("Please enter a correct username and password."));
    }
}
