//! Admin dashboard: login form, session cookie, and active token list.

use axum::Form;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::dto::request::AdminLoginForm;
use crate::error::ApiError;
use crate::state::AppState;

const LOGIN_PATH: &str = "/admin/login";
const DASHBOARD_PATH: &str = "/admin";

const LOGIN_FORM: &str = "<!doctype html>\
<html><head><title>Asgard Admin</title></head><body>\
<h2>Admin Login</h2>\
<form method=\"post\" action=\"/admin/login\">\
<input name=\"username\" placeholder=\"Username\">\
<input type=\"password\" name=\"password\" placeholder=\"Password\">\
<button type=\"submit\">Login</button>\
</form></body></html>";

/// 302 Found to `location`.
fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// GET /admin/login
pub async fn login_form() -> Html<&'static str> {
    Html(LOGIN_FORM)
}

/// POST /admin/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AdminLoginForm>,
) -> Result<(CookieJar, Response), ApiError> {
    let admin = state.admins.verify(&form.username, &form.password).await?;
    let session_id = state.admin_sessions.create(&admin);

    let cookie = Cookie::build((state.config.auth.admin_session_cookie.clone(), session_id))
        .path("/")
        .http_only(true);

    Ok((jar.add(cookie), found(DASHBOARD_PATH)))
}

/// GET /admin/logout
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Response) {
    let name = state.config.auth.admin_session_cookie.clone();
    if let Some(cookie) = jar.get(&name) {
        state.admin_sessions.end(cookie.value());
    }
    (jar.remove(Cookie::build(name).path("/")), found(LOGIN_PATH))
}

/// GET /admin
pub async fn dashboard(State(state): State<AppState>, jar: CookieJar) -> Response {
    let admin = jar
        .get(&state.config.auth.admin_session_cookie)
        .and_then(|cookie| state.admin_sessions.resolve(cookie.value()));
    let Some(admin) = admin else {
        return found(LOGIN_PATH);
    };

    let pairs = state.gateway.active_tokens();
    let token_list = if pairs.is_empty() {
        "No active tokens".to_string()
    } else {
        pairs
            .iter()
            .map(|(user, token)| format!("{}: {}", escape_html(user.as_str()), escape_html(token)))
            .collect::<Vec<_>>()
            .join("<br>")
    };

    Html(format!(
        "<!doctype html><html><head><title>Asgard Admin</title></head><body>\
         <h2>API Tokens</h2><p>Signed in as {}. <a href=\"/admin/logout\">Log out</a></p>\
         <p>{token_list}</p></body></html>",
        escape_html(admin.as_str())
    ))
    .into_response()
}
