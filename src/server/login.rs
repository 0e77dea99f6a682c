use axum::{
    Form,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::libs::SESSION_COOKIE;
use crate::server::{AppState, pages};

#[derive(Deserialize)]
pub struct LoginForm {
    pub password: String,
}

fn session_cookie(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Lets a request through only when its session is authenticated.
pub async fn require_login(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let cookie = session_cookie(&jar);
    if state.sessions.is_authenticated(cookie.as_deref()).await {
        next.run(request).await
    } else {
        Redirect::to("/login").into_response()
    }
}

pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    let cookie = session_cookie(&jar);
    if state.sessions.is_authenticated(cookie.as_deref()).await {
        return Redirect::to("/").into_response();
    }
    Html(pages::login(None)).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.gate.verify(&form.password) {
        warn!("console login rejected");
        return (
            StatusCode::UNAUTHORIZED,
            Html(pages::login(Some("Incorrect password"))),
        )
            .into_response();
    }

    let id = state.sessions.open_authenticated().await;
    info!("console login accepted");
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), Redirect::to("/")).into_response()
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(id) = session_cookie(&jar).and_then(|c| Uuid::parse_str(&c).ok()) {
        state.sessions.close(id).await;
        info!("console session closed");
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login")).into_response()
}
