//! Login, registration and logout handlers.

use crate::error::WebError;
use crate::identity::{
    expired_session_cookie, safe_next, session_cookie, session_token, DEFAULT_LOGIN_REDIRECT,
};
use crate::render;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use learning_log_core::{FormOutcome, FormRequest, LoginForm, RegisterForm};
use serde::Deserialize;

/// Post-login destination carried in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

pub async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> Result<Response, WebError> {
    login(&state, query, FormRequest::Display).await
}

pub async fn login_submit(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    login(&state, query, FormRequest::Submit(form)).await
}

async fn login(
    state: &AppState,
    query: NextQuery,
    request: FormRequest<LoginForm>,
) -> Result<Response, WebError> {
    let next = safe_next(query.next.as_deref());
    let outcome = state
        .with_conn(move |state, conn| Ok(state.accounts(conn).login(request)?))
        .await?;
    Ok(match outcome {
        FormOutcome::Saved(session) => (
            [(SET_COOKIE, session_cookie(&session.token))],
            Redirect::to(next),
        )
            .into_response(),
        FormOutcome::Render(form) => Html(render::login(&form, next)).into_response(),
    })
}

pub async fn register_form(State(state): State<AppState>) -> Result<Response, WebError> {
    register(&state, FormRequest::Display).await
}

pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, WebError> {
    register(&state, FormRequest::Submit(form)).await
}

async fn register(
    state: &AppState,
    request: FormRequest<RegisterForm>,
) -> Result<Response, WebError> {
    let outcome = state
        .with_conn(move |state, conn| Ok(state.accounts(conn).register(request)?))
        .await?;
    Ok(match outcome {
        FormOutcome::Saved(session) => (
            [(SET_COOKIE, session_cookie(&session.token))],
            Redirect::to(DEFAULT_LOGIN_REDIRECT),
        )
            .into_response(),
        FormOutcome::Render(form) => Html(render::register(&form)).into_response(),
    })
}

/// Ends the caller's session, if any, and returns to the home page.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    if let Some(token) = session_token(&headers) {
        state
            .with_conn(move |state, conn| Ok(state.accounts(conn).logout(&token)?))
            .await?;
    }
    Ok((
        [(SET_COOKIE, expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}
