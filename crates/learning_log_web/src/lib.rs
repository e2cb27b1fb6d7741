//! HTTP surface for Learning Log.
//!
//! # Responsibility
//! - Map every journal and account route onto core services.
//! - Resolve the caller's identity from the session cookie.
//! - Render views as HTML and translate failures into HTTP responses.
//!
//! # Invariants
//! - Gated routes never run their service call without a principal.
//! - Not-found responses are identical for missing and foreign records.

pub mod error;
pub mod identity;
pub mod render;
pub mod routes;
pub mod state;

pub use error::WebError;
pub use state::AppState;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::info;
use routes::{accounts, journal};
use std::time::Instant;

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(journal::index))
        .route("/topics/", get(journal::topics))
        .route("/topics/:topic_id/", get(journal::topic))
        .route(
            "/new_topic/",
            get(journal::new_topic_form).post(journal::new_topic_submit),
        )
        .route(
            "/new_entry/:topic_id/",
            get(journal::new_entry_form).post(journal::new_entry_submit),
        )
        .route(
            "/edit_entry/:entry_id/",
            get(journal::edit_entry_form).post(journal::edit_entry_submit),
        )
        .route(
            "/search/",
            get(journal::search_form).post(journal::search_submit),
        )
        .route(
            "/users/login/",
            get(accounts::login_form).post(accounts::login_submit),
        )
        .route(
            "/users/register/",
            get(accounts::register_form).post(accounts::register_submit),
        )
        .route(
            "/users/logout/",
            get(accounts::logout).post(accounts::logout),
        )
        .fallback(not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(render::not_found())).into_response()
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    info!(
        "event=http_request module=web status=ok method={} path={} http_status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}
