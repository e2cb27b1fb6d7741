//! Topic, entry and search handlers.
//!
//! Each GET/POST pair shares one synchronous body that runs on the blocking
//! pool through [`AppState::with_conn`], store calls and rendering included.

use crate::error::WebError;
use crate::identity::{CurrentUser, MaybeUser};
use crate::render;
use crate::routes::parse_id;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use learning_log_core::{
    EntryForm, FormOutcome, FormRequest, Principal, SearchForm, SearchOutcome, TopicForm,
};
use rusqlite::Connection;

pub async fn index(MaybeUser(user): MaybeUser) -> Html<String> {
    Html(render::index(user.as_ref()))
}

pub async fn topics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, WebError> {
    state
        .with_conn(move |state, conn| {
            let topics = state.journal(conn).list_topics(&user)?;
            Ok(Html(render::topics(&user, &topics)))
        })
        .await
}

pub async fn topic(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(topic_id): Path<String>,
) -> Result<Html<String>, WebError> {
    let topic_id = parse_id(&topic_id)?;
    state
        .with_conn(move |state, conn| {
            let view = state.journal(conn).view_topic(&user, topic_id)?;
            Ok(Html(render::topic(&user, &view)))
        })
        .await
}

pub async fn new_topic_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, WebError> {
    state
        .with_conn(move |state, conn| new_topic(state, conn, &user, FormRequest::Display))
        .await
}

pub async fn new_topic_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<TopicForm>,
) -> Result<Response, WebError> {
    state
        .with_conn(move |state, conn| new_topic(state, conn, &user, FormRequest::Submit(form)))
        .await
}

fn new_topic(
    state: &AppState,
    conn: &Connection,
    user: &Principal,
    request: FormRequest<TopicForm>,
) -> Result<Response, WebError> {
    Ok(match state.journal(conn).create_topic(user, request)? {
        FormOutcome::Saved(_) => Redirect::to("/topics/").into_response(),
        FormOutcome::Render(form) => Html(render::new_topic(user, &form)).into_response(),
    })
}

pub async fn new_entry_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(topic_id): Path<String>,
) -> Result<Response, WebError> {
    let topic_id = parse_id(&topic_id)?;
    state
        .with_conn(move |state, conn| {
            new_entry(state, conn, &user, topic_id, FormRequest::Display)
        })
        .await
}

pub async fn new_entry_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(topic_id): Path<String>,
    Form(form): Form<EntryForm>,
) -> Result<Response, WebError> {
    let topic_id = parse_id(&topic_id)?;
    state
        .with_conn(move |state, conn| {
            new_entry(state, conn, &user, topic_id, FormRequest::Submit(form))
        })
        .await
}

fn new_entry(
    state: &AppState,
    conn: &Connection,
    user: &Principal,
    topic_id: i64,
    request: FormRequest<EntryForm>,
) -> Result<Response, WebError> {
    let page = state.journal(conn).create_entry(user, topic_id, request)?;
    Ok(match page.outcome {
        FormOutcome::Saved(_) => Redirect::to(&format!("/topics/{}/", page.topic.id)).into_response(),
        FormOutcome::Render(form) => {
            Html(render::new_entry(user, &page.topic, &form)).into_response()
        }
    })
}

pub async fn edit_entry_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<String>,
) -> Result<Response, WebError> {
    let entry_id = parse_id(&entry_id)?;
    state
        .with_conn(move |state, conn| {
            edit_entry(state, conn, &user, entry_id, FormRequest::Display)
        })
        .await
}

pub async fn edit_entry_submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<String>,
    Form(form): Form<EntryForm>,
) -> Result<Response, WebError> {
    let entry_id = parse_id(&entry_id)?;
    state
        .with_conn(move |state, conn| {
            edit_entry(state, conn, &user, entry_id, FormRequest::Submit(form))
        })
        .await
}

fn edit_entry(
    state: &AppState,
    conn: &Connection,
    user: &Principal,
    entry_id: i64,
    request: FormRequest<EntryForm>,
) -> Result<Response, WebError> {
    let page = state.journal(conn).edit_entry(user, entry_id, request)?;
    Ok(match page.outcome {
        FormOutcome::Saved(_) => Redirect::to(&format!("/topics/{}/", page.topic.id)).into_response(),
        FormOutcome::Render(form) => {
            Html(render::edit_entry(user, &page.topic, &page.entry, &form)).into_response()
        }
    })
}

pub async fn search_form(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>, WebError> {
    state
        .with_conn(move |state, conn| search(state, conn, user, FormRequest::Display))
        .await
}

pub async fn search_submit(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, WebError> {
    state
        .with_conn(move |state, conn| search(state, conn, user, FormRequest::Submit(form)))
        .await
}

fn search(
    state: &AppState,
    conn: &Connection,
    user: Option<Principal>,
    request: FormRequest<SearchForm>,
) -> Result<Html<String>, WebError> {
    Ok(Html(match state.journal(conn).search(request)? {
        SearchOutcome::Form(form) => render::search(user.as_ref(), &form),
        SearchOutcome::Results { query, topics } => {
            render::search_results(user.as_ref(), &query, &topics)
        }
    }))
}
