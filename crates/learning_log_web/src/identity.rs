//! Session-cookie identity resolution.
//!
//! # Responsibility
//! - Read the session cookie and resolve it to a [`Principal`].
//! - Reject gated requests with a redirect to the login page.
//! - Build the cookie headers issued on login and logout.
//!
//! # Invariants
//! - Redirect targets taken from user input are local paths only.

use crate::error::WebError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use learning_log_core::{Principal, SESSION_MAX_AGE_MS};

pub const SESSION_COOKIE: &str = "learning_log_session";
pub const LOGIN_PATH: &str = "/users/login/";
pub const DEFAULT_LOGIN_REDIRECT: &str = "/topics/";

/// Authenticated caller. Extraction fails with
/// [`WebError::AuthenticationRequired`] when no valid session is present.
pub struct CurrentUser(pub Principal);

/// Caller identity on routes that do not require one.
pub struct MaybeUser(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve_principal(parts, state).await? {
            Some(principal) => Ok(Self(principal)),
            None => Err(WebError::AuthenticationRequired {
                next: parts.uri.path().to_string(),
            }),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_principal(parts, state).await.map(Self)
    }
}

async fn resolve_principal(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<Principal>, WebError> {
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };
    state
        .with_conn(move |state, conn| Ok(state.accounts(conn).resolve_session(&token)?))
        .await
}

/// Returns the session token carried by the request, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that installs a session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_MAX_AGE_MS / 1000
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Login URL that returns the user to `next` afterwards.
pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", percent_encode(next))
}

/// Accepts `next` only when it is a path on this site that is also a valid
/// `Location` header value.
///
/// Whitespace and control characters are rejected outright: browsers strip
/// them from URLs, so `/\t/host` would otherwise leave the site.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && path.chars().all(|ch| ch.is_ascii_graphic()) =>
        {
            path
        }
        _ => DEFAULT_LOGIN_REDIRECT,
    }
}

fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(char::from(byte));
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}
