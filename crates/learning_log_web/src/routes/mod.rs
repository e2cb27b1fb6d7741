//! Route handlers.
//!
//! Every handler follows the same shape: resolve identity, then on the
//! blocking pool run one service call and render or redirect.

pub mod accounts;
pub mod journal;

use crate::error::WebError;

/// Parses a numeric path id. Anything unparsable is reported as not found.
pub(crate) fn parse_id(raw: &str) -> Result<i64, WebError> {
    raw.parse::<i64>().map_err(|_| WebError::NotFound)
}
