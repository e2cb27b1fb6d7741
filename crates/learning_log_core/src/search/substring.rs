//! SQLite substring search over topic text.
//!
//! # Invariants
//! - Matching is a plain substring test; the query is never interpreted as
//!   a pattern (`%`, `_` and `*` match literally).
//! - Results span all owners and are ordered `date_added ASC, id ASC`.
//! - `SearchCase::Insensitive` folds ASCII letters only.

use crate::model::topic::Topic;
use crate::repo::topic_repo::{parse_topic_row, TOPIC_SELECT_SQL};
use crate::repo::RepoResult;
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Case policy for topic search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchCase {
    /// `chess` does not match `Chess strategies`.
    #[default]
    Sensitive,
    /// `chess` matches `Chess strategies`.
    Insensitive,
}

impl SearchCase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sensitive => "sensitive",
            Self::Insensitive => "insensitive",
        }
    }
}

impl Display for SearchCase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchCase {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sensitive" => Ok(Self::Sensitive),
            "insensitive" => Ok(Self::Insensitive),
            other => Err(format!(
                "unsupported search case `{other}`; expected sensitive|insensitive"
            )),
        }
    }
}

/// Search options for topic lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSearchQuery {
    pub text: String,
    pub case: SearchCase,
}

impl TopicSearchQuery {
    /// Creates a case-sensitive query.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case: SearchCase::default(),
        }
    }

    pub fn with_case(mut self, case: SearchCase) -> Self {
        self.case = case;
        self
    }
}

/// Returns every topic whose text contains the query.
///
/// Returns an empty list for an empty query.
pub fn search_topics(conn: &Connection, query: &TopicSearchQuery) -> RepoResult<Vec<Topic>> {
    if query.text.is_empty() {
        return Ok(Vec::new());
    }

    let predicate = match query.case {
        SearchCase::Sensitive => "instr(text, ?1) > 0",
        SearchCase::Insensitive => "instr(lower(text), lower(?1)) > 0",
    };
    let mut stmt = conn.prepare(&format!(
        "{TOPIC_SELECT_SQL}
         WHERE {predicate}
         ORDER BY date_added ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([query.text.as_str()])?;
    let mut topics = Vec::new();
    while let Some(row) = rows.next()? {
        topics.push(parse_topic_row(row)?);
    }
    Ok(topics)
}

#[cfg(test)]
mod tests {
    use super::SearchCase;

    #[test]
    fn search_case_parses_known_values() {
        assert_eq!(" Insensitive ".parse::<SearchCase>(), Ok(SearchCase::Insensitive));
        assert_eq!("sensitive".parse::<SearchCase>(), Ok(SearchCase::Sensitive));
        assert!("fuzzy".parse::<SearchCase>().is_err());
    }
}
