//! Topic, entry and search forms.

use crate::form::{clean_text, ValidationErrors};
use crate::model::topic::TOPIC_TEXT_MAX_CHARS;
use serde::{Deserialize, Serialize};

/// Input for creating a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicForm {
    pub text: String,
}

impl TopicForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the cleaned form, or every field error found.
    pub fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let text = clean_text(&mut errors, "text", &self.text, Some(TOPIC_TEXT_MAX_CHARS));
        errors.into_result(Self { text })
    }
}

/// Input for creating or editing an entry. Entry text has no upper bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryForm {
    pub text: String,
}

impl EntryForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let text = clean_text(&mut errors, "text", &self.text, None);
        errors.into_result(Self { text })
    }
}

/// Keyword search input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub query: String,
}

impl SearchForm {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let query = clean_text(&mut errors, "query", &self.query, None);
        errors.into_result(Self { query })
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryForm, SearchForm, TopicForm};

    #[test]
    fn topic_form_enforces_required_and_max_length() {
        assert!(TopicForm::new("").validate().is_err());
        assert!(TopicForm::new("x".repeat(200)).validate().is_ok());

        let errors = TopicForm::new("x".repeat(201))
            .validate()
            .expect_err("201 chars exceeds the bound");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().map(|error| error.field), Some("text"));
    }

    #[test]
    fn entry_form_accepts_long_text() {
        let cleaned = EntryForm::new(format!("  {}  ", "a".repeat(10_000)))
            .validate()
            .expect("entry text is unbounded");
        assert_eq!(cleaned.text.len(), 10_000);
    }

    #[test]
    fn search_form_requires_query() {
        let errors = SearchForm::default().validate().expect_err("empty query");
        assert_eq!(errors.for_field("query").count(), 1);
        assert_eq!(
            SearchForm::new(" Chess ").validate().expect("valid").query,
            "Chess"
        );
    }
}
