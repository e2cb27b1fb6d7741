//! Explicit form validation.
//!
//! # Responsibility
//! - Model submitted form data as plain structs.
//! - Validate each form with one function returning either the cleaned
//!   form or an ordered list of field errors.
//! - Carry invalid submissions back to the caller so they can be echoed.
//!
//! # Invariants
//! - A rejected form is never partially persisted.
//! - Submitted values are preserved verbatim in [`BoundForm::data`].

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account;
pub mod journal;

pub use account::{LoginForm, RegisterForm};
pub use journal::{EntryForm, SearchForm, TopicForm};

/// Field name used for errors that are not tied to a single input.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub(crate) const REQUIRED_MESSAGE: &str = "This field is required.";

/// One validation failure on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Ordered collection of field errors for one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection holding a single error.
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages attached to `field`, in insertion order.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Returns `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .errors
            .iter()
            .map(|error| error.field)
            .collect::<Vec<_>>();
        write!(f, "invalid form fields: {}", fields.join(","))
    }
}

impl Error for ValidationErrors {}

/// Submitted (or empty) form data together with its validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundForm<F> {
    pub data: F,
    pub errors: ValidationErrors,
}

impl<F: Default> BoundForm<F> {
    /// An unsubmitted form with default values and no errors.
    pub fn empty() -> Self {
        Self {
            data: F::default(),
            errors: ValidationErrors::new(),
        }
    }
}

impl<F> BoundForm<F> {
    /// A form pre-populated with `data` and no errors.
    pub fn prefilled(data: F) -> Self {
        Self {
            data,
            errors: ValidationErrors::new(),
        }
    }

    /// A rejected submission echoing `data` with `errors`.
    pub fn invalid(data: F, errors: ValidationErrors) -> Self {
        Self { data, errors }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A request against a form-backed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormRequest<F> {
    /// Show the form without processing input.
    Display,
    /// Process submitted data.
    Submit(F),
}

/// Result of a form-backed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome<F, T> {
    /// Show the form again (empty, pre-filled or with errors).
    Render(BoundForm<F>),
    /// Input was valid and the record was persisted.
    Saved(T),
}

impl<F, T> FormOutcome<F, T> {
    pub fn saved(&self) -> Option<&T> {
        match self {
            Self::Saved(value) => Some(value),
            Self::Render(_) => None,
        }
    }

    pub fn form(&self) -> Option<&BoundForm<F>> {
        match self {
            Self::Render(form) => Some(form),
            Self::Saved(_) => None,
        }
    }
}

/// Trims `value` and checks the required and max-length constraints.
///
/// Length is counted in characters, not bytes.
pub(crate) fn clean_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max_chars: Option<usize>,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(field, REQUIRED_MESSAGE);
        return String::new();
    }

    if let Some(max_chars) = max_chars {
        let count = trimmed.chars().count();
        if count > max_chars {
            errors.push(
                field,
                format!("Ensure this value has at most {max_chars} characters (it has {count})."),
            );
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::{clean_text, ValidationErrors, REQUIRED_MESSAGE};

    #[test]
    fn clean_text_trims_and_rejects_blank_values() {
        let mut errors = ValidationErrors::new();
        assert_eq!(clean_text(&mut errors, "text", "  Rust  ", None), "Rust");
        assert!(errors.is_empty());

        clean_text(&mut errors, "text", " \n\t ", None);
        assert_eq!(errors.for_field("text").collect::<Vec<_>>(), vec![REQUIRED_MESSAGE]);
    }

    #[test]
    fn clean_text_counts_characters_not_bytes() {
        let mut errors = ValidationErrors::new();
        clean_text(&mut errors, "text", &"ü".repeat(5), Some(5));
        assert!(errors.is_empty());

        clean_text(&mut errors, "text", &"ü".repeat(6), Some(5));
        let messages = errors.for_field("text").collect::<Vec<_>>();
        assert_eq!(
            messages,
            vec!["Ensure this value has at most 5 characters (it has 6)."]
        );
    }

    #[test]
    fn into_result_passes_value_through_when_clean() {
        let clean: Result<u8, ValidationErrors> = ValidationErrors::new().into_result(7);
        assert_eq!(clean, Ok(7));

        let dirty = ValidationErrors::single("query", "bad").into_result(7);
        assert_eq!(dirty.expect_err("errors recorded").len(), 1);
    }
}
