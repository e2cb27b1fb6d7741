//! Entry domain model.
//!
//! # Invariants
//! - An entry belongs to exactly one topic for its whole lifetime.
//! - Only `text` is mutable after creation.

use crate::model::topic::TopicId;
use serde::{Deserialize, Serialize};

/// Store-assigned entry identifier.
pub type EntryId = i64;

const SUMMARY_CHARS: usize = 50;

/// A timestamped text note belonging to one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub text: String,
    /// Unix epoch milliseconds, set by the store at insert time.
    pub date_added: i64,
    pub topic: TopicId,
}

impl Entry {
    /// Short single-line label: the first 50 characters, with `...` appended
    /// when the text is longer.
    pub fn summary(&self) -> String {
        let mut summary = self.text.chars().take(SUMMARY_CHARS).collect::<String>();
        if self.text.chars().count() > SUMMARY_CHARS {
            summary.push_str("...");
        }
        summary
    }
}

/// Validated input for inserting an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub text: String,
    pub topic: TopicId,
}
