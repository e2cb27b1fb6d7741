//! Topic domain model.
//!
//! # Invariants
//! - `text` is non-empty and at most [`TOPIC_TEXT_MAX_CHARS`] characters.
//! - `owner` never changes once the topic exists.

use crate::model::principal::{Principal, PrincipalId};
use serde::{Deserialize, Serialize};

/// Store-assigned topic identifier.
pub type TopicId = i64;

/// Upper bound for topic text, counted in characters.
pub const TOPIC_TEXT_MAX_CHARS: usize = 200;

/// A named journal subject owned by one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub text: String,
    /// Unix epoch milliseconds, set by the store at insert time.
    pub date_added: i64,
    pub owner: PrincipalId,
}

impl Topic {
    /// Returns whether `principal` owns this topic and therefore every entry under it.
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.owner == principal.id
    }
}

/// Validated input for inserting a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTopic {
    pub text: String,
    pub owner: PrincipalId,
}
