//! Domain model for the learning journal.
//!
//! # Responsibility
//! - Define the records persisted by the store and rendered by views.
//! - Encode ownership: a topic has exactly one owner; an entry is owned
//!   through its parent topic.
//!
//! # Invariants
//! - Ids and `date_added` values are assigned by the store, never by callers.
//! - Topic ownership is immutable after creation.

pub mod entry;
pub mod principal;
pub mod topic;
