//! Core domain logic for Learning Log.
//! This crate is the single source of truth for journal invariants:
//! topic ownership, entry parentage, form validation and search semantics.

pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use form::{
    BoundForm, EntryForm, FieldError, FormOutcome, FormRequest, LoginForm, RegisterForm,
    SearchForm, TopicForm, ValidationErrors, NON_FIELD_ERRORS,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{Entry, EntryId, NewEntry};
pub use model::principal::{Principal, PrincipalId};
pub use model::topic::{NewTopic, Topic, TopicId, TOPIC_TEXT_MAX_CHARS};
pub use repo::account_repo::{
    SessionRepository, SqliteAccountRepository, UserRecord, UserRepository, SESSION_MAX_AGE_MS,
};
pub use repo::entry_repo::{EntryRepository, SqliteEntryRepository};
pub use repo::topic_repo::{SqliteTopicRepository, TopicRepository};
pub use repo::{RepoError, RepoResult};
pub use search::substring::{search_topics, SearchCase, TopicSearchQuery};
pub use service::account_service::{AccountError, AccountResult, AccountService, LoginSession};
pub use service::journal_service::{
    EditEntryPage, JournalError, JournalResult, JournalService, NewEntryPage, SearchOutcome,
    TopicView,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
