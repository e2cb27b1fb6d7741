//! Journal use-case service.
//!
//! # Responsibility
//! - Implement the topic/entry/search operations behind every journal route.
//! - Enforce the ownership predicate on gated reads and edits.
//!
//! # Invariants
//! - The caller's identity is always an explicit `&Principal` argument.
//! - Missing and not-owned records both surface as [`JournalError::NotFound`]
//!   so callers cannot probe for existence.
//! - A submission that fails validation persists nothing.

use crate::form::{BoundForm, EntryForm, FormOutcome, FormRequest, SearchForm, TopicForm};
use crate::model::entry::{Entry, EntryId, NewEntry};
use crate::model::principal::Principal;
use crate::model::topic::{NewTopic, Topic, TopicId};
use crate::repo::entry_repo::{EntryRepository, SqliteEntryRepository};
use crate::repo::topic_repo::{SqliteTopicRepository, TopicRepository};
use crate::repo::RepoError;
use crate::search::substring::{SearchCase, TopicSearchQuery};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type JournalResult<T> = Result<T, JournalError>;

/// Service error for journal use-cases.
#[derive(Debug)]
pub enum JournalError {
    /// Record is absent or not owned by the caller.
    NotFound,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for JournalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for JournalError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { .. } => Self::NotFound,
            other => Self::Repo(other),
        }
    }
}

/// A topic together with its entries, newest entry first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicView {
    pub topic: Topic,
    pub entries: Vec<Entry>,
}

/// Result of the new-entry operation, scoped to its parent topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntryPage {
    pub topic: Topic,
    pub outcome: FormOutcome<EntryForm, Entry>,
}

/// Result of the edit-entry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEntryPage {
    pub topic: Topic,
    /// The entry as stored after this request.
    pub entry: Entry,
    pub outcome: FormOutcome<EntryForm, Entry>,
}

/// Result of the search operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Show the query form (empty or with errors).
    Form(BoundForm<SearchForm>),
    /// Matching topics for a valid query, possibly empty.
    Results { query: String, topics: Vec<Topic> },
}

/// Journal service facade over topic and entry repositories.
pub struct JournalService<T: TopicRepository, E: EntryRepository> {
    topics: T,
    entries: E,
    search_case: SearchCase,
}

impl<'conn> JournalService<SqliteTopicRepository<'conn>, SqliteEntryRepository<'conn>> {
    /// Builds a service over SQLite repositories sharing one connection.
    pub fn with_connection(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteTopicRepository::new(conn),
            SqliteEntryRepository::new(conn),
        )
    }
}

impl<T: TopicRepository, E: EntryRepository> JournalService<T, E> {
    /// Creates a service with case-sensitive search.
    pub fn new(topics: T, entries: E) -> Self {
        Self {
            topics,
            entries,
            search_case: SearchCase::default(),
        }
    }

    pub fn with_search_case(mut self, search_case: SearchCase) -> Self {
        self.search_case = search_case;
        self
    }

    /// Lists the caller's topics, oldest first.
    pub fn list_topics(&self, principal: &Principal) -> JournalResult<Vec<Topic>> {
        let topics = self.topics.list_topics_by_owner(principal.id)?;
        debug!(
            "event=topic_list module=journal status=ok owner_id={} count={}",
            principal.id,
            topics.len()
        );
        Ok(topics)
    }

    /// Returns one owned topic and its entries, newest first.
    pub fn view_topic(&self, principal: &Principal, topic_id: TopicId) -> JournalResult<TopicView> {
        let topic = self.owned_topic(principal, topic_id)?;
        let entries = self.entries.list_entries_for_topic(topic.id)?;
        Ok(TopicView { topic, entries })
    }

    /// Shows or processes the new-topic form.
    ///
    /// On success the topic is owned by `principal`.
    pub fn create_topic(
        &self,
        principal: &Principal,
        request: FormRequest<TopicForm>,
    ) -> JournalResult<FormOutcome<TopicForm, Topic>> {
        let submitted = match request {
            FormRequest::Display => return Ok(FormOutcome::Render(BoundForm::empty())),
            FormRequest::Submit(form) => form,
        };

        let cleaned = match submitted.validate() {
            Ok(cleaned) => cleaned,
            Err(errors) => {
                info!(
                    "event=topic_create module=journal status=rejected owner_id={} error_count={}",
                    principal.id,
                    errors.len()
                );
                return Ok(FormOutcome::Render(BoundForm::invalid(submitted, errors)));
            }
        };

        let topic = self.topics.create_topic(&NewTopic {
            text: cleaned.text,
            owner: principal.id,
        })?;
        info!(
            "event=topic_create module=journal status=ok owner_id={} topic_id={}",
            principal.id, topic.id
        );
        Ok(FormOutcome::Saved(topic))
    }

    /// Shows or processes the new-entry form for `topic_id`.
    ///
    /// The parent topic must exist, but its owner is not compared with
    /// `principal`: any authenticated caller may append to any topic.
    pub fn create_entry(
        &self,
        principal: &Principal,
        topic_id: TopicId,
        request: FormRequest<EntryForm>,
    ) -> JournalResult<NewEntryPage> {
        let topic = self.topics.get_topic(topic_id)?.ok_or(JournalError::NotFound)?;
        let submitted = match request {
            FormRequest::Display => {
                return Ok(NewEntryPage {
                    topic,
                    outcome: FormOutcome::Render(BoundForm::empty()),
                })
            }
            FormRequest::Submit(form) => form,
        };

        let cleaned = match submitted.validate() {
            Ok(cleaned) => cleaned,
            Err(errors) => {
                info!(
                    "event=entry_create module=journal status=rejected topic_id={} error_count={}",
                    topic.id,
                    errors.len()
                );
                return Ok(NewEntryPage {
                    topic,
                    outcome: FormOutcome::Render(BoundForm::invalid(submitted, errors)),
                });
            }
        };

        if !topic.is_owned_by(principal) {
            warn!(
                "event=entry_create module=journal status=foreign_topic principal_id={} topic_id={} owner_id={}",
                principal.id, topic.id, topic.owner
            );
        }
        let entry = self.entries.create_entry(&NewEntry {
            text: cleaned.text,
            topic: topic.id,
        })?;
        info!(
            "event=entry_create module=journal status=ok topic_id={} entry_id={}",
            topic.id, entry.id
        );
        Ok(NewEntryPage {
            topic,
            outcome: FormOutcome::Saved(entry),
        })
    }

    /// Shows or processes the edit form for an owned entry.
    ///
    /// Only the text changes; id, parent topic and `date_added` are preserved.
    pub fn edit_entry(
        &self,
        principal: &Principal,
        entry_id: EntryId,
        request: FormRequest<EntryForm>,
    ) -> JournalResult<EditEntryPage> {
        let entry = self.entries.get_entry(entry_id)?.ok_or(JournalError::NotFound)?;
        let topic = self.owned_topic(principal, entry.topic)?;

        let submitted = match request {
            FormRequest::Display => {
                let form = BoundForm::prefilled(EntryForm::new(entry.text.clone()));
                return Ok(EditEntryPage {
                    topic,
                    entry,
                    outcome: FormOutcome::Render(form),
                });
            }
            FormRequest::Submit(form) => form,
        };

        let cleaned = match submitted.validate() {
            Ok(cleaned) => cleaned,
            Err(errors) => {
                info!(
                    "event=entry_update module=journal status=rejected entry_id={} error_count={}",
                    entry.id,
                    errors.len()
                );
                return Ok(EditEntryPage {
                    topic,
                    entry,
                    outcome: FormOutcome::Render(BoundForm::invalid(submitted, errors)),
                });
            }
        };

        let updated = self.entries.update_entry_text(entry.id, &cleaned.text)?;
        info!(
            "event=entry_update module=journal status=ok topic_id={} entry_id={}",
            topic.id, updated.id
        );
        Ok(EditEntryPage {
            topic,
            entry: updated.clone(),
            outcome: FormOutcome::Saved(updated),
        })
    }

    /// Shows the query form or searches topic text across all owners.
    ///
    /// Requires no principal.
    pub fn search(&self, request: FormRequest<SearchForm>) -> JournalResult<SearchOutcome> {
        let submitted = match request {
            FormRequest::Display => return Ok(SearchOutcome::Form(BoundForm::empty())),
            FormRequest::Submit(form) => form,
        };

        let cleaned = match submitted.validate() {
            Ok(cleaned) => cleaned,
            Err(errors) => {
                return Ok(SearchOutcome::Form(BoundForm::invalid(submitted, errors)));
            }
        };

        let query = TopicSearchQuery::new(cleaned.query.clone()).with_case(self.search_case);
        let topics = self.topics.search_topics(&query)?;
        debug!(
            "event=topic_search module=journal status=ok case={} hit_count={}",
            self.search_case,
            topics.len()
        );
        Ok(SearchOutcome::Results {
            query: cleaned.query,
            topics,
        })
    }

    fn owned_topic(&self, principal: &Principal, topic_id: TopicId) -> JournalResult<Topic> {
        match self.topics.get_topic(topic_id)? {
            Some(topic) if topic.is_owned_by(principal) => Ok(topic),
            Some(_) => {
                debug!(
                    "event=topic_access module=journal status=denied principal_id={} topic_id={}",
                    principal.id, topic_id
                );
                Err(JournalError::NotFound)
            }
            None => Err(JournalError::NotFound),
        }
    }
}
