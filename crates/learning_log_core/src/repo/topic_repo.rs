//! Topic repository contract and SQLite implementation.
//!
//! # Invariants
//! - Owner listings are ordered `date_added ASC, id ASC`.
//! - Stored text never exceeds [`TOPIC_TEXT_MAX_CHARS`].

use crate::model::principal::PrincipalId;
use crate::model::topic::{NewTopic, Topic, TopicId, TOPIC_TEXT_MAX_CHARS};
use crate::repo::{constraint_violation, RepoError, RepoResult, NOW_EPOCH_MS_SQL};
use crate::search::substring::{search_topics, TopicSearchQuery};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const TOPIC_SELECT_SQL: &str = "SELECT id, text, date_added, owner_id FROM topics";

/// Repository interface for topic persistence.
pub trait TopicRepository {
    /// Inserts a topic and returns the stored record.
    fn create_topic(&self, topic: &NewTopic) -> RepoResult<Topic>;
    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>>;
    /// Lists topics owned by `owner`, oldest first.
    fn list_topics_by_owner(&self, owner: PrincipalId) -> RepoResult<Vec<Topic>>;
    /// Substring search over topic text across all owners.
    fn search_topics(&self, query: &TopicSearchQuery) -> RepoResult<Vec<Topic>>;
    fn count_topics(&self) -> RepoResult<u64>;
}

/// SQLite-backed topic repository.
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn create_topic(&self, topic: &NewTopic) -> RepoResult<Topic> {
        let result = self.conn.query_row(
            &format!(
                "INSERT INTO topics (text, date_added, owner_id)
                 VALUES (?1, {NOW_EPOCH_MS_SQL}, ?2)
                 RETURNING id, text, date_added, owner_id;"
            ),
            params![topic.text.as_str(), topic.owner],
            |row| Ok(parse_topic_row(row)),
        );

        match result {
            Ok(topic) => topic,
            Err(err)
                if constraint_violation(&err)
                    == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) =>
            {
                Err(RepoError::NotFound {
                    kind: "user",
                    id: topic.owner,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        self.conn
            .query_row(
                &format!("{TOPIC_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_topic_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_topics_by_owner(&self, owner: PrincipalId) -> RepoResult<Vec<Topic>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TOPIC_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY date_added ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn search_topics(&self, query: &TopicSearchQuery) -> RepoResult<Vec<Topic>> {
        search_topics(self.conn, query)
    }

    fn count_topics(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM topics;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative topic count `{count}`")))
    }
}

pub(crate) fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    let id: TopicId = row.get("id")?;
    let text: String = row.get("text")?;
    let chars = text.chars().count();
    if chars == 0 || chars > TOPIC_TEXT_MAX_CHARS {
        return Err(RepoError::InvalidData(format!(
            "topic {id} text length {chars} outside 1..={TOPIC_TEXT_MAX_CHARS}"
        )));
    }

    Ok(Topic {
        id,
        text,
        date_added: row.get("date_added")?,
        owner: row.get("owner_id")?,
    })
}
