//! Entry repository contract and SQLite implementation.
//!
//! # Invariants
//! - Topic listings are ordered `date_added DESC, id DESC` (newest first).
//! - Updates only touch `text`; `id`, `topic_id` and `date_added` are stable.

use crate::model::entry::{Entry, EntryId, NewEntry};
use crate::model::topic::TopicId;
use crate::repo::{constraint_violation, RepoError, RepoResult, NOW_EPOCH_MS_SQL};
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTRY_SELECT_SQL: &str = "SELECT id, text, date_added, topic_id FROM entries";

/// Repository interface for entry persistence.
pub trait EntryRepository {
    /// Inserts an entry under an existing topic and returns the stored record.
    fn create_entry(&self, entry: &NewEntry) -> RepoResult<Entry>;
    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>>;
    /// Replaces entry text in place and returns the updated record.
    fn update_entry_text(&self, id: EntryId, text: &str) -> RepoResult<Entry>;
    /// Lists entries of `topic`, newest first.
    fn list_entries_for_topic(&self, topic: TopicId) -> RepoResult<Vec<Entry>>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn create_entry(&self, entry: &NewEntry) -> RepoResult<Entry> {
        let result = self.conn.query_row(
            &format!(
                "INSERT INTO entries (text, date_added, topic_id)
                 VALUES (?1, {NOW_EPOCH_MS_SQL}, ?2)
                 RETURNING id, text, date_added, topic_id;"
            ),
            params![entry.text.as_str(), entry.topic],
            |row| Ok(parse_entry_row(row)),
        );

        match result {
            Ok(entry) => entry,
            Err(err)
                if constraint_violation(&err)
                    == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) =>
            {
                Err(RepoError::NotFound {
                    kind: "topic",
                    id: entry.topic,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>> {
        self.conn
            .query_row(
                &format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_entry_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn update_entry_text(&self, id: EntryId, text: &str) -> RepoResult<Entry> {
        self.conn
            .query_row(
                "UPDATE entries
                 SET text = ?2
                 WHERE id = ?1
                 RETURNING id, text, date_added, topic_id;",
                params![id, text],
                |row| Ok(parse_entry_row(row)),
            )
            .optional()?
            .unwrap_or(Err(RepoError::NotFound { kind: "entry", id }))
    }

    fn list_entries_for_topic(&self, topic: TopicId) -> RepoResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE topic_id = ?1
             ORDER BY date_added DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([topic])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let id: EntryId = row.get("id")?;
    let text: String = row.get("text")?;
    if text.is_empty() {
        return Err(RepoError::InvalidData(format!("entry {id} has empty text")));
    }

    Ok(Entry {
        id,
        text,
        date_added: row.get("date_added")?,
        topic: row.get("topic_id")?,
    })
}
