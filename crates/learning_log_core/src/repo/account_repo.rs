//! User and session repositories backing the identity provider.
//!
//! # Invariants
//! - Usernames are unique (case-sensitive).
//! - Sessions are removed together with their user.
//! - Sessions older than [`SESSION_MAX_AGE_MS`] never resolve to a principal.

use crate::model::principal::{Principal, PrincipalId};
use crate::repo::{constraint_violation, RepoError, RepoResult, NOW_EPOCH_MS_SQL};
use rusqlite::{params, Connection, OptionalExtension};

/// Lifetime of a login session: two weeks.
pub const SESSION_MAX_AGE_MS: i64 = 14 * 24 * 60 * 60 * 1000;

/// Stored credentials for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub principal: Principal,
    /// PHC-format password hash (algorithm, parameters, salt and digest).
    pub password_hash: String,
}

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Inserts a user. Fails with [`RepoError::Conflict`] when the username is taken.
    fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<Principal>;
    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>>;
}

/// Repository interface for login sessions.
pub trait SessionRepository {
    fn create_session(&self, token: &str, user: PrincipalId) -> RepoResult<()>;
    /// Resolves a live session. Expired sessions resolve to `None`.
    fn principal_for_session(&self, token: &str) -> RepoResult<Option<Principal>>;
    /// Deletes every expired session and returns how many were removed.
    fn purge_expired_sessions(&self) -> RepoResult<usize>;
    /// Removes a session. Deleting an unknown token is not an error.
    fn delete_session(&self, token: &str) -> RepoResult<()>;
}

/// SQLite-backed user and session repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteAccountRepository<'_> {
    fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<Principal> {
        let inserted = self.conn.query_row(
            &format!(
                "INSERT INTO users (username, password_hash, date_joined)
                 VALUES (?1, ?2, {NOW_EPOCH_MS_SQL})
                 RETURNING id, username;"
            ),
            params![username, password_hash],
            |row| {
                Ok(Principal {
                    id: row.get("id")?,
                    username: row.get("username")?,
                })
            },
        );

        match inserted {
            Ok(principal) => Ok(principal),
            Err(err)
                if constraint_violation(&err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) =>
            {
                Err(RepoError::Conflict(format!("username `{username}` already exists")))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<UserRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, username, password_hash
                 FROM users
                 WHERE username = ?1;",
                [username],
                |row| {
                    Ok(UserRecord {
                        principal: Principal {
                            id: row.get("id")?,
                            username: row.get("username")?,
                        },
                        password_hash: row.get("password_hash")?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }
}

impl SessionRepository for SqliteAccountRepository<'_> {
    fn create_session(&self, token: &str, user: PrincipalId) -> RepoResult<()> {
        match self.conn.execute(
            &format!(
                "INSERT INTO sessions (token, user_id, created_at)
                 VALUES (?1, ?2, {NOW_EPOCH_MS_SQL});"
            ),
            params![token, user],
        ) {
            Ok(_) => Ok(()),
            Err(err)
                if constraint_violation(&err)
                    == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) =>
            {
                Err(RepoError::NotFound {
                    kind: "user",
                    id: user,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn principal_for_session(&self, token: &str) -> RepoResult<Option<Principal>> {
        let principal = self
            .conn
            .query_row(
                &format!(
                    "SELECT users.id AS id, users.username AS username
                     FROM sessions
                     JOIN users ON users.id = sessions.user_id
                     WHERE sessions.token = ?1
                       AND sessions.created_at > {NOW_EPOCH_MS_SQL} - ?2;"
                ),
                params![token, SESSION_MAX_AGE_MS],
                |row| {
                    Ok(Principal {
                        id: row.get("id")?,
                        username: row.get("username")?,
                    })
                },
            )
            .optional()?;
        Ok(principal)
    }

    fn purge_expired_sessions(&self) -> RepoResult<usize> {
        let removed = self.conn.execute(
            &format!("DELETE FROM sessions WHERE created_at <= {NOW_EPOCH_MS_SQL} - ?1;"),
            [SESSION_MAX_AGE_MS],
        )?;
        Ok(removed)
    }

    fn delete_session(&self, token: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM sessions WHERE token = ?1;", [token])?;
        Ok(())
    }
}
