//! Shared application state handed to every handler.

use crate::error::WebError;
use learning_log_core::{
    AccountService, JournalService, SearchCase, SqliteAccountRepository, SqliteEntryRepository,
    SqliteTopicRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tokio::task;

/// One SQLite connection shared behind a mutex.
///
/// Store work runs on the blocking thread pool while the lock is held; the
/// lock is never held across an `.await`.
#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
    search_case: SearchCase,
}

impl AppState {
    pub fn new(conn: Connection, search_case: SearchCase) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            search_case,
        }
    }

    pub fn search_case(&self) -> SearchCase {
        self.search_case
    }

    /// Runs `f` on the blocking pool with exclusive access to the connection.
    pub async fn with_conn<T, F>(&self, f: F) -> Result<T, WebError>
    where
        F: FnOnce(&AppState, &Connection) -> Result<T, WebError> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        task::spawn_blocking(move || {
            let conn = state.conn.lock().map_err(|_| {
                WebError::Internal("database connection mutex poisoned".to_string())
            })?;
            f(&state, &conn)
        })
        .await
        .map_err(|err| WebError::Internal(format!("store task failed: {err}")))?
    }

    /// Journal service over `conn`, configured with this state's search policy.
    pub fn journal<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> JournalService<SqliteTopicRepository<'conn>, SqliteEntryRepository<'conn>> {
        JournalService::with_connection(conn).with_search_case(self.search_case)
    }

    pub fn accounts<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> AccountService<SqliteAccountRepository<'conn>> {
        AccountService::with_connection(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::AppState;
    use crate::error::WebError;
    use learning_log_core::db::open_db_in_memory;
    use learning_log_core::SearchCase;

    fn state() -> AppState {
        AppState::new(open_db_in_memory().unwrap(), SearchCase::Insensitive)
    }

    #[tokio::test]
    async fn with_conn_returns_closure_result() {
        let state = state();
        let answer = state
            .with_conn(|state, conn| {
                assert_eq!(state.search_case(), SearchCase::Insensitive);
                conn.query_row("SELECT 40 + 2;", [], |row| row.get::<_, i64>(0))
                    .map_err(|err| WebError::Internal(err.to_string()))
            })
            .await
            .unwrap();
        assert_eq!(answer, 42);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn with_conn_propagates_closure_errors() {
        let state = state();
        let result = state
            .with_conn(|_, _| -> Result<(), WebError> { Err(WebError::NotFound) })
            .await;
        assert!(matches!(result, Err(WebError::NotFound)));
    }
}
