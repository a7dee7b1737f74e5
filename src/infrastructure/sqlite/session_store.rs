use crate::domain::entities::session::Session;
use crate::domain::entities::user::User;
use crate::domain::error::DomainError;
use crate::domain::ports::session_store::SessionStore;
use crate::infrastructure::sqlite::migrations::run_migrations;
use chrono::Utc;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

/// Keeps at most one session row, the CLI's equivalent of a browser's
/// stored token.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn new(conn: Connection) -> Result<Self, DomainError> {
        run_migrations(&conn).map_err(DomainError::Database)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open(path: &str) -> Result<Self, DomainError> {
        let conn = Connection::open(path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        Self::new(conn)
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        Self::new(conn)
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self) -> Result<Option<Session>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let row: Option<(String, Option<String>)> = conn
            .query_row("SELECT token, user_json FROM sessions WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(row.map(|(token, user_json)| {
            let user = user_json.and_then(|json| match serde_json::from_str::<User>(&json) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("discarding unreadable stored user: {e}");
                    None
                }
            });
            Session::new(token, user)
        }))
    }

    fn save(&self, session: &Session) -> Result<(), DomainError> {
        let user_json = session
            .user
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DomainError::Parse(e.to_string()))?;
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO sessions (id, token, user_json, saved_at) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET token = excluded.token, user_json = excluded.user_json, saved_at = excluded.saved_at",
            params![session.token, user_json, Utc::now().to_rfc3339()],
        )
        .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.execute("DELETE FROM sessions", [])
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(())
    }
}
