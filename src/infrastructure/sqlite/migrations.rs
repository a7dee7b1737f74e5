use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            token TEXT NOT NULL,
            user_json TEXT,
            saved_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))
}
