//! SQL DDL for all Orbit tables.
//!
//! Defines the `contacts`, `conversations`, `opportunities`, `activity_log`,
//! and `schema_meta` tables at schema version 1. All DDL uses `IF NOT EXISTS`
//! for idempotent initialization; later versions are applied by
//! [`super::migrations`].

use rusqlite::Connection;

/// All schema DDL statements for Orbit's core tables.
const SCHEMA_SQL: &str = r#"
-- People in the owner's orbit
CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    name TEXT NOT NULL,
    initials TEXT NOT NULL,
    layer TEXT NOT NULL DEFAULT 'regular'
        CHECK(layer IN ('vip','inner','regular','occasional','distant')),
    contact_frequency TEXT NOT NULL DEFAULT 'monthly',
    last_contact_at TEXT,
    email TEXT,
    phone TEXT,
    company TEXT,
    role TEXT,
    notes TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    birthday TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_contacts_owner ON contacts(owner_id);
CREATE INDEX IF NOT EXISTS idx_contacts_layer ON contacts(owner_id, layer);

-- Logged interactions
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    type TEXT NOT NULL CHECK(type IN ('call','meeting','email','note','other')),
    content TEXT NOT NULL,
    occurred_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversations_contact ON conversations(contact_id, occurred_at);

-- Follow-up tasks
CREATE TABLE IF NOT EXISTS opportunities (
    id TEXT PRIMARY KEY,
    owner_id TEXT NOT NULL,
    contact_id TEXT NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
    type TEXT NOT NULL
        CHECK(type IN ('check_in','follow_up','birthday','introduction','custom')),
    title TEXT NOT NULL,
    description TEXT,
    due_date TEXT,
    priority TEXT NOT NULL DEFAULT 'medium' CHECK(priority IN ('low','medium','high')),
    suggested_message TEXT,
    completed_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_opportunities_contact ON opportunities(contact_id);
CREATE INDEX IF NOT EXISTS idx_opportunities_open ON opportunities(owner_id, completed_at);

-- Audit log
CREATE TABLE IF NOT EXISTS activity_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id TEXT NOT NULL,
    operation TEXT NOT NULL CHECK(operation IN ('create','update','complete','delete')),
    entity TEXT NOT NULL CHECK(entity IN ('contact','conversation','opportunity')),
    entity_id TEXT NOT NULL,
    details TEXT,
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for expected in ["contacts", "conversations", "opportunities", "activity_log", "schema_meta"] {
            assert!(tables.contains(&expected.to_string()), "missing table {expected}");
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap(); // second call should not error
    }

    #[test]
    fn layer_check_constraint_rejects_unknown_layer() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO contacts (id, owner_id, name, initials, layer, created_at, updated_at) \
             VALUES ('c1', 'me', 'X', 'X', 'orbit', 'now', 'now')",
            [],
        );
        assert!(result.is_err());
    }
}
