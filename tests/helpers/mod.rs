#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use orbit::db;
use orbit::relationship::contacts::{create_contact, NewContact};
use orbit::relationship::conversations::{log_conversation, NewConversation};
use orbit::relationship::types::{Contact, ConversationKind, Frequency, Layer};
use rusqlite::Connection;

pub const OWNER: &str = "me";

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&mut conn).unwrap();
    conn
}

/// Insert a contact for [`OWNER`] and return it.
pub fn contact(conn: &mut Connection, name: &str, layer: Layer, frequency: Frequency) -> Contact {
    create_contact(conn, OWNER, &NewContact::new(name, layer, frequency)).unwrap()
}

/// Insert a contact whose last contact was `days_ago` days before now.
pub fn contact_last_seen(
    conn: &mut Connection,
    name: &str,
    layer: Layer,
    frequency: Frequency,
    days_ago: i64,
) -> Contact {
    let new = NewContact {
        last_contact_at: Some(Utc::now() - Duration::days(days_ago)),
        ..NewContact::new(name, layer, frequency)
    };
    create_contact(conn, OWNER, &new).unwrap()
}

/// Log a call with `contact_id` at `at` (now when `None`).
pub fn call(conn: &mut Connection, contact_id: &str, at: Option<DateTime<Utc>>) {
    log_conversation(
        conn,
        OWNER,
        &NewConversation {
            contact_id: contact_id.to_string(),
            kind: ConversationKind::Call,
            content: "Quick catch-up".into(),
            summary: None,
            occurred_at: at,
        },
    )
    .unwrap();
}
