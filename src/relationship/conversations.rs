//! Conversation logging.
//!
//! Logging a conversation and advancing the contact's `last_contact_at`
//! happen in one transaction, so a contact's attention state never lags a
//! conversation that was recorded.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::contacts::{find_contact, touch_last_contact, write_activity_log};
use super::rows::{fmt_ts, non_empty, parsed, ts};
use super::types::{Conversation, ConversationKind};

const CONVERSATION_COLUMNS: &str =
    "id, owner_id, contact_id, type, content, summary, occurred_at, created_at";

#[derive(Debug, Clone, Deserialize)]
pub struct NewConversation {
    pub contact_id: String,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// Defaults to the time of logging.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Result returned from [`log_conversation`].
#[derive(Debug, Serialize)]
pub struct LogConversationResult {
    pub conversation: Conversation,
    /// `false` when the conversation is older than the contact's last contact.
    pub contact_touched: bool,
}

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        contact_id: row.get(2)?,
        kind: parsed(row, 3)?,
        content: row.get(4)?,
        summary: row.get(5)?,
        occurred_at: ts(row, 6)?,
        created_at: ts(row, 7)?,
    })
}

/// Record a conversation and advance the contact's last-contact time.
pub fn log_conversation(
    conn: &mut Connection,
    owner: &str,
    new: &NewConversation,
) -> Result<LogConversationResult> {
    let tx = conn.transaction()?;

    if find_contact(&tx, owner, &new.contact_id)?.is_none() {
        bail!("contact not found: {}", new.contact_id);
    }

    let now = Utc::now().trunc_subsecs(6);
    let conversation = Conversation {
        id: uuid::Uuid::now_v7().to_string(),
        owner_id: owner.to_string(),
        contact_id: new.contact_id.clone(),
        kind: new.kind,
        content: new.content.clone(),
        summary: non_empty(new.summary.as_deref()).map(str::to_string),
        occurred_at: new.occurred_at.map_or(now, |t| t.trunc_subsecs(6)),
        created_at: now,
    };

    insert_conversation(&tx, &conversation)?;
    let contact_touched =
        touch_last_contact(&tx, owner, &conversation.contact_id, conversation.occurred_at)?;
    write_activity_log(
        &tx,
        owner,
        "create",
        "conversation",
        &conversation.id,
        Some(&serde_json::json!({"contact_id": conversation.contact_id})),
    )?;

    tx.commit()?;

    tracing::info!(
        id = %conversation.id,
        contact_id = %conversation.contact_id,
        kind = %conversation.kind,
        contact_touched,
        "conversation logged"
    );

    Ok(LogConversationResult {
        conversation,
        contact_touched,
    })
}

pub(crate) fn insert_conversation(conn: &Connection, conversation: &Conversation) -> Result<()> {
    conn.execute(
        &format!("INSERT INTO conversations ({CONVERSATION_COLUMNS}) \
                  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        params![
            conversation.id,
            conversation.owner_id,
            conversation.contact_id,
            conversation.kind.as_str(),
            conversation.content,
            conversation.summary,
            fmt_ts(conversation.occurred_at),
            fmt_ts(conversation.created_at),
        ],
    )?;
    Ok(())
}

/// Conversations with one contact, newest first.
pub fn list_conversations(
    conn: &Connection,
    owner: &str,
    contact_id: &str,
) -> Result<Vec<Conversation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations \
         WHERE owner_id = ?1 AND contact_id = ?2 ORDER BY occurred_at DESC"
    ))?;
    let conversations = stmt
        .query_map(params![owner, contact_id], conversation_from_row)?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to read conversations")?;
    Ok(conversations)
}

/// All of an owner's conversations, oldest first.
pub fn all_conversations(conn: &Connection, owner: &str) -> Result<Vec<Conversation>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE owner_id = ?1 ORDER BY occurred_at"
    ))?;
    let conversations = stmt
        .query_map(params![owner], conversation_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(conversations)
}

/// Delete a conversation. The contact's `last_contact_at` is left as is.
pub fn delete_conversation(conn: &mut Connection, owner: &str, id: &str) -> Result<()> {
    let tx = conn.transaction()?;
    let rows = tx.execute(
        "DELETE FROM conversations WHERE id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    if rows == 0 {
        bail!("conversation not found: {id}");
    }
    write_activity_log(&tx, owner, "delete", "conversation", id, None)?;
    tx.commit()?;
    Ok(())
}
