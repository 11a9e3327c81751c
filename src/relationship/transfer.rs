//! JSON export and import of one owner's data.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::contacts::{
    insert_contact, list_contacts, touch_last_contact, write_activity_log, ContactFilter,
};
use super::conversations::{all_conversations, insert_conversation};
use super::opportunities::{insert_opportunity, list_opportunities, OpportunityFilter};
use super::types::{Contact, Conversation, Opportunity};

/// Export format. Import reads the same shape.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExportData {
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ImportSummary {
    pub contacts_imported: u64,
    pub contacts_skipped: u64,
    pub conversations_imported: u64,
    pub conversations_skipped: u64,
    pub opportunities_imported: u64,
    pub opportunities_skipped: u64,
}

pub fn export_data(conn: &Connection, owner: &str) -> Result<ExportData> {
    let now = chrono::Utc::now();
    let contacts = list_contacts(conn, owner, ContactFilter::default(), now)?
        .into_iter()
        .map(|v| v.contact)
        .collect();
    let opportunities = list_opportunities(
        conn,
        owner,
        &OpportunityFilter {
            include_completed: true,
            contact_id: None,
        },
    )?
    .into_iter()
    .map(|v| v.opportunity)
    .collect();

    Ok(ExportData {
        contacts,
        conversations: all_conversations(conn, owner)?,
        opportunities,
    })
}

fn exists(conn: &Connection, table: &str, id: &str) -> Result<bool> {
    let found = conn.query_row(
        &format!("SELECT COUNT(*) > 0 FROM {table} WHERE id = ?1"),
        params![id],
        |row| row.get(0),
    )?;
    Ok(found)
}

fn owns_contact(conn: &Connection, owner: &str, contact_id: &str) -> Result<bool> {
    let found = conn.query_row(
        "SELECT COUNT(*) > 0 FROM contacts WHERE id = ?1 AND owner_id = ?2",
        params![contact_id, owner],
        |row| row.get(0),
    )?;
    Ok(found)
}

/// Import records under `owner` in one transaction. Records whose id already
/// exists are skipped, as are conversations and opportunities whose contact
/// is missing. Each imported conversation moves its contact's
/// `last_contact_at` forward.
pub fn import_data(conn: &mut Connection, owner: &str, data: &ExportData) -> Result<ImportSummary> {
    let tx = conn.transaction()?;
    let mut summary = ImportSummary::default();
    let details = serde_json::json!({"source": "import"});

    for contact in &data.contacts {
        if exists(&tx, "contacts", &contact.id)? {
            summary.contacts_skipped += 1;
            continue;
        }
        let contact = Contact {
            owner_id: owner.to_string(),
            ..contact.clone()
        };
        insert_contact(&tx, &contact)?;
        write_activity_log(&tx, owner, "create", "contact", &contact.id, Some(&details))?;
        summary.contacts_imported += 1;
    }

    for conversation in &data.conversations {
        if exists(&tx, "conversations", &conversation.id)?
            || !owns_contact(&tx, owner, &conversation.contact_id)?
        {
            summary.conversations_skipped += 1;
            continue;
        }
        let conversation = Conversation {
            owner_id: owner.to_string(),
            ..conversation.clone()
        };
        insert_conversation(&tx, &conversation)?;
        touch_last_contact(&tx, owner, &conversation.contact_id, conversation.occurred_at)?;
        summary.conversations_imported += 1;
    }

    for opportunity in &data.opportunities {
        if exists(&tx, "opportunities", &opportunity.id)?
            || !owns_contact(&tx, owner, &opportunity.contact_id)?
        {
            summary.opportunities_skipped += 1;
            continue;
        }
        let opportunity = Opportunity {
            owner_id: owner.to_string(),
            ..opportunity.clone()
        };
        insert_opportunity(&tx, &opportunity)?;
        summary.opportunities_imported += 1;
    }

    tx.commit()?;
    tracing::info!(?summary, "import finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::relationship::contacts::{create_contact, NewContact};
    use crate::relationship::conversations::{log_conversation, NewConversation};
    use crate::relationship::types::{ConversationKind, Frequency, Layer};

    #[test]
    fn export_then_import_into_fresh_db() {
        let mut source = db::open_memory_database().unwrap();
        let ada = create_contact(
            &mut source,
            "me",
            &NewContact::new("Ada", Layer::Inner, Frequency::Weekly),
        )
        .unwrap();
        log_conversation(
            &mut source,
            "me",
            &NewConversation {
                contact_id: ada.id.clone(),
                kind: ConversationKind::Email,
                content: "Sent the notes".into(),
                summary: None,
                occurred_at: None,
            },
        )
        .unwrap();
        opportunities_fixture(&mut source, &ada.id);

        let data = export_data(&source, "me").unwrap();
        assert_eq!(data.contacts.len(), 1);
        assert_eq!(data.conversations.len(), 1);
        assert_eq!(data.opportunities.len(), 1);

        let json = serde_json::to_string(&data).unwrap();
        let parsed: ExportData = serde_json::from_str(&json).unwrap();

        let mut target = db::open_memory_database().unwrap();
        let summary = import_data(&mut target, "alex", &parsed).unwrap();
        assert_eq!(summary.contacts_imported, 1);
        assert_eq!(summary.conversations_imported, 1);
        assert_eq!(summary.opportunities_imported, 1);

        let imported = export_data(&target, "alex").unwrap();
        assert_eq!(imported.contacts[0].name, "Ada");
        assert_eq!(imported.contacts[0].owner_id, "alex");
        assert_eq!(imported.contacts[0].last_contact_at, ada_last_contact(&source, &ada.id));

        let again = import_data(&mut target, "alex", &parsed).unwrap();
        assert_eq!(again.contacts_skipped, 1);
        assert_eq!(again.conversations_skipped, 1);
        assert_eq!(again.opportunities_skipped, 1);
    }

    #[test]
    fn orphans_are_skipped() {
        let mut source = db::open_memory_database().unwrap();
        let ada = create_contact(
            &mut source,
            "me",
            &NewContact::new("Ada", Layer::Inner, Frequency::Weekly),
        )
        .unwrap();
        opportunities_fixture(&mut source, &ada.id);
        let mut data = export_data(&source, "me").unwrap();
        data.contacts.clear();

        let mut target = db::open_memory_database().unwrap();
        let summary = import_data(&mut target, "me", &data).unwrap();
        assert_eq!(summary.opportunities_skipped, 1);
        assert_eq!(summary.opportunities_imported, 0);
    }

    #[test]
    fn imported_conversations_move_last_contact_forward() {
        let mut source = db::open_memory_database().unwrap();
        let ada = create_contact(
            &mut source,
            "me",
            &NewContact::new("Ada", Layer::Inner, Frequency::Weekly),
        )
        .unwrap();
        log_conversation(
            &mut source,
            "me",
            &NewConversation {
                contact_id: ada.id.clone(),
                kind: ConversationKind::Call,
                content: "Caught up".into(),
                summary: None,
                occurred_at: None,
            },
        )
        .unwrap();
        let mut data = export_data(&source, "me").unwrap();
        // Stale contact record exported alongside a newer conversation.
        data.contacts[0].last_contact_at = None;
        let occurred_at = data.conversations[0].occurred_at;

        let mut target = db::open_memory_database().unwrap();
        import_data(&mut target, "me", &data).unwrap();

        let view = crate::relationship::contacts::get_contact(&target, "me", &ada.id, chrono::Utc::now())
            .unwrap();
        assert_eq!(view.contact.last_contact_at, Some(occurred_at));
        assert!(!view.needs_attention);
    }

    fn opportunities_fixture(conn: &mut Connection, contact_id: &str) {
        use crate::relationship::opportunities::{create_opportunity, NewOpportunity};
        use crate::relationship::types::OpportunityKind;
        create_opportunity(
            conn,
            "me",
            &NewOpportunity {
                contact_id: contact_id.to_string(),
                kind: OpportunityKind::FollowUp,
                title: "Share the paper".into(),
                description: None,
                due_date: None,
                priority: None,
                suggested_message: None,
            },
        )
        .unwrap();
    }

    fn ada_last_contact(conn: &Connection, id: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        crate::relationship::contacts::find_contact(conn, "me", id)
            .unwrap()
            .unwrap()
            .last_contact_at
    }
}
