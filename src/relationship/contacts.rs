//! Contact storage and attention-aware reads.
//!
//! Every query is scoped to an owner id. Reads return [`ContactView`]s whose
//! attention state is computed against the caller-supplied `now`.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;

use super::attention::{days_since, needs_attention};
use super::drift::effective_layer;
use super::rows::{fmt_date, fmt_ts, non_empty, opt_date, opt_ts, parsed, ts};
use super::types::{initials_for, Contact, ContactView, Frequency, Layer};

pub(crate) const CONTACT_COLUMNS: &str = "id, owner_id, name, initials, layer, contact_frequency, \
     last_contact_at, email, phone, company, role, notes, tags, birthday, created_at, updated_at";

/// Fields accepted when creating a contact.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub initials: Option<String>,
    pub layer: Layer,
    pub contact_frequency: Frequency,
    #[serde(default)]
    pub last_contact_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

impl NewContact {
    pub fn new(name: impl Into<String>, layer: Layer, contact_frequency: Frequency) -> Self {
        Self {
            name: name.into(),
            initials: None,
            layer,
            contact_frequency,
            last_contact_at: None,
            email: None,
            phone: None,
            company: None,
            role: None,
            notes: None,
            tags: Vec::new(),
            birthday: None,
        }
    }
}

/// Partial update. `None` leaves a field untouched; for optional text
/// fields an empty string clears the stored value, and `Some(None)` clears
/// the birthday.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub initials: Option<String>,
    pub layer: Option<Layer>,
    pub contact_frequency: Option<Frequency>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub birthday: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContactFilter {
    pub layer: Option<Layer>,
    pub needs_attention: Option<bool>,
}

impl ContactFilter {
    pub fn needing_attention() -> Self {
        Self {
            layer: None,
            needs_attention: Some(true),
        }
    }
}

pub(crate) fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let frequency: String = row.get(5)?;
    let tags: String = row.get(12)?;
    Ok(Contact {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        initials: row.get(3)?,
        layer: parsed(row, 4)?,
        contact_frequency: Frequency::from_tag_lossy(&frequency),
        last_contact_at: opt_ts(row, 6)?,
        email: row.get(7)?,
        phone: row.get(8)?,
        company: row.get(9)?,
        role: row.get(10)?,
        notes: row.get(11)?,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        birthday: opt_date(row, 13)?,
        created_at: ts(row, 14)?,
        updated_at: ts(row, 15)?,
    })
}

/// Attach the derived attention state to a stored contact.
pub fn view_of(contact: Contact, now: DateTime<Utc>) -> ContactView {
    let attention = needs_attention(contact.last_contact_at, contact.contact_frequency, now);
    ContactView {
        effective_layer: effective_layer(contact.layer, attention),
        days_since_contact: contact.last_contact_at.map(|t| days_since(t, now)),
        needs_attention: attention,
        contact,
    }
}

/// Insert a new contact and return it.
pub fn create_contact(conn: &mut Connection, owner: &str, new: &NewContact) -> Result<Contact> {
    let name = new.name.trim();
    if name.is_empty() {
        bail!("contact name must not be empty");
    }

    let now = Utc::now().trunc_subsecs(6);
    let contact = Contact {
        id: uuid::Uuid::now_v7().to_string(),
        owner_id: owner.to_string(),
        name: name.to_string(),
        initials: non_empty(new.initials.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| initials_for(name)),
        layer: new.layer,
        contact_frequency: new.contact_frequency,
        last_contact_at: new.last_contact_at.map(|t| t.trunc_subsecs(6)),
        email: non_empty(new.email.as_deref()).map(str::to_string),
        phone: non_empty(new.phone.as_deref()).map(str::to_string),
        company: non_empty(new.company.as_deref()).map(str::to_string),
        role: non_empty(new.role.as_deref()).map(str::to_string),
        notes: non_empty(new.notes.as_deref()).map(str::to_string),
        tags: new.tags.clone(),
        birthday: new.birthday,
        created_at: now,
        updated_at: now,
    };

    let tx = conn.transaction()?;
    insert_contact(&tx, &contact)?;
    write_activity_log(&tx, owner, "create", "contact", &contact.id, None)?;
    tx.commit()?;

    tracing::info!(id = %contact.id, layer = %contact.layer, "contact created");
    Ok(contact)
}

/// Insert a fully formed contact row. Used by create and import.
pub(crate) fn insert_contact(conn: &Connection, contact: &Contact) -> Result<()> {
    conn.execute(
        &format!("INSERT INTO contacts ({CONTACT_COLUMNS}) \
                  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"),
        params![
            contact.id,
            contact.owner_id,
            contact.name,
            contact.initials,
            contact.layer.as_str(),
            contact.contact_frequency.as_str(),
            contact.last_contact_at.map(fmt_ts),
            contact.email,
            contact.phone,
            contact.company,
            contact.role,
            contact.notes,
            serde_json::to_string(&contact.tags)?,
            contact.birthday.map(fmt_date),
            fmt_ts(contact.created_at),
            fmt_ts(contact.updated_at),
        ],
    )?;
    Ok(())
}

/// Fetch the stored contact, or `None` if it does not exist for this owner.
pub fn find_contact(conn: &Connection, owner: &str, id: &str) -> Result<Option<Contact>> {
    let contact = conn
        .query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND owner_id = ?2"),
            params![id, owner],
            contact_from_row,
        )
        .optional()?;
    Ok(contact)
}

pub fn get_contact(
    conn: &Connection,
    owner: &str,
    id: &str,
    now: DateTime<Utc>,
) -> Result<ContactView> {
    let contact = find_contact(conn, owner, id)?
        .with_context(|| format!("contact not found: {id}"))?;
    Ok(view_of(contact, now))
}

/// List contacts, alphabetically, or most overdue first when filtering on
/// attention.
pub fn list_contacts(
    conn: &Connection,
    owner: &str,
    filter: ContactFilter,
    now: DateTime<Utc>,
) -> Result<Vec<ContactView>> {
    let mut stmt = match filter.layer {
        Some(_) => conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE owner_id = ?1 AND layer = ?2 \
             ORDER BY name COLLATE NOCASE"
        ))?,
        None => conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE owner_id = ?1 \
             ORDER BY name COLLATE NOCASE"
        ))?,
    };

    let contacts: Vec<Contact> = match filter.layer {
        Some(layer) => stmt
            .query_map(params![owner, layer.as_str()], contact_from_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt
            .query_map(params![owner], contact_from_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };

    let mut views: Vec<ContactView> = contacts
        .into_iter()
        .map(|c| view_of(c, now))
        .filter(|v| filter.needs_attention.map_or(true, |want| v.needs_attention == want))
        .collect();

    if filter.needs_attention == Some(true) {
        // Never-contacted first, then longest silence.
        views.sort_by_key(|v| std::cmp::Reverse(v.days_since_contact.unwrap_or(i64::MAX)));
    }

    Ok(views)
}

/// Contacts that need attention right now, most overdue first.
pub fn contacts_needing_attention(
    conn: &Connection,
    owner: &str,
    now: DateTime<Utc>,
) -> Result<Vec<ContactView>> {
    list_contacts(conn, owner, ContactFilter::needing_attention(), now)
}

/// Apply a partial update and return the stored result.
pub fn update_contact(
    conn: &mut Connection,
    owner: &str,
    id: &str,
    patch: &ContactPatch,
) -> Result<Contact> {
    let tx = conn.transaction()?;
    let mut contact = find_contact(&tx, owner, id)?
        .with_context(|| format!("contact not found: {id}"))?;

    if let Some(name) = &patch.name {
        let name = name.trim();
        if name.is_empty() {
            bail!("contact name must not be empty");
        }
        contact.name = name.to_string();
        if patch.initials.is_none() {
            contact.initials = initials_for(name);
        }
    }
    if let Some(initials) = non_empty(patch.initials.as_deref()) {
        contact.initials = initials.to_string();
    }
    if let Some(layer) = patch.layer {
        contact.layer = layer;
    }
    if let Some(frequency) = patch.contact_frequency {
        contact.contact_frequency = frequency;
    }
    let text_fields = [
        (&patch.email, &mut contact.email),
        (&patch.phone, &mut contact.phone),
        (&patch.company, &mut contact.company),
        (&patch.role, &mut contact.role),
        (&patch.notes, &mut contact.notes),
    ];
    for (incoming, stored) in text_fields {
        if let Some(value) = incoming {
            *stored = non_empty(Some(value.as_str())).map(str::to_string);
        }
    }
    if let Some(tags) = &patch.tags {
        contact.tags = tags.clone();
    }
    if let Some(birthday) = patch.birthday {
        contact.birthday = birthday;
    }
    contact.updated_at = Utc::now().trunc_subsecs(6);

    tx.execute(
        "UPDATE contacts SET name = ?1, initials = ?2, layer = ?3, contact_frequency = ?4, \
         email = ?5, phone = ?6, company = ?7, role = ?8, notes = ?9, tags = ?10, \
         birthday = ?11, updated_at = ?12 WHERE id = ?13 AND owner_id = ?14",
        params![
            contact.name,
            contact.initials,
            contact.layer.as_str(),
            contact.contact_frequency.as_str(),
            contact.email,
            contact.phone,
            contact.company,
            contact.role,
            contact.notes,
            serde_json::to_string(&contact.tags)?,
            contact.birthday.map(fmt_date),
            fmt_ts(contact.updated_at),
            id,
            owner,
        ],
    )?;
    write_activity_log(&tx, owner, "update", "contact", id, None)?;
    tx.commit()?;

    Ok(contact)
}

/// Delete a contact. Conversations and opportunities go with it.
pub fn delete_contact(conn: &mut Connection, owner: &str, id: &str) -> Result<()> {
    let tx = conn.transaction()?;
    let rows = tx.execute(
        "DELETE FROM contacts WHERE id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    if rows == 0 {
        bail!("contact not found: {id}");
    }
    write_activity_log(&tx, owner, "delete", "contact", id, None)?;
    tx.commit()?;

    tracing::info!(id, "contact deleted");
    Ok(())
}

/// Move `last_contact_at` forward to `at`. Earlier timestamps are ignored.
/// Returns whether the stored value changed.
pub(crate) fn touch_last_contact(
    conn: &Connection,
    owner: &str,
    id: &str,
    at: DateTime<Utc>,
) -> Result<bool> {
    let at = fmt_ts(at);
    let rows = conn.execute(
        "UPDATE contacts SET last_contact_at = ?1, updated_at = ?2 \
         WHERE id = ?3 AND owner_id = ?4 AND (last_contact_at IS NULL OR last_contact_at < ?1)",
        params![at, fmt_ts(Utc::now()), id, owner],
    )?;
    Ok(rows > 0)
}

/// Write an entry to the activity_log audit table.
pub(crate) fn write_activity_log(
    conn: &Connection,
    owner: &str,
    operation: &str,
    entity: &str,
    entity_id: &str,
    details: Option<&serde_json::Value>,
) -> Result<()> {
    let details_json = details.map(|d| d.to_string());
    conn.execute(
        "INSERT INTO activity_log (owner_id, operation, entity, entity_id, details, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![owner, operation, entity, entity_id, details_json, fmt_ts(Utc::now())],
    )?;
    Ok(())
}
