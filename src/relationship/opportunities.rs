//! Follow-up opportunities: storage, lifecycle, and seeding.
//!
//! An opportunity is open until it is completed (which stamps
//! `completed_at` and is final) or deleted. [`seed_opportunities`] creates
//! check-ins for contacts that need attention and reminders for upcoming
//! birthdays.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, SubsecRound, TimeDelta, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::contacts::{list_contacts, write_activity_log, ContactFilter};
use super::rows::{fmt_date, fmt_ts, non_empty, opt_date, opt_ts, parsed, ts};
use super::types::{ContactView, Layer, Opportunity, OpportunityKind, OpportunityView, Priority};

/// Largest accepted birthday lookahead for seeding.
pub const MAX_BIRTHDAY_LOOKAHEAD_DAYS: i64 = 366;

const OPPORTUNITY_COLUMNS: &str = "o.id, o.owner_id, o.contact_id, o.type, o.title, o.description, \
     o.due_date, o.priority, o.suggested_message, o.completed_at, o.created_at";

#[derive(Debug, Clone, Deserialize)]
pub struct NewOpportunity {
    pub contact_id: String,
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Defaults to the contact's layer priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub suggested_message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OpportunityFilter {
    pub include_completed: bool,
    pub contact_id: Option<String>,
}

/// Result returned from [`seed_opportunities`].
#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub created: Vec<Opportunity>,
    pub check_ins: usize,
    pub birthdays: usize,
}

fn opportunity_from_row(row: &Row<'_>) -> rusqlite::Result<Opportunity> {
    Ok(Opportunity {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        contact_id: row.get(2)?,
        kind: parsed(row, 3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        due_date: opt_date(row, 6)?,
        priority: parsed(row, 7)?,
        suggested_message: row.get(8)?,
        completed_at: opt_ts(row, 9)?,
        created_at: ts(row, 10)?,
    })
}

fn opportunity_view_from_row(row: &Row<'_>) -> rusqlite::Result<OpportunityView> {
    Ok(OpportunityView {
        opportunity: opportunity_from_row(row)?,
        contact_name: row.get(11)?,
        contact_layer: parsed(row, 12)?,
    })
}

/// Create an opportunity for one of the owner's contacts.
pub fn create_opportunity(
    conn: &mut Connection,
    owner: &str,
    new: &NewOpportunity,
) -> Result<Opportunity> {
    let tx = conn.transaction()?;
    let opportunity = create_in(&tx, owner, new)?;
    tx.commit()?;

    tracing::info!(id = %opportunity.id, kind = %opportunity.kind, "opportunity created");
    Ok(opportunity)
}

/// Validate, insert, and log one opportunity inside the caller's transaction.
fn create_in(conn: &Connection, owner: &str, new: &NewOpportunity) -> Result<Opportunity> {
    let title = new.title.trim();
    if title.is_empty() {
        bail!("opportunity title must not be empty");
    }

    let layer: Option<String> = conn
        .query_row(
            "SELECT layer FROM contacts WHERE id = ?1 AND owner_id = ?2",
            params![new.contact_id, owner],
            |row| row.get(0),
        )
        .optional()?;
    let Some(layer) = layer else {
        bail!("contact not found: {}", new.contact_id);
    };
    let layer: Layer = layer.parse().map_err(anyhow::Error::msg)?;

    let opportunity = Opportunity {
        id: uuid::Uuid::now_v7().to_string(),
        owner_id: owner.to_string(),
        contact_id: new.contact_id.clone(),
        kind: new.kind,
        title: title.to_string(),
        description: non_empty(new.description.as_deref()).map(str::to_string),
        due_date: new.due_date,
        priority: new.priority.unwrap_or_else(|| Priority::for_layer(layer)),
        suggested_message: non_empty(new.suggested_message.as_deref()).map(str::to_string),
        completed_at: None,
        created_at: Utc::now().trunc_subsecs(6),
    };
    insert_opportunity(conn, &opportunity)?;
    write_activity_log(conn, owner, "create", "opportunity", &opportunity.id, None)?;
    Ok(opportunity)
}

pub(crate) fn insert_opportunity(conn: &Connection, opportunity: &Opportunity) -> Result<()> {
    conn.execute(
        "INSERT INTO opportunities (id, owner_id, contact_id, type, title, description, due_date, \
         priority, suggested_message, completed_at, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            opportunity.id,
            opportunity.owner_id,
            opportunity.contact_id,
            opportunity.kind.as_str(),
            opportunity.title,
            opportunity.description,
            opportunity.due_date.map(fmt_date),
            opportunity.priority.as_str(),
            opportunity.suggested_message,
            opportunity.completed_at.map(fmt_ts),
            fmt_ts(opportunity.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_opportunity(conn: &Connection, owner: &str, id: &str) -> Result<OpportunityView> {
    conn.query_row(
        &format!(
            "SELECT {OPPORTUNITY_COLUMNS}, c.name, c.layer FROM opportunities o \
             JOIN contacts c ON c.id = o.contact_id \
             WHERE o.id = ?1 AND o.owner_id = ?2"
        ),
        params![id, owner],
        opportunity_view_from_row,
    )
    .optional()?
    .with_context(|| format!("opportunity not found: {id}"))
}

/// List opportunities joined with their contact, soonest due first.
pub fn list_opportunities(
    conn: &Connection,
    owner: &str,
    filter: &OpportunityFilter,
) -> Result<Vec<OpportunityView>> {
    let mut sql = format!(
        "SELECT {OPPORTUNITY_COLUMNS}, c.name, c.layer FROM opportunities o \
         JOIN contacts c ON c.id = o.contact_id WHERE o.owner_id = ?1"
    );
    if !filter.include_completed {
        sql.push_str(" AND o.completed_at IS NULL");
    }
    if filter.contact_id.is_some() {
        sql.push_str(" AND o.contact_id = ?2");
    }
    sql.push_str(" ORDER BY o.due_date IS NULL, o.due_date, o.created_at");

    let mut stmt = conn.prepare(&sql)?;
    let views = match &filter.contact_id {
        Some(contact_id) => stmt
            .query_map(params![owner, contact_id], opportunity_view_from_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => stmt
            .query_map(params![owner], opportunity_view_from_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(views)
}

/// Attach an AI-drafted (or hand-written) message to an open opportunity.
pub fn set_suggested_message(
    conn: &mut Connection,
    owner: &str,
    id: &str,
    message: &str,
) -> Result<()> {
    let tx = conn.transaction()?;
    let rows = tx.execute(
        "UPDATE opportunities SET suggested_message = ?1 \
         WHERE id = ?2 AND owner_id = ?3 AND completed_at IS NULL",
        params![non_empty(Some(message)), id, owner],
    )?;
    if rows == 0 {
        bail!("open opportunity not found: {id}");
    }
    write_activity_log(&tx, owner, "update", "opportunity", id, None)?;
    tx.commit()?;
    Ok(())
}

/// Mark an open opportunity completed.
pub fn complete_opportunity(
    conn: &mut Connection,
    owner: &str,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Opportunity> {
    let tx = conn.transaction()?;
    let completed_at: Option<Option<String>> = tx
        .query_row(
            "SELECT completed_at FROM opportunities WHERE id = ?1 AND owner_id = ?2",
            params![id, owner],
            |row| row.get(0),
        )
        .optional()?;
    match completed_at {
        None => bail!("opportunity not found: {id}"),
        Some(Some(at)) => bail!("opportunity {id} was already completed at {at}"),
        Some(None) => {}
    }

    tx.execute(
        "UPDATE opportunities SET completed_at = ?1 WHERE id = ?2 AND owner_id = ?3",
        params![fmt_ts(now.trunc_subsecs(6)), id, owner],
    )?;
    write_activity_log(&tx, owner, "complete", "opportunity", id, None)?;
    tx.commit()?;

    tracing::info!(id, "opportunity completed");
    Ok(get_opportunity(conn, owner, id)?.opportunity)
}

pub fn delete_opportunity(conn: &mut Connection, owner: &str, id: &str) -> Result<()> {
    let tx = conn.transaction()?;
    let rows = tx.execute(
        "DELETE FROM opportunities WHERE id = ?1 AND owner_id = ?2",
        params![id, owner],
    )?;
    if rows == 0 {
        bail!("opportunity not found: {id}");
    }
    write_activity_log(&tx, owner, "delete", "opportunity", id, None)?;
    tx.commit()?;
    Ok(())
}

/// The first occurrence of `birthday` on or after `today`. Feb 29 birthdays
/// fall on Mar 1 in common years.
pub fn next_birthday(birthday: NaiveDate, today: NaiveDate) -> NaiveDate {
    let in_year = |year: i32| {
        birthday
            .with_year(year)
            .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
            .unwrap_or(today)
    };
    let this_year = in_year(today.year());
    if this_year >= today {
        this_year
    } else {
        in_year(today.year() + 1)
    }
}

fn has_open(conn: &Connection, owner: &str, contact_id: &str, kind: OpportunityKind) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT COUNT(*) > 0 FROM opportunities \
         WHERE owner_id = ?1 AND contact_id = ?2 AND type = ?3 AND completed_at IS NULL",
        params![owner, contact_id, kind.as_str()],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn check_in_for(view: &ContactView, today: NaiveDate) -> NewOpportunity {
    let description = match view.days_since_contact {
        Some(days) => format!(
            "Last contact {days} days ago; aiming for {}.",
            view.contact.contact_frequency
        ),
        None => "No conversations logged yet.".to_string(),
    };
    NewOpportunity {
        contact_id: view.contact.id.clone(),
        kind: OpportunityKind::CheckIn,
        title: format!("Reconnect with {}", view.contact.name),
        description: Some(description),
        due_date: Some(today),
        priority: Some(Priority::for_layer(view.contact.layer)),
        suggested_message: None,
    }
}

/// Last date a birthday may fall on to be seeded from `today`.
fn birthday_horizon(today: NaiveDate, lookahead_days: i64) -> Result<NaiveDate> {
    if !(0..=MAX_BIRTHDAY_LOOKAHEAD_DAYS).contains(&lookahead_days) {
        bail!(
            "birthday lookahead must be between 0 and {MAX_BIRTHDAY_LOOKAHEAD_DAYS} days, got {lookahead_days}"
        );
    }
    TimeDelta::try_days(lookahead_days)
        .and_then(|delta| today.checked_add_signed(delta))
        .with_context(|| format!("birthday lookahead of {lookahead_days} days is out of range"))
}

/// Create check-ins for contacts needing attention and reminders for
/// birthdays within `birthday_lookahead_days`, all in one transaction.
/// Skips contacts that already have an open opportunity of the same kind.
pub fn seed_opportunities(
    conn: &mut Connection,
    owner: &str,
    now: DateTime<Utc>,
    birthday_lookahead_days: i64,
) -> Result<SeedResult> {
    let today = now.date_naive();
    let horizon = birthday_horizon(today, birthday_lookahead_days)?;

    let tx = conn.transaction()?;
    let contacts = list_contacts(&tx, owner, ContactFilter::default(), now)?;

    let mut pending = Vec::new();
    for view in &contacts {
        if view.needs_attention && !has_open(&tx, owner, &view.contact.id, OpportunityKind::CheckIn)? {
            pending.push(check_in_for(view, today));
        }
        if let Some(birthday) = view.contact.birthday {
            let next = next_birthday(birthday, today);
            if next <= horizon && !has_open(&tx, owner, &view.contact.id, OpportunityKind::Birthday)? {
                pending.push(NewOpportunity {
                    contact_id: view.contact.id.clone(),
                    kind: OpportunityKind::Birthday,
                    title: format!("Wish {} a happy birthday", view.contact.name),
                    description: None,
                    due_date: Some(next),
                    priority: Some(Priority::for_layer(view.contact.layer)),
                    suggested_message: None,
                });
            }
        }
    }

    let created = pending
        .iter()
        .map(|new| create_in(&tx, owner, new))
        .collect::<Result<Vec<_>>>()?;
    tx.commit()?;

    let birthdays = created
        .iter()
        .filter(|o| o.kind == OpportunityKind::Birthday)
        .count();
    let check_ins = created.len() - birthdays;
    tracing::info!(check_ins, birthdays, "opportunities seeded");

    Ok(SeedResult {
        created,
        check_ins,
        birthdays,
    })
}
