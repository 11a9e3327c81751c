use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, ToSql};
use serde::Serialize;
use std::collections::BTreeMap;

use super::contacts::{list_contacts, ContactFilter};
use super::rows::{fmt_date, fmt_ts};
use super::types::Layer;

/// Dashboard counts for one owner.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_contacts: u64,
    pub by_layer: BTreeMap<String, u64>,
    pub needing_attention: u64,
    pub never_contacted: u64,
    pub open_opportunities: u64,
    pub overdue_opportunities: u64,
    pub completed_opportunities: u64,
    pub conversations_last_30_days: u64,
}

/// Compute dashboard statistics as of `now`.
pub fn dashboard_stats(conn: &Connection, owner: &str, now: DateTime<Utc>) -> Result<DashboardStats> {
    let contacts = list_contacts(conn, owner, ContactFilter::default(), now)?;

    let mut by_layer: BTreeMap<String, u64> =
        Layer::ALL.iter().map(|l| (l.as_str().to_string(), 0)).collect();
    for view in &contacts {
        *by_layer.entry(view.contact.layer.as_str().to_string()).or_default() += 1;
    }

    let count = |sql: &str, args: &[&dyn ToSql]| -> Result<u64> {
        let n: i64 = conn.query_row(sql, args, |row| row.get(0))?;
        Ok(n as u64)
    };

    let today = fmt_date(now.date_naive());
    let month_ago = fmt_ts(now - Duration::days(30));

    Ok(DashboardStats {
        total_contacts: contacts.len() as u64,
        by_layer,
        needing_attention: contacts.iter().filter(|v| v.needs_attention).count() as u64,
        never_contacted: contacts
            .iter()
            .filter(|v| v.contact.last_contact_at.is_none())
            .count() as u64,
        open_opportunities: count(
            "SELECT COUNT(*) FROM opportunities WHERE owner_id = ?1 AND completed_at IS NULL",
            &[&owner],
        )?,
        overdue_opportunities: count(
            "SELECT COUNT(*) FROM opportunities \
             WHERE owner_id = ?1 AND completed_at IS NULL AND due_date < ?2",
            &[&owner, &today],
        )?,
        completed_opportunities: count(
            "SELECT COUNT(*) FROM opportunities WHERE owner_id = ?1 AND completed_at IS NOT NULL",
            &[&owner],
        )?,
        conversations_last_30_days: count(
            "SELECT COUNT(*) FROM conversations WHERE owner_id = ?1 AND occurred_at >= ?2",
            &[&owner, &month_ago],
        )?,
    })
}
