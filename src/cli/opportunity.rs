//! CLI `opportunity` commands.

use anyhow::{bail, Result};
use chrono::Utc;

use orbit::ai::functions::{generate_message, GenerateMessageRequest};
use orbit::ai::ChatClient;
use orbit::config::OrbitConfig;
use orbit::relationship::opportunities::{self, NewOpportunity, OpportunityFilter};

use super::preview;

pub fn add(config: &OrbitConfig, new: &NewOpportunity) -> Result<()> {
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    let o = opportunities::create_opportunity(&mut conn, &config.storage.owner, new)?;
    println!("Added {} opportunity \"{}\" ({})", o.kind, o.title, o.id);
    println!("  Priority:  {}", o.priority);
    if let Some(due) = o.due_date {
        println!("  Due:       {due}");
    }
    Ok(())
}

pub fn list(config: &OrbitConfig, include_completed: bool, contact_id: Option<String>) -> Result<()> {
    let conn = orbit::db::open_database(config.resolved_db_path())?;
    let filter = OpportunityFilter {
        include_completed,
        contact_id,
    };
    let views = opportunities::list_opportunities(&conn, &config.storage.owner, &filter)?;

    if views.is_empty() {
        println!("No opportunities.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    for v in &views {
        let o = &v.opportunity;
        let due = match o.due_date {
            Some(d) if o.is_open() && d < today => format!("due {d} (overdue)"),
            Some(d) => format!("due {d}"),
            None => "no due date".into(),
        };
        let state = if o.is_open() { "open" } else { "done" };
        println!(
            "[{state}] {} {:<6} {} -- {} ({}, {due})",
            o.id, o.priority.as_str(), o.title, v.contact_name, o.kind
        );
        if let Some(ref msg) = o.suggested_message {
            println!("         suggested: {}", preview(msg, 100));
        }
    }
    Ok(())
}

pub fn complete(config: &OrbitConfig, id: &str) -> Result<()> {
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    let o = opportunities::complete_opportunity(&mut conn, &config.storage.owner, id, Utc::now())?;
    println!("Completed \"{}\"", o.title);
    Ok(())
}

pub fn remove(config: &OrbitConfig, id: &str) -> Result<()> {
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    opportunities::delete_opportunity(&mut conn, &config.storage.owner, id)?;
    println!("Removed opportunity {id}");
    Ok(())
}

pub fn seed(config: &OrbitConfig, lookahead_days: Option<i64>) -> Result<()> {
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    let lookahead = lookahead_days.unwrap_or(config.opportunities.birthday_lookahead_days);
    let result =
        opportunities::seed_opportunities(&mut conn, &config.storage.owner, Utc::now(), lookahead)?;

    println!("Seeding complete:");
    println!("  Check-ins created:  {}", result.check_ins);
    println!("  Birthdays created:  {}", result.birthdays);
    for o in &result.created {
        println!("    {} {}", o.id, o.title);
    }
    Ok(())
}

/// Draft a message with the configured AI model and optionally save it.
pub async fn draft(config: &OrbitConfig, id: &str, save: bool) -> Result<()> {
    let client = ChatClient::from_config(&config.ai)?;
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    let owner = &config.storage.owner;

    let view = opportunities::get_opportunity(&conn, owner, id)?;
    if !view.opportunity.is_open() {
        bail!("opportunity {id} is already completed");
    }

    let drafted = generate_message(
        &client,
        &GenerateMessageRequest {
            contact_name: view.contact_name.clone(),
            contact_layer: view.contact_layer,
            opportunity_type: view.opportunity.kind.as_str().to_string(),
            title: view.opportunity.title.clone(),
            description: view.opportunity.description.clone(),
        },
    )
    .await?;

    println!("{}", drafted.message);

    if save {
        opportunities::set_suggested_message(&mut conn, owner, id, &drafted.message)?;
        eprintln!("Saved as the suggested message for {id}.");
    }
    Ok(())
}
