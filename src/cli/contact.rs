//! CLI `contact` commands: add, list, show, edit, remove.

use anyhow::Result;
use chrono::Utc;

use orbit::config::OrbitConfig;
use orbit::relationship::contacts::{self, ContactFilter, ContactPatch, NewContact};
use orbit::relationship::conversations::list_conversations;
use orbit::relationship::opportunities::{list_opportunities, OpportunityFilter};
use orbit::relationship::types::Layer;

use super::{last_contact_label, preview};

pub fn add(config: &OrbitConfig, new: NewContact) -> Result<()> {
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    let contact = contacts::create_contact(&mut conn, &config.storage.owner, &new)?;

    println!("Added {} ({})", contact.name, contact.initials);
    println!("  ID:         {}", contact.id);
    println!("  Layer:      {}", contact.layer);
    println!(
        "  Frequency:  {} ({} days)",
        contact.contact_frequency,
        contact.contact_frequency.target_days()
    );
    Ok(())
}

pub fn list(config: &OrbitConfig, layer: Option<Layer>, attention_only: bool) -> Result<()> {
    let conn = orbit::db::open_database(config.resolved_db_path())?;
    let filter = ContactFilter {
        layer,
        needs_attention: attention_only.then_some(true),
    };
    let views = contacts::list_contacts(&conn, &config.storage.owner, filter, Utc::now())?;

    if views.is_empty() {
        println!("No contacts.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<24} {:<11} {:<10} {:<14} {}",
        "ID", "NAME", "LAYER", "FREQ", "LAST CONTACT", ""
    );
    for view in &views {
        let c = &view.contact;
        let flag = if view.needs_attention {
            format!("needs attention (shown in {})", view.effective_layer)
        } else {
            String::new()
        };
        println!(
            "{:<36}  {:<24} {:<11} {:<10} {:<14} {}",
            c.id,
            preview(&c.name, 24),
            c.layer.as_str(),
            c.contact_frequency.as_str(),
            last_contact_label(view),
            flag
        );
    }
    println!();
    println!("{} contact(s)", views.len());
    Ok(())
}

pub fn show(config: &OrbitConfig, id: &str) -> Result<()> {
    let conn = orbit::db::open_database(config.resolved_db_path())?;
    let owner = &config.storage.owner;
    let view = contacts::get_contact(&conn, owner, id, Utc::now())?;
    let c = &view.contact;

    println!("{} ({})", c.name, c.initials);
    println!("{}", "=".repeat(50));
    println!("  ID:              {}", c.id);
    println!("  Layer:           {}", c.layer);
    if view.effective_layer != c.layer {
        println!("  Drifted to:      {}", view.effective_layer);
    }
    println!(
        "  Frequency:       {} ({} days)",
        c.contact_frequency,
        c.contact_frequency.target_days()
    );
    println!("  Last contact:    {}", last_contact_label(&view));
    println!(
        "  Needs attention: {}",
        if view.needs_attention { "yes" } else { "no" }
    );
    for (label, value) in [
        ("Email", &c.email),
        ("Phone", &c.phone),
        ("Company", &c.company),
        ("Role", &c.role),
    ] {
        if let Some(v) = value {
            println!("  {:<17}{v}", format!("{label}:"));
        }
    }
    if let Some(birthday) = c.birthday {
        println!("  Birthday:        {birthday}");
    }
    if !c.tags.is_empty() {
        println!("  Tags:            {}", c.tags.join(", "));
    }
    if let Some(ref notes) = c.notes {
        println!();
        println!("Notes:");
        println!("  {notes}");
    }

    let conversations = list_conversations(&conn, owner, id)?;
    if !conversations.is_empty() {
        println!();
        println!("Conversations:");
        for conv in conversations.iter().take(10) {
            let text = conv.summary.as_deref().unwrap_or(&conv.content);
            println!(
                "  {} [{}] {}",
                conv.occurred_at.format("%Y-%m-%d"),
                conv.kind,
                preview(text, 80)
            );
        }
        if conversations.len() > 10 {
            println!("  ... and {} more", conversations.len() - 10);
        }
    }

    let open = list_opportunities(
        &conn,
        owner,
        &OpportunityFilter {
            include_completed: false,
            contact_id: Some(id.to_string()),
        },
    )?;
    if !open.is_empty() {
        println!();
        println!("Open opportunities:");
        for o in &open {
            let due = o
                .opportunity
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into());
            println!("  {} {} ({}, due {due})", o.opportunity.id, o.opportunity.title, o.opportunity.kind);
        }
    }

    Ok(())
}

pub fn edit(config: &OrbitConfig, id: &str, patch: &ContactPatch) -> Result<()> {
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    let contact = contacts::update_contact(&mut conn, &config.storage.owner, id, patch)?;
    println!("Updated {} ({})", contact.name, contact.id);
    Ok(())
}

pub fn remove(config: &OrbitConfig, id: &str, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("removing a contact also deletes its conversations and opportunities; pass --yes to confirm");
    }
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    contacts::delete_contact(&mut conn, &config.storage.owner, id)?;
    println!("Removed contact {id}");
    Ok(())
}
