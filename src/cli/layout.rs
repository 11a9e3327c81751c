use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;

use orbit::config::OrbitConfig;
use orbit::relationship::contacts::{list_contacts, ContactFilter};
use orbit::relationship::layout_contacts;

/// Print the relationship map, ring by ring.
pub fn layout(config: &OrbitConfig, drifting_only: bool, json: bool) -> Result<()> {
    let conn = orbit::db::open_database(config.resolved_db_path())?;
    let views = list_contacts(&conn, &config.storage.owner, ContactFilter::default(), Utc::now())?;
    let mut nodes = layout_contacts(&views, &config.layout.geometry());
    if drifting_only {
        nodes.retain(|n| n.drifting);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    let names: HashMap<&str, &str> = views
        .iter()
        .map(|v| (v.contact.id.as_str(), v.contact.name.as_str()))
        .collect();

    nodes.sort_by(|a, b| {
        a.effective_layer
            .cmp(&b.effective_layer)
            .then(a.radius.total_cmp(&b.radius))
    });

    println!("Relationship Map");
    println!("{}", "=".repeat(40));
    let mut current = None;
    for node in &nodes {
        if current != Some(node.effective_layer) {
            current = Some(node.effective_layer);
            println!();
            println!("{}:", node.effective_layer);
        }
        let name = names.get(node.contact_id.as_str()).copied().unwrap_or("?");
        let drift = if node.drifting {
            format!("  (drifting from {})", node.nominal_layer)
        } else {
            String::new()
        };
        println!(
            "  {:<24} r={:>6.1} angle={:>5.1}deg  ({:>7.1}, {:>7.1}){drift}",
            name,
            node.radius,
            node.angle.to_degrees(),
            node.x,
            node.y
        );
    }
    Ok(())
}
