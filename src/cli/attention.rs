use anyhow::Result;
use chrono::Utc;

use orbit::config::OrbitConfig;
use orbit::relationship::contacts::contacts_needing_attention;

use super::last_contact_label;

/// List contacts that need attention, most overdue first.
pub fn attention(config: &OrbitConfig) -> Result<()> {
    let conn = orbit::db::open_database(config.resolved_db_path())?;
    let views = contacts_needing_attention(&conn, &config.storage.owner, Utc::now())?;

    if views.is_empty() {
        println!("Everyone is up to date.");
        return Ok(());
    }

    println!("Needs attention ({})", views.len());
    println!("{}", "=".repeat(40));
    for view in &views {
        let c = &view.contact;
        println!(
            "  {:<24} {:<11} -> {:<11} last contact {} (every {} days)",
            c.name,
            c.layer.as_str(),
            view.effective_layer.as_str(),
            last_contact_label(view),
            c.contact_frequency.target_days()
        );
    }
    println!();
    println!("Run `orbit opportunity seed` to create check-ins.");
    Ok(())
}
