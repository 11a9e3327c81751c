use anyhow::Result;

use orbit::config::OrbitConfig;
use orbit::relationship::transfer::export_data;

/// Export the owner's contacts, conversations, and opportunities as JSON to stdout.
pub fn export(config: &OrbitConfig) -> Result<()> {
    let conn = orbit::db::open_database(config.resolved_db_path())?;
    let data = export_data(&conn, &config.storage.owner)?;

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!(
        "Exported {} contacts, {} conversations, and {} opportunities.",
        data.contacts.len(),
        data.conversations.len(),
        data.opportunities.len()
    );

    Ok(())
}
