use anyhow::{Context, Result};
use std::path::Path;

use orbit::config::OrbitConfig;
use orbit::relationship::transfer::{import_data, ExportData};

/// Import records from a JSON file produced by `orbit export`.
///
/// Skips records whose ID already exists. Imported rows are re-scoped to the
/// configured owner.
pub fn import(config: &OrbitConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let data: ExportData = serde_json::from_str(&json).context("failed to parse import JSON")?;

    let mut conn = orbit::db::open_database(config.resolved_db_path())?;

    println!(
        "Importing {} contacts, {} conversations, and {} opportunities...",
        data.contacts.len(),
        data.conversations.len(),
        data.opportunities.len()
    );

    let summary = import_data(&mut conn, &config.storage.owner, &data)?;

    println!("Import complete:");
    println!("  Contacts imported:       {}", summary.contacts_imported);
    println!("  Contacts skipped:        {} (already exist)", summary.contacts_skipped);
    println!("  Conversations imported:  {}", summary.conversations_imported);
    println!("  Opportunities imported:  {}", summary.opportunities_imported);
    let orphans = summary.conversations_skipped + summary.opportunities_skipped;
    if orphans > 0 {
        println!("  Other records skipped:   {orphans} (existing or contact missing)");
    }

    Ok(())
}
