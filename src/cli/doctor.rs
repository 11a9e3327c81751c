//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use orbit::config::OrbitConfig;
use orbit::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &OrbitConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `orbit contact add` or `orbit serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Orbit Health Report");
    println!("===================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("Owner:             {}", config.storage.owner);
    println!();
    println!("AI:");
    println!("  Endpoint:        {}", config.ai.base_url);
    println!("  Model:           {}", config.ai.model);
    println!(
        "  API key:         {}",
        if config.ai.api_key.is_some() { "set" } else { "not set (ORBIT_AI_API_KEY)" }
    );
    println!();
    println!("Row counts (all owners):");
    println!("  Contacts:        {}", report.contact_count);
    println!("  Conversations:   {}", report.conversation_count);
    println!("  Opportunities:   {}", report.opportunity_count);
    println!("  Activity log:    {}", report.log_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.orbit/orbit.db");
        println!("  2. Or export from a good copy and reimport:");
        println!("     orbit export > backup.json");
        println!("     ORBIT_DB=/tmp/fresh.db orbit import backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
