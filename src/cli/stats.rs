use anyhow::Result;
use chrono::Utc;

use orbit::config::OrbitConfig;
use orbit::relationship::stats::dashboard_stats;
use orbit::relationship::types::Layer;

/// Display dashboard statistics in the terminal.
pub fn stats(config: &OrbitConfig) -> Result<()> {
    let conn = orbit::db::open_database(config.resolved_db_path())?;
    let response = dashboard_stats(&conn, &config.storage.owner, Utc::now())?;

    println!("Orbit Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total contacts:      {}", response.total_contacts);
    println!("  Needing attention:   {}", response.needing_attention);
    println!("  Never contacted:     {}", response.never_contacted);
    println!();

    println!("By Layer:");
    for layer in Layer::ALL {
        let count = response.by_layer.get(layer.as_str()).copied().unwrap_or(0);
        println!("  {:<12} {}", layer.as_str(), count);
    }
    println!();

    println!("Opportunities:");
    println!("  Open:                {}", response.open_opportunities);
    println!("  Overdue:             {}", response.overdue_opportunities);
    println!("  Completed:           {}", response.completed_opportunities);
    println!();
    println!("Conversations (30d):   {}", response.conversations_last_30_days);

    Ok(())
}
