use anyhow::Result;

use orbit::config::OrbitConfig;
use orbit::relationship::conversations::{log_conversation, NewConversation};

/// Log a conversation from the terminal.
pub fn log(config: &OrbitConfig, new: &NewConversation) -> Result<()> {
    let mut conn = orbit::db::open_database(config.resolved_db_path())?;
    let result = log_conversation(&mut conn, &config.storage.owner, new)?;

    let conv = &result.conversation;
    println!("Logged {} ({})", conv.kind, conv.id);
    println!("  Occurred at:  {}", conv.occurred_at.format("%Y-%m-%d %H:%M UTC"));
    if !result.contact_touched {
        println!("  Note: older than the contact's last contact; last contact unchanged.");
    }
    Ok(())
}
