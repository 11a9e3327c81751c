use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogConversationParams {
    #[schemars(description = "ID of the contact the conversation was with")]
    pub contact_id: String,

    #[schemars(description = "Conversation type: 'call', 'meeting', 'email', 'note', 'other'")]
    pub r#type: String,

    #[schemars(description = "What was discussed")]
    pub content: String,

    #[schemars(description = "Optional one-line summary")]
    pub summary: Option<String>,

    #[schemars(
        description = "When it happened, RFC 3339 (e.g. 2025-03-01T18:00:00Z). Defaults to now."
    )]
    pub occurred_at: Option<String>,
}
