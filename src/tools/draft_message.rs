use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DraftMessageParams {
    #[schemars(description = "ID of the open opportunity to draft a message for")]
    pub opportunity_id: String,

    #[schemars(
        description = "If true (default), store the draft as the opportunity's suggested message"
    )]
    pub save: Option<bool>,
}
