use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListOpportunitiesParams {
    #[schemars(description = "Only opportunities for this contact ID")]
    pub contact_id: Option<String>,

    #[schemars(description = "Include completed opportunities. Defaults to false.")]
    pub include_completed: Option<bool>,
}
