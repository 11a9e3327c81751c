use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompleteOpportunityParams {
    #[schemars(description = "ID of the open opportunity to mark completed")]
    pub id: String,
}
