use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RelationshipLayoutParams {
    #[schemars(
        description = "If true, return only contacts that drifted out of their nominal ring"
    )]
    pub drifting_only: Option<bool>,
}
