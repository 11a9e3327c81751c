use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListContactsParams {
    #[schemars(
        description = "Only contacts in this layer: 'vip', 'inner', 'regular', 'occasional', 'distant'"
    )]
    pub layer: Option<String>,

    #[schemars(
        description = "If true, only contacts that need attention, never-contacted first then longest since contact"
    )]
    pub needs_attention: Option<bool>,
}
