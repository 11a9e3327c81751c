use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateContactParams {
    #[schemars(description = "Display name of the contact")]
    pub name: String,

    #[schemars(
        description = "Relationship layer: 'vip', 'inner', 'regular', 'occasional', 'distant'. Defaults to 'regular'."
    )]
    pub layer: Option<String>,

    #[schemars(
        description = "Expected cadence: 'daily', 'weekly', 'biweekly', 'monthly', 'quarterly', 'yearly'. Defaults to 'monthly'."
    )]
    pub contact_frequency: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub notes: Option<String>,

    #[schemars(description = "Free-form tags, e.g. ['college', 'climbing']")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "Birthday as YYYY-MM-DD")]
    pub birthday: Option<String>,
}
