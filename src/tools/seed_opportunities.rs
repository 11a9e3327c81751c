use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SeedOpportunitiesParams {
    #[schemars(
        description = "How many days ahead to look for birthdays. Defaults to the configured value (7). Must be between 0 and 366."
    )]
    pub birthday_lookahead_days: Option<i64>,
}
