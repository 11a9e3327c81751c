//! Core relationship type definitions.
//!
//! Defines [`Layer`] (the five relationship rings), [`Frequency`] (expected
//! contact cadence), and the stored records: [`Contact`], [`Conversation`],
//! and [`Opportunity`]. [`ContactView`] pairs a contact with its derived
//! attention state, which is recomputed on every read and never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Relationship layers, ordered from the centre outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Vip,
    Inner,
    Regular,
    Occasional,
    Distant,
}

impl Layer {
    /// All layers, innermost first.
    pub const ALL: [Layer; 5] = [
        Layer::Vip,
        Layer::Inner,
        Layer::Regular,
        Layer::Occasional,
        Layer::Distant,
    ];

    /// Ring index, 0 (vip) through 4 (distant).
    pub fn index(self) -> usize {
        self as usize
    }

    /// The layer one ring further out, or `None` for `Distant`.
    pub fn outward(self) -> Option<Layer> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vip => "vip",
            Self::Inner => "inner",
            Self::Regular => "regular",
            Self::Occasional => "occasional",
            Self::Distant => "distant",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vip" => Ok(Self::Vip),
            "inner" => Ok(Self::Inner),
            "regular" => Ok(Self::Regular),
            "occasional" => Ok(Self::Occasional),
            "distant" => Ok(Self::Distant),
            _ => Err(format!("unknown layer: {s}")),
        }
    }
}

/// Expected contact cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Biweekly,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::Yearly,
    ];

    /// Days between contacts this cadence aims for.
    pub fn target_days(self) -> u32 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Biweekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 90,
            Self::Yearly => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Parse a stored tag, falling back to `Monthly` (the 30-day default)
    /// for anything unrecognised.
    pub fn from_tag_lossy(tag: &str) -> Frequency {
        tag.parse().unwrap_or_else(|_| {
            tracing::warn!(tag, "unknown contact frequency, using 30-day target");
            Frequency::Monthly
        })
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("unknown frequency: {s}")),
        }
    }
}

/// How a conversation took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    Call,
    Meeting,
    Email,
    Note,
    Other,
}

impl ConversationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Meeting => "meeting",
            Self::Email => "email",
            Self::Note => "note",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConversationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call" => Ok(Self::Call),
            "meeting" => Ok(Self::Meeting),
            "email" => Ok(Self::Email),
            "note" => Ok(Self::Note),
            "other" => Ok(Self::Other),
            _ => Err(format!("unknown conversation kind: {s}")),
        }
    }
}

/// What a follow-up opportunity is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    CheckIn,
    FollowUp,
    Birthday,
    Introduction,
    Custom,
}

impl OpportunityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckIn => "check_in",
            Self::FollowUp => "follow_up",
            Self::Birthday => "birthday",
            Self::Introduction => "introduction",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OpportunityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check_in" => Ok(Self::CheckIn),
            "follow_up" => Ok(Self::FollowUp),
            "birthday" => Ok(Self::Birthday),
            "introduction" => Ok(Self::Introduction),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("unknown opportunity type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Default priority for follow-ups with a contact in `layer`.
    pub fn for_layer(layer: Layer) -> Priority {
        match layer {
            Layer::Vip | Layer::Inner => Self::High,
            Layer::Regular => Self::Medium,
            Layer::Occasional | Layer::Distant => Self::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("unknown priority: {s}")),
        }
    }
}

/// A contact record, matching the `contacts` table schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// UUID v7 primary key.
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub initials: String,
    pub layer: Layer,
    pub contact_frequency: Frequency,
    /// `None` until the first conversation is logged.
    pub last_contact_at: Option<DateTime<Utc>>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub birthday: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A contact together with its attention state at read time.
#[derive(Debug, Clone, Serialize)]
pub struct ContactView {
    #[serde(flatten)]
    pub contact: Contact,
    pub needs_attention: bool,
    /// Layer the contact is displayed in after drift.
    pub effective_layer: Layer,
    /// Whole days since the last conversation, `None` if never contacted.
    pub days_since_contact: Option<i64>,
}

/// A logged interaction with one contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub owner_id: String,
    pub contact_id: String,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub content: String,
    pub summary: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A scheduled or ad-hoc follow-up task tied to one contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub owner_id: String,
    pub contact_id: String,
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub suggested_message: Option<String>,
    /// Set once, when the opportunity is completed.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// An opportunity joined with the contact it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityView {
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub contact_name: String,
    pub contact_layer: Layer,
}

/// Derive display initials from a name: first letter of the first and last word.
pub fn initials_for(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    let pick = |w: &str| w.chars().next().map(|c| c.to_uppercase().collect::<String>());
    match words.as_slice() {
        [] => String::new(),
        [only] => pick(only).unwrap_or_default(),
        [first, .., last] => {
            let mut out = pick(first).unwrap_or_default();
            out.push_str(&pick(last).unwrap_or_default());
            out
        }
    }
}
