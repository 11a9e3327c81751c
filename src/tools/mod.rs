pub mod complete_opportunity;
pub mod create_contact;
pub mod draft_message;
pub mod list_contacts;
pub mod list_opportunities;
pub mod log_conversation;
pub mod relationship_layout;
pub mod seed_opportunities;

use chrono::{DateTime, NaiveDate, Utc};
use complete_opportunity::CompleteOpportunityParams;
use create_contact::CreateContactParams;
use draft_message::DraftMessageParams;
use list_contacts::ListContactsParams;
use list_opportunities::ListOpportunitiesParams;
use log_conversation::LogConversationParams;
use relationship_layout::RelationshipLayoutParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use rusqlite::Connection;
use seed_opportunities::SeedOpportunitiesParams;
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::ai::functions::{generate_message, GenerateMessageRequest};
use crate::ai::ChatClient;
use crate::config::OrbitConfig;
use crate::relationship::contacts::{self, ContactFilter, NewContact};
use crate::relationship::conversations::{self, NewConversation};
use crate::relationship::opportunities::{self, OpportunityFilter};
use crate::relationship::types::{ConversationKind, Frequency, Layer};

/// The Orbit MCP tool handler. Holds the shared db connection, config, and
/// (when an API key is configured) the chat client used for drafting.
#[derive(Clone)]
pub struct OrbitTools {
    tool_router: ToolRouter<Self>,
    db: Arc<Mutex<Connection>>,
    config: Arc<OrbitConfig>,
    chat: Option<ChatClient>,
}

#[derive(Serialize)]
struct DraftResult {
    opportunity_id: String,
    message: String,
    saved: bool,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

impl OrbitTools {
    /// Run a blocking db operation for the configured owner.
    async fn with_db<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &str) -> anyhow::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let owner = self.config.storage.owner.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            f(&mut conn, &owner)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("{e:#}"))
    }
}

#[tool_router]
impl OrbitTools {
    pub fn new(db: Arc<Mutex<Connection>>, config: Arc<OrbitConfig>) -> Self {
        let chat = match ChatClient::from_config(&config.ai) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::info!("message drafting disabled: {e}");
                None
            }
        };
        Self::with_chat(db, config, chat)
    }

    pub fn with_chat(
        db: Arc<Mutex<Connection>>,
        config: Arc<OrbitConfig>,
        chat: Option<ChatClient>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            db,
            config,
            chat,
        }
    }

    #[tool(description = "List contacts with their attention state and effective (drifted) layer. Filter by layer or by needs_attention.")]
    async fn list_contacts(
        &self,
        Parameters(params): Parameters<ListContactsParams>,
    ) -> Result<String, String> {
        let layer = params
            .layer
            .as_deref()
            .map(str::parse::<Layer>)
            .transpose()?;
        let filter = ContactFilter {
            layer,
            needs_attention: params.needs_attention,
        };

        tracing::info!(?filter, "list_contacts called");

        let views = self
            .with_db(move |conn, owner| contacts::list_contacts(conn, owner, filter, Utc::now()))
            .await?;
        to_json(&serde_json::json!({ "contacts": views, "total": views.len() }))
    }

    #[tool(description = "Add a contact. Layers: vip, inner, regular, occasional, distant. Frequencies: daily, weekly, biweekly, monthly, quarterly, yearly.")]
    async fn create_contact(
        &self,
        Parameters(params): Parameters<CreateContactParams>,
    ) -> Result<String, String> {
        let layer = match params.layer.as_deref() {
            Some(l) => l.parse::<Layer>()?,
            None => Layer::Regular,
        };
        let frequency = match params.contact_frequency.as_deref() {
            Some(f) => f.parse::<Frequency>()?,
            None => Frequency::Monthly,
        };
        let birthday = params
            .birthday
            .as_deref()
            .map(|b| NaiveDate::parse_from_str(b, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| format!("birthday must be YYYY-MM-DD: {e}"))?;

        let new = NewContact {
            email: params.email,
            phone: params.phone,
            company: params.company,
            role: params.role,
            notes: params.notes,
            tags: params.tags.unwrap_or_default(),
            birthday,
            ..NewContact::new(params.name, layer, frequency)
        };

        tracing::info!(name = %new.name, layer = %layer, "create_contact called");

        let contact = self
            .with_db(move |conn, owner| contacts::create_contact(conn, owner, &new))
            .await?;
        let view = contacts::view_of(contact, Utc::now());
        to_json(&view)
    }

    #[tool(description = "Log a conversation with a contact (call, meeting, email, note, other). Updates the contact's last contact time.")]
    async fn log_conversation(
        &self,
        Parameters(params): Parameters<LogConversationParams>,
    ) -> Result<String, String> {
        let kind: ConversationKind = params.r#type.parse()?;
        if params.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }
        let occurred_at = params
            .occurred_at
            .as_deref()
            .map(DateTime::parse_from_rfc3339)
            .transpose()
            .map_err(|e| format!("occurred_at must be RFC 3339: {e}"))?
            .map(|t| t.with_timezone(&Utc));

        let new = NewConversation {
            contact_id: params.contact_id,
            kind,
            content: params.content,
            summary: params.summary,
            occurred_at,
        };

        tracing::info!(contact_id = %new.contact_id, kind = %kind, "log_conversation called");

        let result = self
            .with_db(move |conn, owner| conversations::log_conversation(conn, owner, &new))
            .await?;
        to_json(&result)
    }

    #[tool(description = "List follow-up opportunities, soonest due first. Open ones only unless include_completed is true.")]
    async fn list_opportunities(
        &self,
        Parameters(params): Parameters<ListOpportunitiesParams>,
    ) -> Result<String, String> {
        let filter = OpportunityFilter {
            include_completed: params.include_completed.unwrap_or(false),
            contact_id: params.contact_id,
        };

        tracing::info!(?filter, "list_opportunities called");

        let views = self
            .with_db(move |conn, owner| opportunities::list_opportunities(conn, owner, &filter))
            .await?;
        to_json(&serde_json::json!({ "opportunities": views, "total": views.len() }))
    }

    #[tool(description = "Mark an open opportunity completed.")]
    async fn complete_opportunity(
        &self,
        Parameters(params): Parameters<CompleteOpportunityParams>,
    ) -> Result<String, String> {
        tracing::info!(id = %params.id, "complete_opportunity called");

        let opportunity = self
            .with_db(move |conn, owner| {
                opportunities::complete_opportunity(conn, owner, &params.id, Utc::now())
            })
            .await?;
        to_json(&opportunity)
    }

    #[tool(description = "Create check-in opportunities for contacts needing attention and reminders for upcoming birthdays. Skips contacts that already have one open.")]
    async fn seed_opportunities(
        &self,
        Parameters(params): Parameters<SeedOpportunitiesParams>,
    ) -> Result<String, String> {
        let lookahead = params
            .birthday_lookahead_days
            .unwrap_or(self.config.opportunities.birthday_lookahead_days);

        tracing::info!(lookahead, "seed_opportunities called");

        let result = self
            .with_db(move |conn, owner| {
                opportunities::seed_opportunities(conn, owner, Utc::now(), lookahead)
            })
            .await?;
        to_json(&result)
    }

    #[tool(description = "Compute the radial relationship map: x/y position, ring, and drift state for every contact.")]
    async fn relationship_layout(
        &self,
        Parameters(params): Parameters<RelationshipLayoutParams>,
    ) -> Result<String, String> {
        let geometry = self.config.layout.geometry();
        let drifting_only = params.drifting_only.unwrap_or(false);

        let mut nodes = self
            .with_db(move |conn, owner| {
                crate::relationship::relationship_map(conn, owner, Utc::now(), &geometry)
            })
            .await?;
        if drifting_only {
            nodes.retain(|n| n.drifting);
        }

        tracing::info!(nodes = nodes.len(), drifting_only, "relationship_layout computed");
        to_json(&serde_json::json!({ "nodes": nodes, "total": nodes.len() }))
    }

    #[tool(description = "Draft a reconnect message for an open opportunity using the configured AI model. Tone follows the contact's layer.")]
    async fn draft_message(
        &self,
        Parameters(params): Parameters<DraftMessageParams>,
    ) -> Result<String, String> {
        let Some(chat) = self.chat.clone() else {
            return Err(crate::ai::AiError::MissingApiKey.to_string());
        };

        let id = params.opportunity_id.clone();
        let view = self
            .with_db(move |conn, owner| opportunities::get_opportunity(conn, owner, &id))
            .await?;
        if !view.opportunity.is_open() {
            return Err(format!("opportunity {} is already completed", view.opportunity.id));
        }

        let request = GenerateMessageRequest {
            contact_name: view.contact_name.clone(),
            contact_layer: view.contact_layer,
            opportunity_type: view.opportunity.kind.as_str().to_string(),
            title: view.opportunity.title.clone(),
            description: view.opportunity.description.clone(),
        };
        let drafted = generate_message(&chat, &request)
            .await
            .map_err(|e| e.to_string())?;

        let save = params.save.unwrap_or(true);
        if save {
            let id = params.opportunity_id.clone();
            let message = drafted.message.clone();
            self.with_db(move |conn, owner| {
                opportunities::set_suggested_message(conn, owner, &id, &message)
            })
            .await?;
        }

        tracing::info!(opportunity_id = %params.opportunity_id, save, "message drafted");
        to_json(&DraftResult {
            opportunity_id: params.opportunity_id,
            message: drafted.message,
            saved: save,
        })
    }
}

#[tool_handler]
impl ServerHandler for OrbitTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Orbit is a personal relationship manager. Use list_contacts with \
                 needs_attention=true to find people to reconnect with, log_conversation \
                 after talking to someone, and seed_opportunities to create follow-ups."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
