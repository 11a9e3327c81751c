//! Server initialization for the stdio and HTTP transports.
//!
//! [`serve_stdio`] runs the MCP tool handler over stdin/stdout. [`serve_http`]
//! mounts the same handler at `/mcp` next to the AI function endpoints under
//! `/functions`.

use crate::ai::functions::{
    self, GenerateMessageRequest, SearchContactsRequest, SummarizeRequest,
};
use crate::ai::{AiError, ChatClient};
use crate::config::OrbitConfig;
use crate::db;
use crate::tools::OrbitTools;
use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use rmcp::ServiceExt;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};

/// Shared setup: open the DB and wrap it with the config for sharing.
fn setup_shared_state(
    config: OrbitConfig,
) -> Result<(Arc<Mutex<rusqlite::Connection>>, Arc<OrbitConfig>)> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), owner = %config.storage.owner, "database ready");

    Ok((Arc::new(Mutex::new(conn)), Arc::new(config)))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: OrbitConfig) -> Result<()> {
    tracing::info!("starting Orbit MCP server on stdio");

    let (db, config) = setup_shared_state(config)?;

    let tools = OrbitTools::new(db, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the HTTP server: MCP over Streamable HTTP at `/mcp` plus the AI
/// function endpoints.
pub async fn serve_http(config: OrbitConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(addr = %bind_addr, "starting Orbit server on HTTP");

    let (db, config) = setup_shared_state(config)?;
    let chat = match ChatClient::from_config(&config.ai) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!("AI functions will fail until configured: {e}");
            None
        }
    };

    let mcp_chat = chat.clone();
    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || {
            Ok(OrbitTools::with_chat(
                db.clone(),
                config.clone(),
                mcp_chat.clone(),
            ))
        },
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = Router::new()
        .nest_service("/mcp", service)
        .merge(functions_router(chat));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr}/mcp and /functions/*");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl-c: {e}");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}

#[derive(Clone)]
struct FunctionsState {
    chat: Option<ChatClient>,
}

impl FunctionsState {
    fn chat(&self) -> Result<&ChatClient, AiError> {
        self.chat.as_ref().ok_or(AiError::MissingApiKey)
    }
}

impl IntoResponse for AiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self, "AI function failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

fn body<T: DeserializeOwned>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AiError> {
    payload
        .map(|Json(req)| req)
        .map_err(|e| AiError::InvalidRequest(e.body_text()))
}

/// Router for the AI function endpoints. A `None` client answers every
/// request with the missing-key error.
pub fn functions_router(chat: Option<ChatClient>) -> Router {
    Router::new()
        .route("/functions/generate-message", post(generate_message_handler))
        .route("/functions/search-contacts", post(search_contacts_handler))
        .route("/functions/summarize", post(summarize_handler))
        .with_state(Arc::new(FunctionsState { chat }))
}

async fn generate_message_handler(
    State(state): State<Arc<FunctionsState>>,
    payload: Result<Json<GenerateMessageRequest>, JsonRejection>,
) -> Result<Json<functions::GenerateMessageResponse>, AiError> {
    let req = body(payload)?;
    let resp = functions::generate_message(state.chat()?, &req).await?;
    Ok(Json(resp))
}

async fn search_contacts_handler(
    State(state): State<Arc<FunctionsState>>,
    payload: Result<Json<SearchContactsRequest>, JsonRejection>,
) -> Result<Json<functions::SearchContactsResponse>, AiError> {
    let req = body(payload)?;
    let resp = functions::search_contacts(state.chat()?, &req).await?;
    Ok(Json(resp))
}

async fn summarize_handler(
    State(state): State<Arc<FunctionsState>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<functions::SummarizeResponse>, AiError> {
    let req = body(payload)?;
    let resp = functions::summarize(state.chat()?, &req).await?;
    Ok(Json(resp))
}
