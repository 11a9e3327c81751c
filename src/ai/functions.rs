//! The AI functions: message drafting, contact search, and summaries.
//!
//! Request and response bodies use camelCase field names so the HTTP
//! surface matches what browser clients send.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::prompts::{self, MessagePrompt};
use super::{AiError, ChatClient};
use crate::relationship::types::{Contact, Layer};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMessageRequest {
    pub contact_name: String,
    pub contact_layer: Layer,
    pub opportunity_type: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateMessageResponse {
    pub message: String,
}

/// Contact fields the search prompt sees.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub layer: Option<Layer>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Contact> for ContactProfile {
    fn from(c: &Contact) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            layer: Some(c.layer),
            company: c.company.clone(),
            role: c.role.clone(),
            notes: c.notes.clone(),
            tags: c.tags.clone(),
        }
    }
}

impl ContactProfile {
    fn prompt_line(&self) -> String {
        let mut line = format!("- id={} name={}", self.id, self.name);
        if let Some(layer) = self.layer {
            line.push_str(&format!(" layer={layer}"));
        }
        for (label, value) in [
            ("company", &self.company),
            ("role", &self.role),
            ("notes", &self.notes),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                line.push_str(&format!(" {label}=\"{}\"", v.replace('\n', " ")));
            }
        }
        if !self.tags.is_empty() {
            line.push_str(&format!(" tags={}", self.tags.join(",")));
        }
        line
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchContactsRequest {
    pub query: String,
    pub contacts: Vec<ContactProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchContactsResponse {
    pub matched_ids: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

pub async fn generate_message(
    client: &ChatClient,
    req: &GenerateMessageRequest,
) -> Result<GenerateMessageResponse, AiError> {
    if req.contact_name.trim().is_empty() {
        return Err(AiError::InvalidRequest("contactName is required".into()));
    }

    let messages = prompts::message_prompt(&MessagePrompt {
        contact_name: req.contact_name.trim(),
        layer: req.contact_layer,
        opportunity_type: &req.opportunity_type,
        title: &req.title,
        description: req.description.as_deref(),
    });
    let message = client.complete(&messages).await?;
    Ok(GenerateMessageResponse { message })
}

pub async fn search_contacts(
    client: &ChatClient,
    req: &SearchContactsRequest,
) -> Result<SearchContactsResponse, AiError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(AiError::InvalidRequest("query is required".into()));
    }
    if req.contacts.is_empty() {
        return Ok(SearchContactsResponse {
            matched_ids: Vec::new(),
            message: "No contacts to search.".into(),
        });
    }

    let profiles: Vec<String> = req.contacts.iter().map(ContactProfile::prompt_line).collect();
    let reply = client.complete(&prompts::search_prompt(query, &profiles)).await?;

    let known: HashSet<&str> = req.contacts.iter().map(|c| c.id.as_str()).collect();
    let parsed = prompts::parse_search_reply(&reply, &known);
    tracing::debug!(query, matches = parsed.matched_ids.len(), "contact search finished");

    Ok(SearchContactsResponse {
        matched_ids: parsed.matched_ids,
        message: parsed.message,
    })
}

pub async fn summarize(
    client: &ChatClient,
    req: &SummarizeRequest,
) -> Result<SummarizeResponse, AiError> {
    if req.text.trim().is_empty() {
        return Err(AiError::InvalidRequest("text is required".into()));
    }
    let summary = client.complete(&prompts::summarize_prompt(req.text.trim())).await?;
    Ok(SummarizeResponse { summary })
}
