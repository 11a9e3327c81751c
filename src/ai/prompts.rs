//! Prompt construction and reply parsing for the AI functions.

use serde::Deserialize;
use std::collections::HashSet;

use super::ChatMessage;
use crate::relationship::types::Layer;

/// Tone a drafted message should take for a relationship layer.
pub fn tone_for(layer: Layer) -> &'static str {
    match layer {
        Layer::Vip | Layer::Inner => "warm and casual, like writing to a close friend",
        Layer::Regular => "friendly and upbeat",
        Layer::Occasional => "polite and friendly, without assuming too much familiarity",
        Layer::Distant => "polite and somewhat formal",
    }
}

pub struct MessagePrompt<'a> {
    pub contact_name: &'a str,
    pub layer: Layer,
    pub opportunity_type: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
}

pub fn message_prompt(p: &MessagePrompt<'_>) -> Vec<ChatMessage> {
    let system = format!(
        "You help people keep in touch with the people they care about. \
         Write a short message (2-4 sentences) the user can send as is. \
         Tone: {}. Do not include a subject line, placeholders, or a signature.",
        tone_for(p.layer)
    );

    let mut user = format!(
        "Write a message to {name} ({layer} relationship).\nReason: {kind} - {title}",
        name = p.contact_name,
        layer = p.layer,
        kind = p.opportunity_type,
        title = p.title,
    );
    if let Some(desc) = p.description.filter(|d| !d.trim().is_empty()) {
        user.push_str("\nContext: ");
        user.push_str(desc);
    }

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Search prompt. `profiles` is one pre-rendered line per contact.
pub fn search_prompt(query: &str, profiles: &[String]) -> Vec<ChatMessage> {
    let system = "You match a natural-language query against a list of contacts. \
                  Reply with JSON only, in the form \
                  {\"matched_ids\": [\"<id>\", ...], \"message\": \"<one sentence explaining the matches>\"}. \
                  Only use ids from the list. Return an empty array when nothing matches.";

    let user = format!("Query: {query}\n\nContacts:\n{}", profiles.join("\n"));
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

pub fn summarize_prompt(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(
            "Summarize the conversation notes in one or two sentences. \
             Keep names, commitments, and dates. Reply with the summary only.",
        ),
        ChatMessage::user(text),
    ]
}

#[derive(Debug, Default, PartialEq)]
pub struct SearchReply {
    pub matched_ids: Vec<String>,
    pub message: String,
}

#[derive(Deserialize)]
struct RawSearchReply {
    #[serde(default, alias = "matchedIds")]
    matched_ids: Vec<String>,
    #[serde(default)]
    message: String,
}

/// Parse a search reply. Ids not in `known_ids` are dropped. A reply that
/// is not JSON yields no matches and the raw text as the message.
pub fn parse_search_reply(reply: &str, known_ids: &HashSet<&str>) -> SearchReply {
    let body = strip_code_fence(reply);

    match serde_json::from_str::<RawSearchReply>(body) {
        Ok(raw) => {
            let mut seen = HashSet::new();
            let matched_ids = raw
                .matched_ids
                .into_iter()
                .filter(|id| known_ids.contains(id.as_str()) && seen.insert(id.clone()))
                .collect();
            SearchReply {
                matched_ids,
                message: raw.message,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "search reply was not JSON");
            SearchReply {
                matched_ids: Vec::new(),
                message: reply.trim().to_string(),
            }
        }
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line, e.g. ```json
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_depends_on_layer() {
        assert!(tone_for(Layer::Vip).contains("casual"));
        assert!(tone_for(Layer::Inner).contains("casual"));
        assert!(tone_for(Layer::Regular).contains("friendly"));
        assert!(tone_for(Layer::Occasional).contains("polite"));
        assert!(tone_for(Layer::Distant).contains("formal"));
    }

    #[test]
    fn message_prompt_includes_context() {
        let messages = message_prompt(&MessagePrompt {
            contact_name: "Grace",
            layer: Layer::Distant,
            opportunity_type: "birthday",
            title: "Grace's birthday",
            description: Some("Turning 40"),
        });
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("formal"));
        assert!(messages[1].content.contains("Grace"));
        assert!(messages[1].content.contains("Turning 40"));
    }

    #[test]
    fn blank_description_is_omitted() {
        let messages = message_prompt(&MessagePrompt {
            contact_name: "Grace",
            layer: Layer::Vip,
            opportunity_type: "check_in",
            title: "Check in",
            description: Some("  "),
        });
        assert!(!messages[1].content.contains("Context:"));
    }

    #[test]
    fn parses_json_and_drops_unknown_ids() {
        let known: HashSet<&str> = ["a", "b"].into_iter().collect();
        let reply = r#"{"matched_ids": ["a", "zzz", "a"], "message": "Ada works in tech"}"#;
        let parsed = parse_search_reply(reply, &known);
        assert_eq!(parsed.matched_ids, vec!["a".to_string()]);
        assert_eq!(parsed.message, "Ada works in tech");
    }

    #[test]
    fn parses_fenced_json() {
        let known: HashSet<&str> = ["b"].into_iter().collect();
        let reply = "```json\n{\"matchedIds\": [\"b\"], \"message\": \"ok\"}\n```";
        let parsed = parse_search_reply(reply, &known);
        assert_eq!(parsed.matched_ids, vec!["b".to_string()]);
    }

    #[test]
    fn non_json_reply_becomes_message() {
        let known: HashSet<&str> = ["a"].into_iter().collect();
        let parsed = parse_search_reply("  Nobody matches that.  ", &known);
        assert!(parsed.matched_ids.is_empty());
        assert_eq!(parsed.message, "Nobody matches that.");
    }
}
