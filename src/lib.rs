//! Orbit: a personal relationship manager, served over MCP and HTTP.
//!
//! Contacts sit on five concentric relationship layers around you. Each
//! contact has an expected contact frequency; once 80% of that interval has
//! passed without a logged conversation the contact *needs attention* and
//! drifts one layer outward on the relationship map until you reconnect.
//!
//! | Layer | Ring (outer radius) | Default priority |
//! |-------|---------------------|------------------|
//! | **vip** | 80 | high |
//! | **inner** | 160 | high |
//! | **regular** | 240 | medium |
//! | **occasional** | 320 | low |
//! | **distant** | 400 | low |
//!
//! # Architecture
//!
//! - **Storage**: SQLite, every row scoped to an owner identity
//! - **Core**: pure functions for attention, drift, and the radial layout
//! - **AI**: OpenAI-compatible chat completions for drafting messages,
//!   fuzzy contact search, and summaries
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP, plus plain
//!   HTTP endpoints for the AI functions
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, migrations, and health checks
//! - [`relationship`] — Contacts, conversations, opportunities, and the relationship map
//! - [`ai`] — Chat-completion client and the AI functions
//! - [`tools`] — MCP tool handler
//! - [`server`] — stdio and HTTP entry points

pub mod ai;
pub mod config;
pub mod db;
pub mod relationship;
pub mod server;
pub mod tools;
