mod cli;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use orbit::config::OrbitConfig;
use orbit::relationship::contacts::{ContactPatch, NewContact};
use orbit::relationship::conversations::NewConversation;
use orbit::relationship::opportunities::NewOpportunity;
use orbit::relationship::types::{ConversationKind, Frequency, Layer, OpportunityKind, Priority};

#[derive(Parser)]
#[command(name = "orbit", version, about = "Personal relationship manager with an MCP server")]
struct Cli {
    /// Config file (defaults to ~/.orbit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio unless --http or transport = "http")
    Serve {
        /// Serve MCP over HTTP at /mcp plus the /functions endpoints
        #[arg(long)]
        http: bool,
    },
    /// Manage contacts
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },
    /// List contacts that need attention
    Attention,
    /// Log a conversation with a contact
    Log {
        contact_id: String,
        content: String,
        /// call, meeting, email, note, other
        #[arg(long = "type", short = 't', default_value = "note")]
        kind: ConversationKind,
        #[arg(long)]
        summary: Option<String>,
        /// When it happened (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Manage follow-up opportunities
    Opportunity {
        #[command(subcommand)]
        action: OpportunityAction,
    },
    /// Print the relationship map
    Layout {
        /// Only contacts that drifted outward
        #[arg(long)]
        drifting: bool,
        /// Print nodes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show dashboard statistics
    Stats,
    /// Export all data as JSON to stdout
    Export,
    /// Import data from a JSON export
    Import { file: PathBuf },
    /// Check database health
    Doctor,
}

#[derive(Args)]
struct ContactFields {
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    role: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    /// Repeatable
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    birthday: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum ContactAction {
    /// Add a contact
    Add {
        name: String,
        /// vip, inner, regular, occasional, distant
        #[arg(long, default_value = "regular")]
        layer: Layer,
        /// daily, weekly, biweekly, monthly, quarterly, yearly
        #[arg(long, default_value = "monthly")]
        frequency: Frequency,
        #[command(flatten)]
        fields: ContactFields,
    },
    /// List contacts
    List {
        #[arg(long)]
        layer: Option<Layer>,
        /// Only contacts that need attention
        #[arg(long)]
        attention: bool,
    },
    /// Show one contact with its conversations and open opportunities
    Show { id: String },
    /// Edit a contact. Pass an empty string to clear a text field.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        layer: Option<Layer>,
        #[arg(long)]
        frequency: Option<Frequency>,
        #[command(flatten)]
        fields: ContactFields,
        /// Remove the stored birthday
        #[arg(long, conflicts_with = "birthday")]
        clear_birthday: bool,
    },
    /// Remove a contact with its conversations and opportunities
    Remove {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum OpportunityAction {
    /// Add an opportunity for a contact
    Add {
        contact_id: String,
        title: String,
        /// check_in, follow_up, birthday, introduction, custom
        #[arg(long = "type", default_value = "follow_up")]
        kind: OpportunityKind,
        #[arg(long)]
        description: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        due: Option<NaiveDate>,
        /// low, medium, high (defaults from the contact's layer)
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// List opportunities
    List {
        /// Include completed ones
        #[arg(long)]
        all: bool,
        #[arg(long)]
        contact: Option<String>,
    },
    /// Mark an opportunity completed
    Complete { id: String },
    /// Delete an opportunity
    Remove { id: String },
    /// Create check-ins and birthday reminders
    Seed {
        /// Birthday lookahead in days (0-366)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=366))]
        days: Option<i64>,
    },
    /// Draft a message with the configured AI model
    Draft {
        id: String,
        /// Print the draft without saving it
        #[arg(long)]
        no_save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => OrbitConfig::load_from(path)?,
        None => OrbitConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { http } => {
            if http || config.server.transport == "http" {
                orbit::server::serve_http(config).await?;
            } else {
                orbit::server::serve_stdio(config).await?;
            }
        }
        Command::Contact { action } => match action {
            ContactAction::Add {
                name,
                layer,
                frequency,
                fields,
            } => {
                let new = NewContact {
                    email: fields.email,
                    phone: fields.phone,
                    company: fields.company,
                    role: fields.role,
                    notes: fields.notes,
                    tags: fields.tags,
                    birthday: fields.birthday,
                    ..NewContact::new(name, layer, frequency)
                };
                cli::contact::add(&config, new)?;
            }
            ContactAction::List { layer, attention } => {
                cli::contact::list(&config, layer, attention)?;
            }
            ContactAction::Show { id } => cli::contact::show(&config, &id)?,
            ContactAction::Edit {
                id,
                name,
                layer,
                frequency,
                fields,
                clear_birthday,
            } => {
                let patch = ContactPatch {
                    name,
                    initials: None,
                    layer,
                    contact_frequency: frequency,
                    email: fields.email,
                    phone: fields.phone,
                    company: fields.company,
                    role: fields.role,
                    notes: fields.notes,
                    tags: (!fields.tags.is_empty()).then_some(fields.tags),
                    birthday: if clear_birthday {
                        Some(None)
                    } else {
                        fields.birthday.map(Some)
                    },
                };
                cli::contact::edit(&config, &id, &patch)?;
            }
            ContactAction::Remove { id, yes } => cli::contact::remove(&config, &id, yes)?,
        },
        Command::Attention => cli::attention::attention(&config)?,
        Command::Log {
            contact_id,
            content,
            kind,
            summary,
            at,
        } => {
            let new = NewConversation {
                contact_id,
                kind,
                content,
                summary,
                occurred_at: at,
            };
            cli::log::log(&config, &new)?;
        }
        Command::Opportunity { action } => match action {
            OpportunityAction::Add {
                contact_id,
                title,
                kind,
                description,
                due,
                priority,
            } => {
                let new = NewOpportunity {
                    contact_id,
                    kind,
                    title,
                    description,
                    due_date: due,
                    priority,
                    suggested_message: None,
                };
                cli::opportunity::add(&config, &new)?;
            }
            OpportunityAction::List { all, contact } => {
                cli::opportunity::list(&config, all, contact)?;
            }
            OpportunityAction::Complete { id } => cli::opportunity::complete(&config, &id)?,
            OpportunityAction::Remove { id } => cli::opportunity::remove(&config, &id)?,
            OpportunityAction::Seed { days } => cli::opportunity::seed(&config, days)?,
            OpportunityAction::Draft { id, no_save } => {
                cli::opportunity::draft(&config, &id, !no_save).await?;
            }
        },
        Command::Layout { drifting, json } => cli::layout::layout(&config, drifting, json)?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Export => cli::export::export(&config)?,
        Command::Import { file } => cli::import::import(&config, &file)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
