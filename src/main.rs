//! # Rolodex CLI (`rolo`)
//!
//! The `rolo` binary is the primary interface for Rolodex. It provides
//! commands for database initialization, direct contact CRUD, the HTTP API
//! server, and the conversational assistant.
//!
//! ## Usage
//!
//! ```bash
//! rolo --config ./config/rolodex.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rolo init` | Create the SQLite database and schema |
//! | `rolo add` | Add a contact |
//! | `rolo list` | List contacts, optionally narrowed by `--search` / `--tag` |
//! | `rolo get <id>` | Show one contact as JSON |
//! | `rolo update <id>` | Update a contact; only provided flags change |
//! | `rolo delete <id>` | Delete a contact |
//! | `rolo serve` | Start the HTTP API server |
//! | `rolo chat` | Chat with the assistant (needs `OPENAI_API_KEY` and a running server) |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rolodex::config::{load_config, Config};
use rolodex::models::{ContactDraft, ContactPatch};
use rolodex::store::{ContactStore, ListFilter};
use rolodex::{agent, db, migrate, server};

/// Rolodex — a local-first contact manager with an LLM assistant.
#[derive(Parser)]
#[command(
    name = "rolo",
    about = "Rolodex — a local-first contact manager with an LLM assistant",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Missing file uses defaults.
    #[arg(long, global = true, default_value = "./config/rolodex.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the contacts table. Idempotent —
    /// running it multiple times is safe.
    Init,

    /// Add a contact.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        linkedin: Option<String>,
        /// Comma-separated tags, e.g. "tech,client".
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List contacts, optionally narrowed.
    List {
        /// Case-insensitive substring over name, email, phone, company,
        /// position, linkedin, notes, and tags.
        #[arg(long)]
        search: Option<String>,
        /// Only contacts carrying exactly this tag.
        #[arg(long)]
        tag: Option<String>,
        /// Print full records as JSON instead of one line per contact.
        #[arg(long)]
        json: bool,
    },

    /// Show one contact as JSON.
    Get { id: String },

    /// Update a contact. Only the provided flags change; everything else is
    /// left untouched.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        linkedin: Option<String>,
        /// Comma-separated tags; replaces the whole tag list.
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        last_contact_date: Option<String>,
        /// One of: active, inactive, prospect.
        #[arg(long)]
        relationship_status: Option<String>,
    },

    /// Delete a contact by id.
    Delete { id: String },

    /// Start the HTTP API server.
    Serve,

    /// Chat with the contact assistant.
    Chat,
}

fn split_tag_flag(raw: Option<String>) -> Vec<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

async fn open_store(config: &Config) -> Result<ContactStore> {
    let pool = db::connect(&config.db).await?;
    Ok(ContactStore::open(pool).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&config.db).await?;
            migrate::run_migrations(&pool).await?;
            println!("Database initialized at {}", config.db.path.display());
        }

        Commands::Add {
            name,
            email,
            phone,
            company,
            position,
            linkedin,
            tags,
            notes,
        } => {
            let mut store = open_store(&config).await?;
            let contact = store
                .add(ContactDraft {
                    name,
                    email,
                    phone,
                    company,
                    position,
                    linkedin,
                    tags: split_tag_flag(tags),
                    notes,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&contact)?);
        }

        Commands::List { search, tag, json } => {
            let store = open_store(&config).await?;
            let contacts = store.list(&ListFilter { search, tag });

            if json {
                println!("{}", serde_json::to_string_pretty(&contacts)?);
            } else {
                for contact in &contacts {
                    println!("{}  {} <{}>", contact.id, contact.name, contact.email);
                }
                println!("{} contact(s)", contacts.len());
            }
        }

        Commands::Get { id } => {
            let store = open_store(&config).await?;
            let contact = store.get(&id)?;
            println!("{}", serde_json::to_string_pretty(contact)?);
        }

        Commands::Update {
            id,
            name,
            email,
            phone,
            company,
            position,
            linkedin,
            tags,
            notes,
            last_contact_date,
            relationship_status,
        } => {
            let mut store = open_store(&config).await?;
            let patch = ContactPatch {
                name,
                email,
                phone,
                company: company.map(Some),
                position: position.map(Some),
                linkedin: linkedin.map(Some),
                tags: tags.map(|raw| split_tag_flag(Some(raw))),
                notes,
                last_contact_date: last_contact_date.map(Some),
                relationship_status,
            };
            let contact = store.update(&id, patch).await?;
            println!("{}", serde_json::to_string_pretty(&contact)?);
        }

        Commands::Delete { id } => {
            let mut store = open_store(&config).await?;
            store.delete(&id).await?;
            println!("Contact deleted successfully");
        }

        Commands::Serve => {
            let store = open_store(&config).await?;
            server::run_server(&config, store).await?;
        }

        Commands::Chat => {
            agent::run_chat(&config).await?;
        }
    }

    Ok(())
}
