//! # Rolodex
//!
//! A local-first contact manager with an LLM assistant.
//!
//! Rolodex keeps a single `Contact` entity set in SQLite with a fast
//! in-memory mirror, exposes it over a JSON HTTP API, and layers a
//! conversational agent on top that drives the same API through named
//! tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────┐
//! │   CLI    │──▶│ ContactStore │◀──│  SQLite   │
//! │  (rolo)  │   │ (mirror+db)  │   └──────────┘
//! └──────────┘   └──────┬───────┘
//!                       ▼
//!                 ┌──────────┐       ┌──────────┐
//!                 │   HTTP   │◀──────│  Agent    │
//!                 │  (axum)  │ tools │ (LLM loop)│
//!                 └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! rolo init                     # create database
//! rolo add --name "Juan" --email juan@example.com --phone +56911111111
//! rolo list --search tech
//! rolo serve                    # start the HTTP API
//! rolo chat                     # talk to the assistant (needs OPENAI_API_KEY)
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Contact record and request shapes |
//! | [`store`] | In-memory mirror + SQLite synchronization |
//! | [`server`] | Contact HTTP API |
//! | [`backend`] | HTTP client for the API (agent side) |
//! | [`tools`] | Agent tool registry |
//! | [`agent`] | LLM tool-calling loop and chat REPL |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod agent;
pub mod backend;
pub mod config;
pub mod db;
pub mod migrate;
pub mod models;
pub mod server;
pub mod store;
pub mod tools;
