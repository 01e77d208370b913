//! SQLite connection pool for the contact store.
//!
//! Connections are checked out of the pool per operation and returned
//! before the operation completes; nothing holds a connection across
//! requests.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::DbConfig;

pub async fn connect(db: &DbConfig) -> Result<SqlitePool> {
    if let Some(parent) = db.path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db.path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
