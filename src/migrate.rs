use sqlx::SqlitePool;

/// Create the contacts table if it does not exist yet.
///
/// Idempotent; safe to run on every store construction. The `email`
/// uniqueness constraint mirrors the store's in-memory duplicate check.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL,
            company TEXT,
            position TEXT,
            linkedin TEXT,
            tags TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            last_contact_date TEXT,
            relationship_status TEXT NOT NULL DEFAULT 'active'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
