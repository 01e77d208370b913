//! The contact store: an in-memory mirror kept synchronized with SQLite.
//!
//! [`ContactStore`] owns two representations of the same contact set: the
//! durable `contacts` table and an in-memory mirror (a keyed index plus an
//! insertion-ordered id sequence) rebuilt at startup and updated on every
//! mutation. Reads never touch the database; `add` reaches the mirror only
//! after its INSERT succeeds, while `update` mutates the mirror in place
//! and then persists the same field set.
//!
//! # Synchronization contract
//!
//! | Operation | Durable store | Mirror |
//! |-----------|---------------|--------|
//! | `open` / `reload` | read all rows | full rebuild |
//! | `add` | INSERT, then | insert into index + sequence |
//! | `get` / `list` | — | read only |
//! | `update` | single UPDATE of the provided columns | mutate in place |
//! | `delete` | unconditional DELETE | remove from both structures |
//!
//! The store carries no internal locking. When driven by a concurrent
//! dispatcher, all operations must be serialized behind one external mutex
//! per store instance: the duplicate-email check in `add` reads the mirror
//! before the database write lands, and the index/sequence pair is not
//! mutated atomically.

use std::collections::HashMap;

use sqlx::{Row, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use crate::migrate;
use crate::models::{is_valid_email, Contact, ContactDraft, ContactPatch};

/// Domain errors surfaced by store operations.
///
/// `Duplicate` and `NotFound` are caller-precondition failures and map to
/// client errors at the HTTP boundary; `Db` covers durable-store faults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A contact with this email already exists")]
    Duplicate,
    #[error("Contact not found")]
    NotFound,
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Optional narrowing for [`ContactStore::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Case-insensitive substring matched against name, phone, email,
    /// company, position, linkedin, notes, and each tag individually.
    pub search: Option<String>,
    /// Case-insensitive exact match against any tag element.
    pub tag: Option<String>,
}

pub struct ContactStore {
    pool: SqlitePool,
    by_id: HashMap<String, Contact>,
    order: Vec<String>,
}

impl ContactStore {
    /// Ensure the schema exists, then build the in-memory mirror from the
    /// durable store. The mirror after `open` is fully determined by table
    /// content at that instant.
    pub async fn open(pool: SqlitePool) -> Result<Self, StoreError> {
        migrate::run_migrations(&pool).await?;

        let mut store = Self {
            pool,
            by_id: HashMap::new(),
            order: Vec::new(),
        };
        store.reload().await?;
        Ok(store)
    }

    /// Discard the mirror and rebuild it from the durable store.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, email, phone, company, position, linkedin, tags, notes, \
             last_contact_date, relationship_status FROM contacts",
        )
        .fetch_all(&self.pool)
        .await?;

        self.by_id.clear();
        self.order.clear();

        for row in &rows {
            let contact = row_to_contact(row);
            self.order.push(contact.id.clone());
            self.by_id.insert(contact.id.clone(), contact);
        }

        Ok(())
    }

    /// Create a contact. The id is assigned here, never by the caller.
    ///
    /// The duplicate-email check runs against the mirror, the read-side
    /// authority, before anything is written. The mirror is only updated
    /// once the INSERT has succeeded, so a durable-store failure leaves
    /// the externally visible state unchanged.
    pub async fn add(&mut self, draft: ContactDraft) -> Result<Contact, StoreError> {
        if !is_valid_email(&draft.email) {
            return Err(StoreError::InvalidEmail(draft.email));
        }

        if self.by_id.values().any(|c| c.email == draft.email) {
            return Err(StoreError::Duplicate);
        }

        let contact = Contact {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            company: draft.company,
            position: draft.position,
            linkedin: draft.linkedin,
            tags: draft.tags,
            notes: draft.notes.unwrap_or_default(),
            last_contact_date: None,
            relationship_status: "active".to_string(),
        };

        sqlx::query(
            "INSERT INTO contacts (id, name, email, phone, company, position, linkedin, tags, \
             notes, last_contact_date, relationship_status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&contact.id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.company)
        .bind(&contact.position)
        .bind(&contact.linkedin)
        .bind(join_tags(&contact.tags))
        .bind(&contact.notes)
        .bind(&contact.last_contact_date)
        .bind(&contact.relationship_status)
        .execute(&self.pool)
        .await?;

        self.order.push(contact.id.clone());
        self.by_id.insert(contact.id.clone(), contact.clone());

        Ok(contact)
    }

    /// Look up a contact in the keyed index. No database round trip.
    pub fn get(&self, id: &str) -> Result<&Contact, StoreError> {
        self.by_id.get(id).ok_or(StoreError::NotFound)
    }

    /// Return contacts in insertion order, optionally narrowed by filter.
    ///
    /// An empty result is not an error. Insertion order follows load order
    /// from the durable store, then append order for later additions.
    pub fn list(&self, filter: &ListFilter) -> Vec<Contact> {
        let mut results: Vec<&Contact> = self
            .order
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .collect();

        if let Some(tag) = filter.tag.as_deref().filter(|t| !t.is_empty()) {
            let tag = tag.to_lowercase();
            results.retain(|c| c.tags.iter().any(|t| t.to_lowercase() == tag));
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            results.retain(|c| contact_matches(c, &needle));
        }

        results.into_iter().cloned().collect()
    }

    /// Apply a sparse patch: only explicitly provided fields change. A field
    /// set to an explicit empty value is still applied; an omitted field is
    /// not. An empty patch returns the unchanged contact without touching
    /// the durable store.
    ///
    /// Email uniqueness is not re-checked here; an update may move a
    /// contact onto another contact's email.
    pub async fn update(&mut self, id: &str, patch: ContactPatch) -> Result<Contact, StoreError> {
        let contact = self.by_id.get_mut(id).ok_or(StoreError::NotFound)?;

        if patch.is_empty() {
            return Ok(contact.clone());
        }

        // Columns and binds are collected in lockstep while the mirror is
        // mutated, so the UPDATE persists exactly the provided field set.
        let mut columns: Vec<&'static str> = Vec::new();
        let mut values: Vec<Option<String>> = Vec::new();

        if let Some(v) = patch.name {
            columns.push("name");
            values.push(Some(v.clone()));
            contact.name = v;
        }
        if let Some(v) = patch.email {
            columns.push("email");
            values.push(Some(v.clone()));
            contact.email = v;
        }
        if let Some(v) = patch.phone {
            columns.push("phone");
            values.push(Some(v.clone()));
            contact.phone = v;
        }
        if let Some(v) = patch.company {
            columns.push("company");
            values.push(v.clone());
            contact.company = v;
        }
        if let Some(v) = patch.position {
            columns.push("position");
            values.push(v.clone());
            contact.position = v;
        }
        if let Some(v) = patch.linkedin {
            columns.push("linkedin");
            values.push(v.clone());
            contact.linkedin = v;
        }
        if let Some(v) = patch.tags {
            columns.push("tags");
            values.push(Some(join_tags(&v)));
            contact.tags = v;
        }
        if let Some(v) = patch.notes {
            columns.push("notes");
            values.push(Some(v.clone()));
            contact.notes = v;
        }
        if let Some(v) = patch.last_contact_date {
            columns.push("last_contact_date");
            values.push(v.clone());
            contact.last_contact_date = v;
        }
        if let Some(v) = patch.relationship_status {
            columns.push("relationship_status");
            values.push(Some(v.clone()));
            contact.relationship_status = v;
        }

        let updated = contact.clone();

        let assignments = columns
            .iter()
            .map(|c| format!("{} = ?", c))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE contacts SET {} WHERE id = ?", assignments);

        let mut query = sqlx::query(&sql);
        for value in values {
            query = query.bind(value);
        }
        query.bind(id).execute(&self.pool).await?;

        Ok(updated)
    }

    /// Remove a contact. Existence is decided by the keyed index; the
    /// durable DELETE then runs unconditionally.
    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        if self.by_id.remove(id).is_none() {
            return Err(StoreError::NotFound);
        }
        self.order.retain(|existing| existing != id);

        sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Number of live contacts in the mirror.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// True when the lowercased needle appears in any searched field.
fn contact_matches(contact: &Contact, needle: &str) -> bool {
    let in_opt =
        |field: &Option<String>| field.as_deref().unwrap_or("").to_lowercase().contains(needle);

    contact.name.to_lowercase().contains(needle)
        || contact.phone.to_lowercase().contains(needle)
        || contact.email.to_lowercase().contains(needle)
        || in_opt(&contact.company)
        || in_opt(&contact.position)
        || in_opt(&contact.linkedin)
        || contact.notes.to_lowercase().contains(needle)
        || contact
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

fn split_tags(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(str::to_string).collect()
}

fn row_to_contact(row: &sqlx::sqlite::SqliteRow) -> Contact {
    let tags: String = row.get("tags");
    Contact {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        company: row.get("company"),
        position: row.get("position"),
        linkedin: row.get("linkedin"),
        tags: split_tags(&tags),
        notes: row.get("notes"),
        last_contact_date: row.get("last_contact_date"),
        relationship_status: row.get("relationship_status"),
    }
}
