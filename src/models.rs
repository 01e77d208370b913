//! Core data model: the contact record and its request shapes.
//!
//! [`Contact`] is the full stored record. [`ContactDraft`] is the input to
//! `add` (the store assigns `id` and the lifecycle defaults), and
//! [`ContactPatch`] is the sparse input to `update`, where a missing key
//! means "leave unchanged" and an explicit `null` on a nullable field means
//! "clear it".

use serde::{Deserialize, Deserializer, Serialize};

/// A stored contact. `id` is assigned by the store and immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub linkedin: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    pub last_contact_date: Option<String>,
    pub relationship_status: String,
}

/// Candidate fields for a new contact.
///
/// `last_contact_date` starts absent and `relationship_status` defaults to
/// `"active"`; neither can be supplied at creation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Sparse field assignments for `update`.
///
/// Only keys present in the incoming JSON are applied. Fields that are
/// nullable on [`Contact`] use a double `Option`: the outer level tracks
/// "was the key provided", the inner level carries the new value or `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub company: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub linkedin: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_contact_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_status: Option<String>,
}

impl ContactPatch {
    /// True when no field was provided at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.position.is_none()
            && self.linkedin.is_none()
            && self.tags.is_none()
            && self.notes.is_none()
            && self.last_contact_date.is_none()
            && self.relationship_status.is_none()
    }
}

/// Distinguishes a missing key (outer `None`, via `#[serde(default)]`)
/// from an explicit `null` (outer `Some`, inner `None`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Minimal shape check for an email address: one `@`, a non-empty local
/// part, a dotted domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
