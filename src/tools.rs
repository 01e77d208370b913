//! Agent-facing tools over the contact API.
//!
//! Each tool is a named, schema-described operation the LLM can invoke.
//! Tools issue HTTP calls through a shared [`BackendClient`] and return
//! either the decoded payload or a human-readable error string. A failed
//! call is terminal for that single invocation, never retried.
//!
//! The registry is fixed at construction: the five operations below are
//! the whole surface the assistant can reach.
//!
//! | Tool | Backend call |
//! |------|--------------|
//! | `add_contact` | `POST /contacts` |
//! | `get_all_contacts` | `GET /contacts` |
//! | `search_contacts` | `GET /contacts?search=&tag=` |
//! | `update_contact_notes` | `PUT /contacts/{id}` |
//! | `delete_contact` | `DELETE /contacts/{id}` |

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::backend::BackendClient;

/// A named operation the LLM can call.
///
/// `parameters_schema` must be an OpenAI function-calling JSON Schema
/// object (`type: "object"`, `properties`, optionally `required`).
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// One-line description the LLM uses to decide when to call the tool.
    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    async fn execute(&self, params: Value) -> Result<Value>;
}

/// Fixed registry of agent tools.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry pre-loaded with the five contact tools, all sharing one
    /// backend client.
    pub fn with_backend(backend: Arc<BackendClient>) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AddContactTool {
            backend: backend.clone(),
        }));
        registry.register(Box::new(GetAllContactsTool {
            backend: backend.clone(),
        }));
        registry.register(Box::new(SearchContactsTool {
            backend: backend.clone(),
        }));
        registry.register(Box::new(UpdateNotesTool {
            backend: backend.clone(),
        }));
        registry.register(Box::new(DeleteContactTool { backend }));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// The `tools` array for a chat-completions request.
    pub fn schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name(),
                        "description": t.description(),
                        "parameters": t.parameters_schema(),
                    }
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn str_param<'a>(params: &'a Value, key: &str) -> &'a str {
    params[key].as_str().unwrap_or("").trim()
}

/// Empty strings from the LLM become absent optional fields.
fn none_if_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn split_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn error_result(detail: String) -> Value {
    Value::String(format!("Error: {}", detail))
}

// ============ add_contact ============

struct AddContactTool {
    backend: Arc<BackendClient>,
}

#[async_trait]
impl Tool for AddContactTool {
    fn name(&self) -> &str {
        "add_contact"
    }

    fn description(&self) -> &str {
        "Add a new contact. Tags should be comma-separated."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Full name" },
                "email": { "type": "string", "description": "Email address (must be unique)" },
                "phone": { "type": "string", "description": "Phone number" },
                "company": { "type": "string", "description": "Company name" },
                "position": { "type": "string", "description": "Job title" },
                "linkedin": { "type": "string", "description": "LinkedIn profile URL" },
                "tags": { "type": "string", "description": "Comma-separated tags, e.g. \"tech,client\"" },
                "notes": { "type": "string", "description": "Free-form notes" }
            },
            "required": ["name", "email", "phone"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let payload = json!({
            "name": str_param(&params, "name"),
            "email": str_param(&params, "email"),
            "phone": str_param(&params, "phone"),
            "company": none_if_empty(str_param(&params, "company")),
            "position": none_if_empty(str_param(&params, "position")),
            "linkedin": none_if_empty(str_param(&params, "linkedin")),
            "tags": split_tag_list(str_param(&params, "tags")),
            "notes": str_param(&params, "notes"),
        });

        tracing::info!(name = str_param(&params, "name"), "adding contact");

        let resp = self.backend.create_contact(&payload).await?;
        if resp.status == StatusCode::CREATED {
            Ok(resp.body)
        } else {
            Ok(error_result(resp.detail()))
        }
    }
}

// ============ get_all_contacts ============

struct GetAllContactsTool {
    backend: Arc<BackendClient>,
}

#[async_trait]
impl Tool for GetAllContactsTool {
    fn name(&self) -> &str {
        "get_all_contacts"
    }

    fn description(&self) -> &str {
        "Fetch every contact in the system."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: Value) -> Result<Value> {
        let resp = self.backend.list_contacts(None, None).await?;
        if !resp.is_success() {
            return Ok(error_result(resp.detail()));
        }

        match resp.body.as_array().map(|contacts| contacts.is_empty()) {
            Some(true) => Ok(Value::String("No contacts in the system yet.".to_string())),
            Some(false) => Ok(resp.body),
            None => Ok(error_result("Unexpected backend response format".to_string())),
        }
    }
}

// ============ search_contacts ============

struct SearchContactsTool {
    backend: Arc<BackendClient>,
}

#[async_trait]
impl Tool for SearchContactsTool {
    fn name(&self) -> &str {
        "search_contacts"
    }

    fn description(&self) -> &str {
        "Search contacts by name, email, phone, company, notes, or tag."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Substring to search for (case-insensitive)" },
                "tag": { "type": "string", "description": "Match contacts carrying exactly this tag" }
            }
        })
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let query = str_param(&params, "query");
        let tag = str_param(&params, "tag");

        let resp = self
            .backend
            .list_contacts(none_if_empty(query), none_if_empty(tag))
            .await?;
        if !resp.is_success() {
            return Ok(error_result(resp.detail()));
        }

        match resp.body.as_array().map(|contacts| contacts.is_empty()) {
            Some(true) => Ok(Value::String(format!(
                "No contacts found for: {}",
                if query.is_empty() { tag } else { query }
            ))),
            Some(false) => Ok(resp.body),
            None => Ok(error_result("Unexpected backend response format".to_string())),
        }
    }
}

// ============ update_contact_notes ============

struct UpdateNotesTool {
    backend: Arc<BackendClient>,
}

#[async_trait]
impl Tool for UpdateNotesTool {
    fn name(&self) -> &str {
        "update_contact_notes"
    }

    fn description(&self) -> &str {
        "Replace the notes of an existing contact."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "contact_id": { "type": "string", "description": "Id of the contact to update" },
                "notes": { "type": "string", "description": "New notes text" }
            },
            "required": ["contact_id", "notes"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let contact_id = str_param(&params, "contact_id");
        if contact_id.is_empty() {
            anyhow::bail!("contact_id must not be empty");
        }

        let patch = json!({ "notes": params["notes"].as_str().unwrap_or("") });
        let resp = self.backend.update_contact(contact_id, &patch).await?;

        if resp.is_success() {
            Ok(Value::String("Notes updated successfully".to_string()))
        } else {
            Ok(error_result(resp.detail()))
        }
    }
}

// ============ delete_contact ============

struct DeleteContactTool {
    backend: Arc<BackendClient>,
}

#[async_trait]
impl Tool for DeleteContactTool {
    fn name(&self) -> &str {
        "delete_contact"
    }

    fn description(&self) -> &str {
        "Delete a contact permanently."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "contact_id": { "type": "string", "description": "Id of the contact to delete" }
            },
            "required": ["contact_id"]
        })
    }

    async fn execute(&self, params: Value) -> Result<Value> {
        let contact_id = str_param(&params, "contact_id");
        if contact_id.is_empty() {
            anyhow::bail!("contact_id must not be empty");
        }

        let resp = self.backend.delete_contact(contact_id).await?;
        if resp.is_success() {
            Ok(Value::String("Contact deleted successfully".to_string()))
        } else {
            Ok(error_result(resp.detail()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        let backend = Arc::new(BackendClient::new("http://127.0.0.1:8001/api", 5).unwrap());
        ToolRegistry::with_backend(backend)
    }

    #[test]
    fn registry_holds_the_five_contact_tools() {
        let registry = registry();
        assert_eq!(registry.len(), 5);
        for name in [
            "add_contact",
            "get_all_contacts",
            "search_contacts",
            "update_contact_notes",
            "delete_contact",
        ] {
            assert!(registry.find(name).is_some(), "missing tool: {}", name);
        }
        assert!(registry.find("no_such_tool").is_none());
    }

    #[test]
    fn schemas_are_function_declarations() {
        let registry = registry();
        let schemas = registry.schemas();
        assert_eq!(schemas.len(), 5);

        for schema in &schemas {
            assert_eq!(schema["type"], "function");
            let function = &schema["function"];
            assert!(function["name"].is_string());
            assert!(function["description"].is_string());
            assert_eq!(function["parameters"]["type"], "object");
        }
    }

    #[test]
    fn add_contact_requires_identity_fields() {
        let registry = registry();
        let schema = registry.find("add_contact").unwrap().parameters_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["name", "email", "phone"]);
    }

    #[test]
    fn tag_lists_are_trimmed_and_filtered() {
        assert_eq!(split_tag_list("tech, client"), vec!["tech", "client"]);
        assert_eq!(split_tag_list(""), Vec::<String>::new());
        assert_eq!(split_tag_list(" ,tech,, "), vec!["tech"]);
    }
}
