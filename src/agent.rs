//! Conversational agent over the contact API.
//!
//! The agent delegates all reasoning to a hosted chat model and all state
//! to the backend: each user turn is sent to the chat-completions API
//! together with the tool schemas from the [`ToolRegistry`]; while the
//! model responds with `tool_calls`, each call is dispatched to the
//! registry, its result appended as a `tool` message, and the conversation
//! re-sent. The loop is bounded by `agent.max_tool_rounds`.
//!
//! ```text
//! user ──▶ chat model ──▶ tool_calls? ──▶ ToolRegistry ──▶ contact API
//!              ▲                │
//!              └── tool results ┘
//! ```
//!
//! Requires `OPENAI_API_KEY` in the environment and a running contact API
//! reachable at `[agent].api_base`.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::BackendClient;
use crate::config::{AgentConfig, Config};
use crate::tools::ToolRegistry;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "\
You are a professional contact management assistant.

Your role is to help the user understand, filter, and act on their contacts,
not to dump raw data.

RULES:
- Interpret the user's intent and call the backend tools when needed.
- The backend API is the single source of truth. Never state whether a \
contact exists, was deleted, or is duplicated without first calling \
get_all_contacts or search_contacts and basing the answer only on that \
response. If the backend contradicts earlier conversation, the backend wins.
- Never invent contact data and never modify data without using a tool.
- For more than a handful of results, summarize (count plus a high-level \
insight) instead of listing every field.
- Always respond in the same language as the user.";

// ============ Wire types ============

/// One message in the chat-completions conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    fn tool_result(call_id: String, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

/// Function name plus JSON-encoded arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

// ============ Agent ============

pub struct Agent {
    config: AgentConfig,
    client: reqwest::Client,
    api_key: String,
    tools: ToolRegistry,
    history: Vec<ChatMessage>,
}

impl Agent {
    pub fn new(config: AgentConfig, tools: ToolRegistry) -> Result<Self> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| anyhow!("OPENAI_API_KEY not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        Ok(Self {
            config,
            client,
            api_key,
            tools,
            history: vec![ChatMessage::text("system", SYSTEM_PROMPT)],
        })
    }

    /// Run one user turn to completion and return the assistant's reply.
    ///
    /// Tool results, including human-readable error strings from failed
    /// backend calls, are fed back to the model, which decides how to
    /// phrase the outcome.
    pub async fn run_turn(&mut self, user_input: &str) -> Result<String> {
        self.history.push(ChatMessage::text("user", user_input));

        for _round in 0..self.config.max_tool_rounds {
            let message = self.complete().await?;
            self.history.push(message.clone());

            if message.tool_calls.is_empty() {
                return Ok(message.content.unwrap_or_default());
            }

            for call in &message.tool_calls {
                let content = match self.dispatch(call).await {
                    Ok(Value::String(text)) => text,
                    Ok(other) => other.to_string(),
                    Err(e) => format!("Error: {:#}", e),
                };
                tracing::info!(tool = %call.function.name, "tool call completed");
                self.history
                    .push(ChatMessage::tool_result(call.id.clone(), content));
            }
        }

        bail!(
            "agent exceeded {} tool rounds without a final answer",
            self.config.max_tool_rounds
        )
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Value> {
        let tool = self
            .tools
            .find(&call.function.name)
            .ok_or_else(|| anyhow!("no tool registered with name: {}", call.function.name))?;

        let args: Value = if call.function.arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str(&call.function.arguments)
                .with_context(|| format!("invalid arguments for tool {}", call.function.name))?
        };

        tool.execute(args).await
    }

    /// One chat-completions request over the full history.
    async fn complete(&self) -> Result<ChatMessage> {
        let body = json!({
            "model": self.config.model,
            "messages": self.history,
            "tools": self.tools.schemas(),
            "parallel_tool_calls": false,
        });

        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            bail!("OpenAI API error {}: {}", status, body_text);
        }

        let json: Value = resp.json().await?;
        let message = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| anyhow!("Invalid chat response: missing choices[0].message"))?;

        let message: ChatMessage = serde_json::from_value(message.clone())
            .with_context(|| "Invalid chat response: malformed message")?;
        Ok(message)
    }
}

/// Interactive REPL around the agent. Exits on an empty line or EOF.
pub async fn run_chat(config: &Config) -> Result<()> {
    let backend = Arc::new(BackendClient::new(
        &config.agent.api_base,
        config.agent.timeout_secs,
    )?);
    let tools = ToolRegistry::with_backend(backend);
    let mut agent = Agent::new(config.agent.clone(), tools)?;

    println!(
        "Contact assistant ({}) — talking to {}",
        config.agent.model, config.agent.api_base
    );
    println!("Empty line or Ctrl-D exits.");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        match agent.run_turn(line).await {
            Ok(reply) => println!("{}", reply),
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    Ok(())
}
