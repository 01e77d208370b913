use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db: DbConfig::default(),
            server: ServerConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/contacts.db")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8001".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    /// Base URL of the contact API the agent tools call.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Chat model used for the assistant.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout for backend tool calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Per-request timeout for chat completion calls.
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    /// Upper bound on tool-call rounds within a single user turn.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            llm_timeout_secs: default_llm_timeout_secs(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

fn default_api_base() -> String {
    "http://127.0.0.1:8001/api".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_llm_timeout_secs() -> u64 {
    60
}
fn default_max_tool_rounds() -> u32 {
    8
}

/// Load configuration from a TOML file; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.agent.api_base.is_empty() {
        anyhow::bail!("agent.api_base must not be empty");
    }

    if config.agent.timeout_secs == 0 || config.agent.llm_timeout_secs == 0 {
        anyhow::bail!("agent timeouts must be > 0");
    }

    if config.agent.max_tool_rounds == 0 {
        anyhow::bail!("agent.max_tool_rounds must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("./does-not-exist.toml")).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8001");
        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.agent.max_tool_rounds, 8);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rolodex.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:9000\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.db.path, PathBuf::from("./data/contacts.db"));
        assert_eq!(config.agent.timeout_secs, 10);
    }

    #[test]
    fn zero_rounds_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rolodex.toml");
        std::fs::write(&path, "[agent]\nmax_tool_rounds = 0\n").unwrap();

        assert!(load_config(&path).is_err());
    }
}
