//! Veribot configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VeribotConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    /// Overrides the provider registry's base URL when non-empty.
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

fn default_api_key() -> String { String::new() }
fn default_provider() -> String { "openai".into() }
fn default_model() -> String { "gpt-4o-mini".into() }
fn default_temperature() -> f32 { 0.7 }

impl Default for VeribotConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            api_base_url: String::new(),
            knowledge: KnowledgeConfig::default(),
            gateway: GatewayConfig::default(),
            source: SourceConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl VeribotConfig {
    /// Load config from the default path (~/.veribot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::VeribotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::VeribotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VeribotError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the veribot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".veribot")
    }

    /// Resolved path of the persisted knowledge file.
    pub fn knowledge_path(&self) -> PathBuf {
        if self.knowledge.path.is_empty() {
            Self::home_dir().join("knowledge.json")
        } else {
            PathBuf::from(&self.knowledge.path)
        }
    }
}

/// Knowledge store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Path of the persisted JSON file. Empty means ~/.veribot/knowledge.json.
    #[serde(default)]
    pub path: String,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// Document source configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Local folder of .txt/.md documents. Empty disables the source.
    #[serde(default)]
    pub folder: String,
}

/// Assistant identity — name and prompt material for LLM escalation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_persona")]
    pub persona: String,
}

fn default_name() -> String { "Veribot".into() }
fn default_persona() -> String {
    "a helpful assistant for a summer school program".into()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self { name: default_name(), persona: default_persona() }
    }
}
