//! Unified OpenAI-compatible provider.
//!
//! A single struct that handles chat completions for every supported
//! backend. Providers are distinguished only by endpoint URL, auth style,
//! and API key.

use async_trait::async_trait;
use serde_json::{Value, json};

use veribot_core::config::VeribotConfig;
use veribot_core::error::{Result, VeribotError};
use veribot_core::traits::Provider;

use crate::registry::{AuthStyle, ProviderConfig};

/// A provider that works with any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    name: String,
    api_key: String,
    base_url: String,
    chat_path: String,
    auth_style: AuthStyle,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from a registry entry + config.
    ///
    /// Resolution order:
    /// - API key: `config.api_key` > env vars > empty
    /// - Base URL: `config.api_base_url` > env override > registry default
    pub fn from_registry(entry: &ProviderConfig, config: &VeribotConfig) -> Self {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            entry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok())
                .unwrap_or_default()
        };

        let base_url = if !config.api_base_url.is_empty() {
            config.api_base_url.clone()
        } else {
            entry
                .base_url_env
                .and_then(|env_key| {
                    let val = std::env::var(env_key).ok()?;
                    // OLLAMA_HOST style values usually lack the /v1 suffix
                    if val.ends_with("/v1") {
                        Some(val)
                    } else {
                        Some(format!("{}/v1", val.trim_end_matches('/')))
                    }
                })
                .unwrap_or_else(|| entry.base_url.to_string())
        };

        Self {
            name: entry.name.to_string(),
            api_key,
            base_url,
            chat_path: entry.chat_path.to_string(),
            auth_style: entry.auth_style,
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            client: reqwest::Client::new(),
        }
    }

    /// Create for a custom endpoint (e.g., "custom:https://my-server.com/v1").
    pub fn custom(endpoint: &str, config: &VeribotConfig) -> Self {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();

        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            std::env::var("CUSTOM_API_KEY").unwrap_or_default()
        };

        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        Self {
            name: "custom".to_string(),
            api_key,
            base_url,
            chat_path: "/chat/completions".to_string(),
            auth_style,
            model: config.default_model.clone(),
            temperature: config.default_temperature,
            client: reqwest::Client::new(),
        }
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }

}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.auth_style != AuthStyle::None && self.api_key.is_empty() {
            return Err(VeribotError::ApiKeyMissing(self.name.clone()));
        }

        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{"role": "user", "content": prompt}],
        });

        let url = format!("{}{}", self.base_url, self.chat_path);
        tracing::debug!("🤖 {} chat request → {url} (model={})", self.name, self.model);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        let req = self.apply_auth(req);

        let resp = req.send().await.map_err(|e| {
            VeribotError::Http(format!("{} connection failed ({}): {}", self.name, url, e))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(VeribotError::Provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| VeribotError::Http(e.to_string()))?;

        json["choices"]
            .get(0)
            .and_then(|choice| choice["message"]["content"].as_str())
            .map(String::from)
            .ok_or_else(|| VeribotError::Provider("No content in response".into()))
    }

    async fn health_check(&self) -> Result<bool> {
        if self.auth_style != AuthStyle::None {
            // For cloud providers, just check if an API key is set
            return Ok(!self.api_key.is_empty());
        }

        // For local servers, try to connect
        let url = format!("{}/models", self.base_url);
        Ok(self.client.get(&url).send().await.is_ok())
    }
}
