//! # Veribot Providers
//!
//! LLM caller for the assistant. All supported backends (OpenAI, DeepSeek,
//! Groq, Ollama) speak the OpenAI chat-completions dialect, so a single
//! `OpenAiCompatibleProvider` covers them; the registry only differs in
//! endpoint URL, auth style, and API-key environment variables.

pub mod openai_compatible;
pub mod registry;

use veribot_core::config::VeribotConfig;
use veribot_core::error::{Result, VeribotError};
use veribot_core::traits::Provider;

/// Create a provider from configuration.
pub fn create_provider(config: &VeribotConfig) -> Result<Box<dyn Provider>> {
    let name = config.default_provider.as_str();

    // Custom endpoint: "custom:https://my-server.com/v1"
    if name.starts_with("custom:") {
        return Ok(Box::new(openai_compatible::OpenAiCompatibleProvider::custom(
            name, config,
        )));
    }

    let entry = registry::get_provider_config(name)
        .ok_or_else(|| VeribotError::ProviderNotFound(name.into()))?;
    Ok(Box::new(
        openai_compatible::OpenAiCompatibleProvider::from_registry(entry, config),
    ))
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = registry::all_provider_names();
    names.push("custom");
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_known_provider() {
        let config = VeribotConfig::default();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let mut config = VeribotConfig::default();
        config.default_provider = "nope".into();
        assert!(matches!(
            create_provider(&config),
            Err(VeribotError::ProviderNotFound(_))
        ));
    }

    #[test]
    fn test_custom_endpoint_accepted() {
        let mut config = VeribotConfig::default();
        config.default_provider = "custom:https://llm.example.com/v1".into();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "custom");
    }

    #[test]
    fn test_available_providers_include_custom() {
        let names = available_providers();
        assert!(names.contains(&"openai"));
        assert!(names.contains(&"ollama"));
        assert!(names.contains(&"custom"));
    }
}
