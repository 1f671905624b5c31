//! Collaborator traits: the LLM provider and the external document source.
//!
//! Both are consumed behind trait objects so the engine can run in degraded
//! mode (canned fallbacks, no refresh) when neither is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;

/// A text-completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g. "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a prompt, return the model's text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Cheap availability probe.
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Metadata for one document in an external source.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// RFC 3339 modification timestamp, when the source provides one.
    pub modified: String,
}

/// A read-only source of named text documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// List every document the source exposes.
    async fn list_documents(&self) -> Result<Vec<DocumentMeta>>;

    /// Fetch a document's text; `None` when the document is absent or
    /// unreadable.
    async fn content(&self, id: &str) -> Result<Option<String>>;

    /// `name -> content` for every readable document. Documents whose
    /// content cannot be fetched are skipped.
    async fn collect(&self) -> Result<BTreeMap<String, String>> {
        let mut contents = BTreeMap::new();
        for doc in self.list_documents().await? {
            if let Some(text) = self.content(&doc.id).await? {
                contents.insert(doc.name, text);
            }
        }
        Ok(contents)
    }
}
