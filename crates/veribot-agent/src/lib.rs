//! # Veribot Agent
//!
//! The chat engine — answers a question from the knowledge base when a
//! confident match exists, escalates to the LLM with retrieved context
//! when one is configured, and degrades to canned replies otherwise.

pub mod responses;
pub mod source;

use std::collections::BTreeMap;

use veribot_core::config::VeribotConfig;
use veribot_core::error::{Result, VeribotError};
use veribot_core::traits::{DocumentSource, Provider};
use veribot_core::types::ChatMessage;
use veribot_knowledge::{KnowledgeStore, SearchHit};

use crate::source::FolderSource;

/// A knowledge hit must score above this to be answered directly.
const DIRECT_ANSWER_THRESHOLD: f32 = 0.5;

/// How many hits are retrieved per question (top answer + LLM context).
const CONTEXT_RESULTS: usize = 3;

/// The veribot chat engine.
pub struct ChatEngine {
    config: VeribotConfig,
    store: KnowledgeStore,
    provider: Option<Box<dyn Provider>>,
    source: Option<Box<dyn DocumentSource>>,
    history: Vec<ChatMessage>,
}

impl ChatEngine {
    /// Create an engine from configuration. A missing provider or source
    /// is a degraded mode, not an error.
    pub fn new(config: VeribotConfig) -> Self {
        let store = KnowledgeStore::open(config.knowledge_path());

        let provider = match veribot_providers::create_provider(&config) {
            Ok(p) => {
                tracing::info!("✅ LLM provider ready: {}", p.name());
                Some(p)
            }
            Err(e) => {
                tracing::warn!("⚠️ LLM provider not available: {e} — canned fallbacks only");
                None
            }
        };

        let source: Option<Box<dyn DocumentSource>> = if config.source.folder.is_empty() {
            None
        } else {
            Some(Box::new(FolderSource::new(&config.source.folder)))
        };

        Self {
            config,
            store,
            provider,
            source,
            history: Vec::new(),
        }
    }

    /// Answer one question. Never fails: every degradation path lands on a
    /// canned reply.
    pub async fn ask(&mut self, question: &str, use_llm: bool) -> String {
        self.history.push(ChatMessage::user(question));

        let response = if responses::is_greeting(question) {
            responses::pick(responses::GREETING_REPLIES).to_string()
        } else if responses::is_farewell(question) {
            responses::pick(responses::FAREWELL_REPLIES).to_string()
        } else {
            let hits = self.store.search(question, CONTEXT_RESULTS);
            match hits.first() {
                Some(top) if top.score() > DIRECT_ANSWER_THRESHOLD => format_hit(top),
                _ if use_llm && self.provider.is_some() => self.llm_answer(question, &hits).await,
                _ => responses::pick(responses::UNKNOWN_REPLIES).to_string(),
            }
        };

        self.history.push(ChatMessage::assistant(&response));
        response
    }

    async fn llm_answer(&self, question: &str, hits: &[SearchHit]) -> String {
        let Some(provider) = self.provider.as_ref() else {
            return responses::pick(responses::UNKNOWN_REPLIES).to_string();
        };

        let context = build_context(hits);
        let prompt = build_prompt(&self.config.identity.persona, question, &context);

        match provider.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => responses::pick(responses::UNKNOWN_REPLIES).to_string(),
            Err(e) => {
                tracing::warn!("⚠️ LLM call failed: {e}");
                responses::pick(responses::UNKNOWN_REPLIES).to_string()
            }
        }
    }

    /// Pull `name → content` from the document source and upsert every
    /// entry into the knowledge base. Returns the document count.
    pub async fn refresh_from_source(&mut self) -> Result<usize> {
        let Some(source) = self.source.as_ref() else {
            return Err(VeribotError::Source("no document source configured".into()));
        };

        let documents = source.collect().await?;
        if documents.is_empty() {
            tracing::warn!("Document source returned nothing");
            return Ok(0);
        }

        let count = self.store.sync_documents(&documents)?;
        tracing::info!("🔄 Knowledge base updated with {count} documents from source");
        Ok(count)
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut KnowledgeStore {
        &mut self.store
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Engine statistics for the stats surfaces (CLI + gateway).
    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "knowledge": self.store.stats(),
            "conversation_history_length": self.history.len(),
            "llm_provider": self.provider.as_ref().map(|p| p.name().to_string()),
            "source_connected": self.source.is_some(),
        })
    }
}

/// Render one hit as a direct answer.
fn format_hit(hit: &SearchHit) -> String {
    match hit {
        SearchHit::Faq {
            question, answer, ..
        } => format!("Q: {question}\nA: {answer}"),
        SearchHit::Location { name, address, .. } => {
            format!("Location: {name}\nAddress: {address}")
        }
        SearchHit::Schedule {
            name, date, time, ..
        } => format!("Event: {name}\nDate: {date}\nTime: {time}"),
        SearchHit::Document { name, excerpt, .. } => {
            format!("From document '{name}':\n{excerpt}")
        }
    }
}

/// Flatten hits into a context block for the LLM prompt.
fn build_context(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No specific information found in the knowledge base.".to_string();
    }

    let parts: Vec<String> = hits
        .iter()
        .map(|hit| match hit {
            SearchHit::Faq {
                question, answer, ..
            } => format!("FAQ: {question} - {answer}"),
            SearchHit::Location { name, address, .. } => {
                format!("Location: {name} at {address}")
            }
            SearchHit::Schedule {
                name, date, time, ..
            } => format!("Schedule: {name} on {date} at {time}"),
            SearchHit::Document { name, excerpt, .. } => {
                format!("Document '{name}': {excerpt}")
            }
        })
        .collect();

    parts.join("\n")
}

fn build_prompt(persona: &str, question: &str, context: &str) -> String {
    format!(
        "You are {persona}. Answer the user's question based on the provided \
context and your general knowledge about educational programs.\n\n\
Context from knowledge base:\n{context}\n\n\
User question: {question}\n\n\
Please provide a helpful, accurate, and friendly response. If the context \
doesn't contain enough information, you can provide general guidance but \
clearly indicate when information is not specific to this program.\n\n\
Response:"
    )
}

/// Seed a handful of records so a fresh install can answer something.
pub fn seed_demo_data(store: &mut KnowledgeStore) -> Result<()> {
    store.add_location("主校区", "上海市浦东新区申启路100号", BTreeMap::new())?;
    store.add_schedule("开营报到", "2026-07-20", "13:30", "携带身份证件")?;
    store.add_faq(
        "general",
        "我需要准备什么床上用品？",
        "床垫和床上用品需要自行准备，宿舍不提供枕头和被子。",
        None,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use veribot_core::types::Role;

    fn test_engine(name: &str) -> ChatEngine {
        let dir = std::env::temp_dir().join("veribot-agent-tests");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join(name);
        std::fs::remove_file(&path).ok();

        let mut config = VeribotConfig::default();
        config.knowledge.path = path.display().to_string();
        ChatEngine::new(config)
    }

    #[tokio::test]
    async fn test_greeting_gets_canned_reply() {
        let mut engine = test_engine("greeting.json");
        let reply = engine.ask("你好！", false).await;
        assert!(responses::GREETING_REPLIES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn test_farewell_gets_canned_reply() {
        let mut engine = test_engine("farewell.json");
        let reply = engine.ask("谢谢，再见！", false).await;
        assert!(responses::FAREWELL_REPLIES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn test_confident_hit_is_answered_directly() {
        let mut engine = test_engine("direct.json");
        seed_demo_data(engine.store_mut()).unwrap();
        let reply = engine.ask("我需要准备什么床上用品？", false).await;
        assert!(reply.starts_with("Q: 我需要准备什么床上用品？"));
        assert!(reply.contains("床垫和床上用品需要自行准备"));
    }

    #[tokio::test]
    async fn test_unknown_question_without_llm_falls_back() {
        let mut engine = test_engine("unknown.json");
        let reply = engine.ask("量子物理的作业怎么交", false).await;
        assert!(responses::UNKNOWN_REPLIES.contains(&reply.as_str()));
    }

    #[tokio::test]
    async fn test_history_records_both_turns() {
        let mut engine = test_engine("history.json");
        engine.ask("你好", false).await;
        let history = engine.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);

        engine.clear_history();
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_without_source_errors() {
        let mut engine = test_engine("no-source.json");
        assert!(engine.refresh_from_source().await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_from_folder_source() {
        let docs_dir = std::env::temp_dir().join("veribot-agent-tests").join("docs");
        std::fs::remove_dir_all(&docs_dir).ok();
        std::fs::create_dir_all(&docs_dir).ok();
        std::fs::write(docs_dir.join("行前须知.txt"), "报到时间为7月20日13:30。").unwrap();

        let dir = std::env::temp_dir().join("veribot-agent-tests");
        let path = dir.join("refresh.json");
        std::fs::remove_file(&path).ok();

        let mut config = VeribotConfig::default();
        config.knowledge.path = path.display().to_string();
        config.source.folder = docs_dir.display().to_string();

        let mut engine = ChatEngine::new(config);
        assert_eq!(engine.refresh_from_source().await.unwrap(), 1);
        assert_eq!(engine.store().stats().documents, 1);

        std::fs::remove_dir_all(&docs_dir).ok();
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_context_block_mentions_every_hit_kind() {
        let hits = vec![
            SearchHit::Location {
                name: "主校区".into(),
                address: "申启路100号".into(),
                score: 1.0,
            },
            SearchHit::Schedule {
                id: "x".into(),
                name: "开营仪式".into(),
                date: "2026-07-20".into(),
                time: "15:00".into(),
                score: 0.4,
            },
        ];
        let context = build_context(&hits);
        assert!(context.contains("Location: 主校区 at 申启路100号"));
        assert!(context.contains("Schedule: 开营仪式 on 2026-07-20 at 15:00"));
        assert!(build_context(&[]).contains("No specific information"));
    }
}
