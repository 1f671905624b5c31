//! # Veribot Knowledge Base
//!
//! Keyword-ranked knowledge store for the campus assistant.
//! No vector DB, no embeddings — one JSON file and a hand-tuned additive
//! scoring formula over four record kinds (documents, FAQs, locations,
//! schedules).
//!
//! ## How it works
//! ```text
//! User: "学校地址在哪里"
//!   ↓
//! KnowledgeStore.search("学校地址在哪里", 5)
//!   ↓ keyword extraction → intent detection → semantic expansion → scoring
//! Ranked hits across all four record kinds
//!   ↓
//! ChatEngine formats the top hit, or hands the hits to the LLM as context
//! ```

pub mod excerpt;
pub mod search;
pub mod semantics;
pub mod store;

pub use search::SearchHit;
pub use semantics::Semantics;
pub use store::{KnowledgeStore, StoreStats};
