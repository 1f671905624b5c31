//! Record model and JSON persistence for the knowledge store.
//!
//! The store owns its collections and is loaded fully into memory at
//! construction. Every mutation writes the whole file back (write-through,
//! no batching). Mutations return `Result` so callers decide whether a
//! failed save matters; the in-memory state is updated either way.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use veribot_core::error::{Result, VeribotError};

use crate::semantics::Semantics;

/// A free-text document with extracted keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub added: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// One question/answer pair. Grouped by category in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqRecord {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub added: String,
}

/// A named place, keyed by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub address: String,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    #[serde(default)]
    pub added: String,
}

/// A dated event. Date and time are stored verbatim, unvalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub name: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub added: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreMeta {
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub last_updated: String,
}

/// The persisted shape of the store. `BTreeMap`s keep iteration (and with
/// it result tie-breaking) deterministic. Missing fields deserialize to
/// their defaults so older files keep loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeData {
    #[serde(default)]
    pub documents: BTreeMap<String, DocumentRecord>,
    #[serde(default)]
    pub faqs: BTreeMap<String, BTreeMap<String, FaqRecord>>,
    #[serde(default)]
    pub locations: BTreeMap<String, LocationRecord>,
    #[serde(default)]
    pub schedules: BTreeMap<String, ScheduleRecord>,
    #[serde(default)]
    pub meta: StoreMeta,
}

impl KnowledgeData {
    fn fresh() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            meta: StoreMeta {
                created: now.clone(),
                last_updated: now,
            },
            ..Self::default()
        }
    }
}

/// Counts reported by `stats()`.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub documents: usize,
    pub faqs: usize,
    pub locations: usize,
    pub schedules: usize,
    pub last_updated: String,
}

/// The knowledge store: all records plus the compiled rule set.
pub struct KnowledgeStore {
    path: PathBuf,
    pub(crate) data: KnowledgeData,
    pub(crate) rules: Semantics,
}

impl KnowledgeStore {
    /// Open the store at `path`. A missing or unreadable file falls back to
    /// an empty store; the store keeps operating in memory either way.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<KnowledgeData>(&text) {
                Ok(data) => {
                    tracing::info!("📚 Loaded knowledge base from {}", path.display());
                    data
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Knowledge file {} unreadable ({e}) — starting empty",
                        path.display()
                    );
                    KnowledgeData::fresh()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => KnowledgeData::fresh(),
            Err(e) => {
                tracing::warn!(
                    "⚠️ Could not read knowledge file {} ({e}) — starting empty",
                    path.display()
                );
                KnowledgeData::fresh()
            }
        };

        Self {
            path,
            data,
            rules: Semantics::new(),
        }
    }

    /// Write the whole store back to disk.
    pub fn save(&mut self) -> Result<()> {
        self.data.meta.last_updated = chrono::Utc::now().to_rfc3339();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| VeribotError::Store(format!("serialize knowledge base: {e}")))?;
        std::fs::write(&self.path, json)?;
        tracing::debug!("💾 Knowledge base saved to {}", self.path.display());
        Ok(())
    }

    /// Add (or overwrite) a document. Keywords are extracted from the
    /// content; the key is derived from the name.
    pub fn add_document(
        &mut self,
        name: &str,
        content: &str,
        metadata: BTreeMap<String, String>,
    ) -> Result<()> {
        let key = content_key(name);
        let keywords = self.rules.extract_keywords(content);
        self.data.documents.insert(
            key,
            DocumentRecord {
                name: name.to_string(),
                content: content.to_string(),
                metadata,
                added: chrono::Utc::now().to_rfc3339(),
                keywords,
            },
        );
        self.save()?;
        tracing::info!("Added document: {name}");
        Ok(())
    }

    /// Add (or overwrite) a FAQ in a category. Missing keywords default to
    /// extraction over question + answer.
    pub fn add_faq(
        &mut self,
        category: &str,
        question: &str,
        answer: &str,
        keywords: Option<Vec<String>>,
    ) -> Result<()> {
        let key = content_key(question);
        let keywords = keywords
            .unwrap_or_else(|| self.rules.extract_keywords(&format!("{question} {answer}")));
        self.data.faqs.entry(category.to_string()).or_default().insert(
            key,
            FaqRecord {
                question: question.to_string(),
                answer: answer.to_string(),
                keywords,
                added: chrono::Utc::now().to_rfc3339(),
            },
        );
        self.save()?;
        tracing::info!("Added FAQ: {question}");
        Ok(())
    }

    /// Add (or overwrite) a location, keyed by name.
    pub fn add_location(
        &mut self,
        name: &str,
        address: &str,
        details: BTreeMap<String, String>,
    ) -> Result<()> {
        self.data.locations.insert(
            name.to_string(),
            LocationRecord {
                address: address.to_string(),
                details,
                added: chrono::Utc::now().to_rfc3339(),
            },
        );
        self.save()?;
        tracing::info!("Added location: {name}");
        Ok(())
    }

    /// Add (or overwrite) a schedule entry. Date and time strings are
    /// stored verbatim.
    pub fn add_schedule(
        &mut self,
        name: &str,
        date: &str,
        time: &str,
        description: &str,
    ) -> Result<()> {
        let key = content_key(&format!("{name}{date}{time}"));
        self.data.schedules.insert(
            key,
            ScheduleRecord {
                name: name.to_string(),
                date: date.to_string(),
                time: time.to_string(),
                description: description.to_string(),
                added: chrono::Utc::now().to_rfc3339(),
            },
        );
        self.save()?;
        tracing::info!("Added schedule: {name} on {date}");
        Ok(())
    }

    /// Upsert one document per `name → content` entry from an external
    /// source. Returns how many documents were written.
    pub fn sync_documents(&mut self, documents: &BTreeMap<String, String>) -> Result<usize> {
        for (name, content) in documents {
            self.add_document(name, content, BTreeMap::new())?;
        }
        Ok(documents.len())
    }

    /// All FAQs in one category, in key order.
    pub fn faqs_in_category(&self, category: &str) -> Vec<&FaqRecord> {
        self.data
            .faqs
            .get(category)
            .map(|faqs| faqs.values().collect())
            .unwrap_or_default()
    }

    pub fn locations(&self) -> &BTreeMap<String, LocationRecord> {
        &self.data.locations
    }

    pub fn schedules(&self) -> &BTreeMap<String, ScheduleRecord> {
        &self.data.schedules
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            documents: self.data.documents.len(),
            faqs: self.data.faqs.values().map(BTreeMap::len).sum(),
            locations: self.data.locations.len(),
            schedules: self.data.schedules.len(),
            last_updated: self.data.meta.last_updated.clone(),
        }
    }
}

/// Deterministic content-derived record key.
fn content_key(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> KnowledgeStore {
        let dir = std::env::temp_dir().join("veribot-store-tests");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join(name);
        std::fs::remove_file(&path).ok();
        KnowledgeStore::open(path)
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let store = temp_store("missing.json");
        let stats = store.stats();
        assert_eq!(stats.documents, 0);
        assert_eq!(stats.faqs, 0);
    }

    #[test]
    fn test_open_corrupt_file_starts_empty() {
        let dir = std::env::temp_dir().join("veribot-store-tests");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join("corrupt.json");
        std::fs::write(&path, "not json at all {").unwrap();
        let store = KnowledgeStore::open(&path);
        assert_eq!(store.stats().documents, 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_content_key_is_deterministic() {
        assert_eq!(content_key("注册流程"), content_key("注册流程"));
        assert_ne!(content_key("注册流程"), content_key("报到流程"));
    }

    #[test]
    fn test_faq_keywords_default_to_extraction() {
        let mut store = temp_store("faq-keywords.json");
        store
            .add_faq("general", "晚间活动必须参加吗", "是的，晚间活动需要出席。", None)
            .unwrap();
        let faqs = store.faqs_in_category("general");
        assert_eq!(faqs.len(), 1);
        assert!(faqs[0].keywords.contains(&"晚间活动必须参加吗".to_string()));
        assert!(faqs[0].keywords.contains(&"活".to_string()));
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let dir = std::env::temp_dir().join("veribot-store-tests");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join("round-trip.json");
        std::fs::remove_file(&path).ok();

        let mut store = KnowledgeStore::open(&path);
        store
            .add_document("行前须知", "报到时间为7月20日13:30。", BTreeMap::new())
            .unwrap();
        store
            .add_faq("registration", "如何报到？", "请于13:30到主楼签到。", None)
            .unwrap();
        store
            .add_location("主校区", "上海市浦东新区申启路100号", BTreeMap::new())
            .unwrap();
        store.add_schedule("开营仪式", "2026-07-20", "15:00", "").unwrap();

        let reloaded = KnowledgeStore::open(&path);
        assert_eq!(reloaded.data.documents, store.data.documents);
        assert_eq!(reloaded.data.faqs, store.data.faqs);
        assert_eq!(reloaded.data.locations, store.data.locations);
        assert_eq!(reloaded.data.schedules, store.data.schedules);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_add_overwrites_same_key() {
        let mut store = temp_store("overwrite.json");
        store.add_document("须知", "第一版", BTreeMap::new()).unwrap();
        store.add_document("须知", "第二版", BTreeMap::new()).unwrap();
        assert_eq!(store.stats().documents, 1);
        let doc = store.data.documents.values().next().unwrap();
        assert_eq!(doc.content, "第二版");
    }

    #[test]
    fn test_sync_documents_upserts_each_entry() {
        let mut store = temp_store("sync.json");
        let mut docs = BTreeMap::new();
        docs.insert("一号文档".to_string(), "内容一".to_string());
        docs.insert("二号文档".to_string(), "内容二".to_string());
        assert_eq!(store.sync_documents(&docs).unwrap(), 2);
        assert_eq!(store.stats().documents, 2);
    }

    #[test]
    fn test_malformed_dates_stored_verbatim() {
        let mut store = temp_store("verbatim.json");
        store.add_schedule("活动", "someday", "whenever", "").unwrap();
        let rec = store.schedules().values().next().unwrap();
        assert_eq!(rec.date, "someday");
        assert_eq!(rec.time, "whenever");
    }
}
