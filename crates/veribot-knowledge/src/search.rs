//! Ranked search over the knowledge store.
//!
//! Scoring is a capped sum of six independent contributions: exact phrase,
//! title hit, expanded-keyword coverage, intent bonus, stored-keyword
//! overlap, and an interrogative bonus. Scores always land in [0, 3.0].

use std::cmp::Ordering;

use serde::Serialize;

use crate::excerpt::extract_excerpt;
use crate::semantics::Semantics;
use crate::store::KnowledgeStore;

/// Upper bound for any relevance score.
const SCORE_CAP: f32 = 3.0;

/// Default result count for callers that do not care.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Synthetic stored keywords for record kinds without their own sets.
const LOCATION_KEYWORDS: &[&str] = &["location", "address", "where"];
const SCHEDULE_KEYWORDS: &[&str] = &["schedule", "time", "date"];

/// One ranked search result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Document {
        id: String,
        name: String,
        excerpt: String,
        score: f32,
    },
    Faq {
        id: String,
        category: String,
        question: String,
        answer: String,
        score: f32,
    },
    Location {
        name: String,
        address: String,
        score: f32,
    },
    Schedule {
        id: String,
        name: String,
        date: String,
        time: String,
        score: f32,
    },
}

impl SearchHit {
    pub fn score(&self) -> f32 {
        match self {
            SearchHit::Document { score, .. }
            | SearchHit::Faq { score, .. }
            | SearchHit::Location { score, .. }
            | SearchHit::Schedule { score, .. } => *score,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SearchHit::Document { .. } => "document",
            SearchHit::Faq { .. } => "faq",
            SearchHit::Location { .. } => "location",
            SearchHit::Schedule { .. } => "schedule",
        }
    }
}

/// Everything derived from the query once, shared across all candidates.
struct Query<'a> {
    raw: String,
    keywords: Vec<String>,
    expanded: Vec<String>,
    intent: &'static str,
    rules: &'a Semantics,
}

impl<'a> Query<'a> {
    fn parse(rules: &'a Semantics, query: &str) -> Option<Self> {
        let raw = query.trim().to_lowercase();
        if raw.is_empty() {
            return None;
        }
        let keywords = rules.extract_keywords(query);
        let intent = rules.detect_intent(query);
        let expanded = rules.expand_keywords(&keywords, intent);
        Some(Self {
            raw,
            keywords,
            expanded,
            intent,
            rules,
        })
    }
}

/// Relevance of one candidate for the query. `stored_keywords` is the
/// candidate's own keyword set (synthetic for locations and schedules).
fn relevance(q: &Query<'_>, content: &str, title: &str, stored_keywords: &[&str]) -> f32 {
    let content = content.to_lowercase();
    let title = title.to_lowercase();
    let mut score = 0.0f32;

    // 1. Exact phrase match.
    if content.contains(&q.raw) {
        score += 2.0;
    }

    // 2. Title relevance.
    if q.keywords.iter().any(|k| title.contains(k.as_str())) {
        score += 1.5;
    }

    // 3. Expanded-keyword coverage of the content.
    if !q.expanded.is_empty() {
        let hits = q
            .expanded
            .iter()
            .filter(|k| content.contains(k.as_str()))
            .count();
        score += hits as f32 / q.expanded.len() as f32 * 1.2;
    }

    // 4. Intent bonus — zero for the general intent.
    if let Some(bonus) = q.rules.intent_bonus(q.intent) {
        let hits = bonus
            .iter()
            .filter(|k| content.contains(*k) || title.contains(*k))
            .count();
        score += hits as f32 / bonus.len() as f32 * 0.8;
    }

    // 5. Stored-keyword overlap with the query keywords.
    if !stored_keywords.is_empty() {
        let hits = stored_keywords
            .iter()
            .filter(|kw| {
                let kw = kw.to_lowercase();
                q.keywords.iter().any(|qk| kw.contains(qk.as_str()))
            })
            .count();
        score += hits as f32 / stored_keywords.len() as f32 * 0.8;
    }

    // 6. Interrogative bonus: question queries score answer-shaped content.
    if q.rules.has_question_marker(&q.raw) {
        let hits = q
            .rules
            .answer_markers()
            .iter()
            .filter(|m| content.contains(*m))
            .count();
        score += (hits as f32 * 0.1).min(0.3);
    }

    score.min(SCORE_CAP)
}

impl KnowledgeStore {
    /// Rank every record against `query` and return the best scoring hits.
    ///
    /// Never fails. Empty or whitespace-only queries return an empty list.
    /// Hits are sorted by score descending; ties break on (kind, record
    /// key) ascending, so repeated searches return identical order.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        let Some(q) = Query::parse(&self.rules, query) else {
            return Vec::new();
        };

        // (score, kind rank, record key, hit)
        let mut ranked: Vec<(f32, u8, String, SearchHit)> = Vec::new();

        for (id, doc) in &self.data.documents {
            let keywords: Vec<&str> = doc.keywords.iter().map(String::as_str).collect();
            let score = relevance(&q, &doc.content, &doc.name, &keywords);
            if score > 0.0 {
                let excerpt = extract_excerpt(&doc.content, &q.expanded, &q.raw);
                ranked.push((
                    score,
                    0,
                    id.clone(),
                    SearchHit::Document {
                        id: id.clone(),
                        name: doc.name.clone(),
                        excerpt,
                        score,
                    },
                ));
            }
        }

        for (category, faqs) in &self.data.faqs {
            for (id, faq) in faqs {
                let content = format!("{} {}", faq.question, faq.answer);
                let keywords: Vec<&str> = faq.keywords.iter().map(String::as_str).collect();
                let score = relevance(&q, &content, &faq.question, &keywords);
                if score > 0.0 {
                    ranked.push((
                        score,
                        1,
                        id.clone(),
                        SearchHit::Faq {
                            id: id.clone(),
                            category: category.clone(),
                            question: faq.question.clone(),
                            answer: faq.answer.clone(),
                            score,
                        },
                    ));
                }
            }
        }

        for (name, location) in &self.data.locations {
            let content = format!("{} {}", name, location.address);
            let score = relevance(&q, &content, name, LOCATION_KEYWORDS);
            if score > 0.0 {
                ranked.push((
                    score,
                    2,
                    name.clone(),
                    SearchHit::Location {
                        name: name.clone(),
                        address: location.address.clone(),
                        score,
                    },
                ));
            }
        }

        for (id, schedule) in &self.data.schedules {
            let content = format!("{} {} {}", schedule.name, schedule.date, schedule.time);
            let score = relevance(&q, &content, &schedule.name, SCHEDULE_KEYWORDS);
            if score > 0.0 {
                ranked.push((
                    score,
                    3,
                    id.clone(),
                    SearchHit::Schedule {
                        id: id.clone(),
                        name: schedule.name.clone(),
                        date: schedule.date.clone(),
                        time: schedule.time.clone(),
                        score,
                    },
                ));
            }
        }

        ranked.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
                .then_with(|| a.2.cmp(&b.2))
        });
        ranked.truncate(max_results);
        ranked.into_iter().map(|(_, _, _, hit)| hit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn mixed_store(name: &str) -> KnowledgeStore {
        let dir = std::env::temp_dir().join("veribot-search-tests");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join(name);
        std::fs::remove_file(&path).ok();

        let mut store = KnowledgeStore::open(path);
        store
            .add_document(
                "行前须知",
                "报到时间为7月20日13:30，请携带身份证件。床垫和床上用品需要自行准备。",
                BTreeMap::new(),
            )
            .unwrap();
        store
            .add_faq(
                "logistics",
                "如何邮寄物品到学校？",
                "快递请寄到门卫室，7月25日后开始代收。",
                None,
            )
            .unwrap();
        store
            .add_location("主校区", "上海市浦东新区申启路100号", BTreeMap::new())
            .unwrap();
        store
            .add_schedule("开营仪式", "2026-07-20", "15:00", "全体参加")
            .unwrap();
        store
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let store = mixed_store("empty-query.json");
        assert!(store.search("", DEFAULT_MAX_RESULTS).is_empty());
        assert!(store.search("   \t  ", DEFAULT_MAX_RESULTS).is_empty());
    }

    #[test]
    fn test_punctuation_only_query_returns_nothing() {
        let store = mixed_store("punctuation.json");
        assert!(store.search("？？？！！", DEFAULT_MAX_RESULTS).is_empty());
    }

    #[test]
    fn test_literal_substring_scores_at_least_two() {
        let store = mixed_store("literal.json");
        let hits = store.search("报到时间为7月20日13:30", DEFAULT_MAX_RESULTS);
        assert!(!hits.is_empty());
        assert!(hits[0].score() >= 2.0);
    }

    #[test]
    fn test_scores_stay_within_cap() {
        let store = mixed_store("cap.json");
        for query in [
            "报到时间为7月20日13:30，请携带身份证件。床垫和床上用品需要自行准备。",
            "如何邮寄物品到学校？",
            "学校地址在哪里",
            "什么时候开始",
            "evening activities",
        ] {
            for hit in store.search(query, 10) {
                let score = hit.score();
                assert!((0.0..=3.0).contains(&score), "score {score} out of range");
            }
        }
    }

    #[test]
    fn test_exact_faq_question_ranks_first() {
        let store = mixed_store("faq-top.json");
        let hits = store.search("如何邮寄物品到学校？", DEFAULT_MAX_RESULTS);
        assert!(matches!(
            &hits[0],
            SearchHit::Faq { question, .. } if question == "如何邮寄物品到学校？"
        ));
    }

    #[test]
    fn test_location_intent_example() {
        let store = mixed_store("location-intent.json");
        let hits = store.search("学校地址在哪里", DEFAULT_MAX_RESULTS);
        let location = hits
            .iter()
            .find(|h| matches!(h, SearchHit::Location { name, .. } if name == "主校区"))
            .expect("location hit present");
        assert!(location.score() > 1.5, "score {} too low", location.score());
    }

    #[test]
    fn test_search_order_is_stable() {
        let store = mixed_store("stable-order.json");
        let first = store.search("学校的时间安排", DEFAULT_MAX_RESULTS);
        let second = store.search("学校的时间安排", DEFAULT_MAX_RESULTS);
        let ids: Vec<_> = first.iter().map(|h| format!("{:?}", h)).collect();
        let ids_again: Vec<_> = second.iter().map(|h| format!("{:?}", h)).collect();
        assert_eq!(ids, ids_again);
    }

    #[test]
    fn test_ties_break_on_record_key() {
        let dir = std::env::temp_dir().join("veribot-search-tests");
        std::fs::create_dir_all(&dir).ok();
        let path = dir.join("tie-break.json");
        std::fs::remove_file(&path).ok();

        let mut store = KnowledgeStore::open(path);
        // Both titles hit on 校 and nothing else differs, so the scores tie
        // and the record key (the location name) decides the order.
        store.add_location("南校区", "南区1号楼", BTreeMap::new()).unwrap();
        store.add_location("北校区", "北区1号楼", BTreeMap::new()).unwrap();

        let hits = store.search("学校地址在哪里", DEFAULT_MAX_RESULTS);
        let names: Vec<_> = hits
            .iter()
            .filter_map(|h| match h {
                SearchHit::Location { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["北校区".to_string(), "南校区".to_string()]);
    }

    #[test]
    fn test_max_results_truncates() {
        let store = mixed_store("truncate.json");
        let all = store.search("学校", 10);
        let one = store.search("学校", 1);
        assert!(all.len() > 1);
        assert_eq!(one.len(), 1);
        assert_eq!(format!("{:?}", one[0]), format!("{:?}", all[0]));
    }

    #[test]
    fn test_document_hits_carry_excerpt() {
        let store = mixed_store("excerpt.json");
        let hits = store.search("床垫需要自己准备吗", DEFAULT_MAX_RESULTS);
        let doc = hits
            .iter()
            .find(|h| matches!(h, SearchHit::Document { .. }))
            .expect("document hit present");
        if let SearchHit::Document { excerpt, .. } = doc {
            assert!(excerpt.contains("床垫"));
        }
    }
}
