//! Static rule tables for the ranker: semantic keyword mappings, intent
//! patterns, and the token scanners.
//!
//! All of this is plain immutable configuration data. The regexes are
//! compiled once when the store is constructed and never change at runtime.

use std::collections::BTreeSet;

use regex::Regex;

/// Concept tag → trigger words. A query keyword appearing verbatim in any
/// list pulls the whole list into the expanded keyword set.
const SEMANTIC_MAPPINGS: &[(&str, &[&str])] = &[
    (
        "address",
        &["地址", "地点", "位置", "校园", "学校", "举办地", "场地", "在哪里", "哪里"],
    ),
    (
        "location",
        &["地址", "地点", "位置", "校园", "学校", "举办地", "场地", "在哪里", "哪里"],
    ),
    (
        "time",
        &["时间", "开始", "结束", "日期", "什么时候", "几点", "报到", "签到"],
    ),
    ("schedule", &["时间安排", "日程", "课表", "活动安排", "时间表"]),
    (
        "behavior",
        &["行为", "不当", "守则", "规则", "行为准则", "违规", "纪律"],
    ),
    (
        "misconduct",
        &["不当行为", "违规", "性骚扰", "歧视", "威胁", "恐吓"],
    ),
    (
        "accommodation",
        &["住宿", "床垫", "床上用品", "枕头", "被子", "宿舍", "居住"],
    ),
    (
        "bedding",
        &["床垫", "床上用品", "枕头", "被子", "床单", "毛巾被"],
    ),
    (
        "activity",
        &["活动", "晚间活动", "参与", "参加", "出席", "必须"],
    ),
    ("evening", &["晚间活动", "晚上", "夜晚", "晚间"]),
    (
        "mailing",
        &["邮寄", "快递", "寄送", "邮递", "运送", "物流"],
    ),
    (
        "shipping",
        &["邮寄", "快递", "寄送", "邮递", "运送", "物流"],
    ),
];

/// Single ideographs that carry enough signal to match on their own.
/// Emitted as extra keywords whenever they occur inside a CJK phrase.
const TRIGGER_CHARS: &[char] = &['址', '点', '间', '始', '束', '住', '活', '为', '垫', '寄', '校'];

/// English stop words dropped during keyword extraction.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Chinese interrogative markers — a query containing one is a question.
const QUESTION_MARKERS: &[&str] = &["什么", "哪里", "怎么", "如何", "可以", "需要", "应该"];

/// Answer-shape markers scored in candidate content for question queries.
const ANSWER_MARKERS: &[&str] = &["是", "在", "于", "需要", "可以", "应该", "建议"];

/// One intent: name, the concept whose trigger list it implies, its match
/// patterns (tested in declared order), and the fixed bonus keyword list
/// used by the intent scoring term.
struct IntentDef {
    name: &'static str,
    concept: &'static str,
    patterns: &'static [&'static str],
    bonus: &'static [&'static str],
}

const INTENTS: &[IntentDef] = &[
    IntentDef {
        name: "location_question",
        concept: "location",
        patterns: &[
            r".*在哪里.*",
            r".*地址.*",
            r".*地点.*",
            r".*位置.*",
            r".*举办地.*",
            r".*校园.*",
            r".*学校.*",
        ],
        bonus: &["地址", "地点", "位置", "校园", "学校", "举办", "浦东", "上海", "申启路"],
    },
    IntentDef {
        name: "time_question",
        concept: "time",
        patterns: &[
            r".*什么时候.*",
            r".*开始时间.*",
            r".*结束时间.*",
            r".*几点.*",
            r".*日期.*",
            r".*时间.*",
        ],
        bonus: &["时间", "日期", "7月", "8月", "开始", "结束", "报到", "签到", "13:30", "18:00"],
    },
    IntentDef {
        name: "behavior_question",
        concept: "behavior",
        patterns: &[
            r".*行为.*定义.*",
            r".*不当行为.*",
            r".*行为守则.*",
            r".*违规.*",
            r".*规则.*",
        ],
        bonus: &["行为", "不当", "守则", "规则", "违规", "性骚扰", "歧视", "威胁"],
    },
    IntentDef {
        name: "accommodation_question",
        concept: "accommodation",
        patterns: &[
            r".*床垫.*",
            r".*住宿.*",
            r".*床上用品.*",
            r".*需要.*买.*",
            r".*自己.*准备.*",
        ],
        bonus: &["床垫", "住宿", "床上用品", "枕头", "被子", "105", "198"],
    },
    IntentDef {
        name: "activity_question",
        concept: "activity",
        patterns: &[
            r".*晚间活动.*",
            r".*可以.*不参加.*",
            r".*必须.*参与.*",
            r".*出席.*",
            r".*活动.*参加.*",
        ],
        bonus: &["晚间活动", "参与", "参加", "出席", "21:40", "22:00"],
    },
    IntentDef {
        name: "mailing_question",
        concept: "mailing",
        patterns: &[
            r".*邮寄.*",
            r".*快递.*",
            r".*寄送.*",
            r".*怎么寄.*",
            r".*如何.*寄.*",
        ],
        bonus: &["邮寄", "快递", "寄送", "7月25", "门卫", "唯理"],
    },
];

/// Intent name returned when no pattern matches.
pub const GENERAL_INTENT: &str = "general";

struct CompiledIntent {
    name: &'static str,
    concept: &'static str,
    patterns: Vec<Regex>,
    bonus: &'static [&'static str],
}

/// Compiled rule set: token scanners plus the intent patterns.
pub struct Semantics {
    cjk: Regex,
    ascii: Regex,
    intents: Vec<CompiledIntent>,
}

impl Semantics {
    pub fn new() -> Self {
        let intents = INTENTS
            .iter()
            .map(|def| CompiledIntent {
                name: def.name,
                concept: def.concept,
                patterns: def
                    .patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("valid static pattern"))
                    .collect(),
                bonus: def.bonus,
            })
            .collect();

        Self {
            cjk: Regex::new(r"[\u{4e00}-\u{9fff}]+").expect("valid static pattern"),
            ascii: Regex::new(r"[A-Za-z]+").expect("valid static pattern"),
            intents,
        }
    }

    /// Extract matching keywords from free text.
    ///
    /// CJK runs of two or more ideographs become phrase keywords; trigger
    /// ideographs inside a run are also emitted on their own. ASCII words
    /// longer than two letters are lower-cased and kept unless they are
    /// stop words. The result is sorted and de-duplicated, so extraction
    /// is deterministic for any input.
    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        let mut keywords = BTreeSet::new();

        for m in self.cjk.find_iter(text) {
            let phrase = m.as_str();
            if phrase.chars().count() >= 2 {
                keywords.insert(phrase.to_string());
                for ch in phrase.chars() {
                    if TRIGGER_CHARS.contains(&ch) {
                        keywords.insert(ch.to_string());
                    }
                }
            }
        }

        for m in self.ascii.find_iter(text) {
            let word = m.as_str().to_lowercase();
            if word.len() > 2 && !STOP_WORDS.contains(&word.as_str()) {
                keywords.insert(word);
            }
        }

        keywords.into_iter().collect()
    }

    /// Classify a query into exactly one intent; first matching pattern
    /// wins, in declared table order.
    pub fn detect_intent(&self, query: &str) -> &'static str {
        let query = query.to_lowercase();
        for intent in &self.intents {
            if intent.patterns.iter().any(|p| p.is_match(&query)) {
                return intent.name;
            }
        }
        GENERAL_INTENT
    }

    /// Widen a keyword set with the semantic mapping table plus the trigger
    /// list of the concept the detected intent implies.
    pub fn expand_keywords(&self, keywords: &[String], intent: &str) -> Vec<String> {
        let mut expanded: BTreeSet<String> = keywords.iter().cloned().collect();

        for keyword in keywords {
            for (_, words) in SEMANTIC_MAPPINGS {
                if words.contains(&keyword.as_str()) {
                    expanded.extend(words.iter().map(|w| (*w).to_string()));
                }
            }
        }

        if let Some(intent) = self.intents.iter().find(|i| i.name == intent) {
            if let Some((_, words)) = SEMANTIC_MAPPINGS.iter().find(|(tag, _)| *tag == intent.concept) {
                expanded.extend(words.iter().map(|w| (*w).to_string()));
            }
        }

        expanded.into_iter().collect()
    }

    /// The fixed bonus keyword list for an intent, if it has one.
    pub fn intent_bonus(&self, intent: &str) -> Option<&'static [&'static str]> {
        self.intents
            .iter()
            .find(|i| i.name == intent)
            .map(|i| i.bonus)
    }

    /// Does the query contain a Chinese interrogative marker?
    pub fn has_question_marker(&self, query: &str) -> bool {
        QUESTION_MARKERS.iter().any(|m| query.contains(m))
    }

    /// Answer-shape markers counted in content for question queries.
    pub fn answer_markers(&self) -> &'static [&'static str] {
        ANSWER_MARKERS
    }
}

impl Default for Semantics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_cjk_phrases_and_triggers() {
        let sem = Semantics::new();
        let keywords = sem.extract_keywords("学校地址在哪里");
        assert!(keywords.contains(&"学校地址在哪里".to_string()));
        assert!(keywords.contains(&"址".to_string()));
        assert!(keywords.contains(&"校".to_string()));
    }

    #[test]
    fn test_extract_filters_stop_words_and_short_words() {
        let sem = Semantics::new();
        let keywords = sem.extract_keywords("The campus is on Shenqi Road");
        assert!(keywords.contains(&"campus".to_string()));
        assert!(keywords.contains(&"road".to_string()));
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"on".to_string()));
        assert!(!keywords.contains(&"is".to_string()));
    }

    #[test]
    fn test_single_ideograph_runs_are_ignored() {
        let sem = Semantics::new();
        // A lone trigger ideograph is not a phrase, so nothing is emitted.
        let keywords = sem.extract_keywords("址");
        assert!(keywords.is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let sem = Semantics::new();
        let text = "书院的晚间活动几点开始？Evening activities start at eight";
        assert_eq!(sem.extract_keywords(text), sem.extract_keywords(text));
    }

    #[test]
    fn test_intent_first_match_wins() {
        let sem = Semantics::new();
        // 地址 also matches location patterns declared before time patterns.
        assert_eq!(sem.detect_intent("开学时间的地址"), "location_question");
        assert_eq!(sem.detect_intent("什么时候开始"), "time_question");
        assert_eq!(sem.detect_intent("晚间活动必须参加吗"), "activity_question");
        assert_eq!(sem.detect_intent("hello there"), GENERAL_INTENT);
    }

    #[test]
    fn test_expansion_pulls_whole_trigger_list() {
        let sem = Semantics::new();
        let expanded = sem.expand_keywords(&["床垫".to_string()], GENERAL_INTENT);
        // 床垫 is in both accommodation and bedding lists.
        assert!(expanded.contains(&"宿舍".to_string()));
        assert!(expanded.contains(&"床单".to_string()));
    }

    #[test]
    fn test_expansion_adds_intent_concept() {
        let sem = Semantics::new();
        let expanded = sem.expand_keywords(&[], "mailing_question");
        assert!(expanded.contains(&"快递".to_string()));
        assert!(sem.expand_keywords(&[], GENERAL_INTENT).is_empty());
    }
}
