//! Display excerpt extraction for document hits.
//!
//! Content is split into sentence-like units, each unit is scored against
//! the query, and the best unit is returned with a trailing context window.
//! All lengths and offsets are measured in characters, never bytes.

/// Sentence terminators used to split content into scoreable units.
const TERMINATORS: &[char] = &['。', '！', '？', '\n'];

/// Trailing context window, in characters.
const WINDOW: usize = 300;

/// Pick the most relevant excerpt of `content` for a query.
///
/// Units shorter than 10 characters are skipped; a unit only wins if it is
/// longer than 20 characters and strictly out-scores the current best.
/// The context window starts at the winning unit's first occurrence in the
/// document, which can land on an earlier duplicate of the unit — kept
/// that way, see DESIGN.md.
pub(crate) fn extract_excerpt(content: &str, expanded_keywords: &[String], query_lower: &str) -> String {
    let mut best: Option<&str> = None;
    let mut best_score = 0usize;

    for unit in content.split(TERMINATORS) {
        let unit = unit.trim();
        if unit.chars().count() < 10 {
            continue;
        }
        let unit_lower = unit.to_lowercase();

        let mut score = 0usize;
        if unit_lower.contains(query_lower) {
            score += 10;
        }
        score += expanded_keywords
            .iter()
            .filter(|k| unit_lower.contains(k.as_str()))
            .count();

        if score > best_score && unit.chars().count() > 20 {
            best_score = score;
            best = Some(unit);
        }
    }

    if let Some(best) = best {
        if let Some(byte_offset) = content.find(best) {
            let char_offset = content[..byte_offset].chars().count();
            if content.chars().count() > char_offset + WINDOW {
                let window: String = content.chars().skip(char_offset).take(WINDOW).collect();
                return format!("{best}{window}");
            }
        }
        return best.to_string();
    }

    // No unit qualified — fall back to the head of the document.
    if content.chars().count() > WINDOW {
        let head: String = content.chars().take(WINDOW).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_unit_wins_on_query_match() {
        let content = "这是一个无关的句子，讲一些别的事情。报到时间为七月二十日下午一点半，请准时到达主楼签到。最后一句也无关。";
        let excerpt = extract_excerpt(content, &[], "报到时间为七月二十日下午一点半");
        assert!(excerpt.starts_with("报到时间为七月二十日下午一点半"));
    }

    #[test]
    fn test_keyword_hits_break_unit_ties() {
        let keywords = vec!["床垫".to_string(), "床上用品".to_string()];
        let content = "书院提供基本的生活设施与公共空间。床垫和床上用品需要自行准备，宿舍不提供枕头被子。";
        let excerpt = extract_excerpt(content, &keywords, "零匹配查询");
        assert!(excerpt.starts_with("床垫和床上用品需要自行准备"));
    }

    #[test]
    fn test_short_units_are_skipped() {
        let content = "短句。另一个明显更长的句子讲了报到相关的详细安排和注意事项。";
        let excerpt = extract_excerpt(content, &["报到".to_string()], "无匹配");
        assert!(excerpt.contains("详细安排"));
        assert!(!excerpt.starts_with("短句"));
    }

    #[test]
    fn test_fallback_is_document_head() {
        let content = "没有命中任何关键词的一段比较长的介绍文字，用来验证回退行为是否正确。";
        let excerpt = extract_excerpt(content, &["快递".to_string()], "邮寄");
        assert_eq!(excerpt, content);
    }

    #[test]
    fn test_fallback_truncates_long_content() {
        let content = "很".repeat(400);
        let excerpt = extract_excerpt(&content, &[], "零匹配");
        assert_eq!(excerpt.chars().count(), WINDOW + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_window_appended_for_long_documents() {
        let tail = "补".repeat(400);
        let content = format!("这一句包含查询词报到时间并且足够长可以当选。{tail}");
        let excerpt = extract_excerpt(&content, &[], "报到时间");
        // Best unit plus a window that restarts at its first occurrence,
        // so the unit shows up twice (terminator stripped from the first).
        assert!(excerpt.starts_with("这一句包含查询词报到时间并且足够长可以当选这一句包含"));
        assert!(excerpt.chars().count() > 300);
    }
}
