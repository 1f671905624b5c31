//! API route handlers for the gateway.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Json, extract::State};
use serde_json::Value;

use veribot_knowledge::search::DEFAULT_MAX_RESULTS;

use super::server::AppState;

/// A required string field: present, string-typed, non-empty after trim.
fn required_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// An optional JSON object of string values.
fn string_map(body: &Value, key: &str) -> BTreeMap<String, String> {
    body.get(key)
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// An optional JSON array of strings.
fn string_list(body: &Value, key: &str) -> Option<Vec<String>> {
    body.get(key).and_then(|v| v.as_array()).map(|arr| {
        arr.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}

/// Health check endpoint.
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "veribot-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Online status + uptime.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "online",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "gateway": {
            "host": state.gateway_config.host,
            "port": state.gateway_config.port,
        },
    }))
}

/// Chat endpoint — `{message, use_llm?}`.
pub async fn chat(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Json<Value> {
    let Some(message) = required_str(&body, "message") else {
        return Json(serde_json::json!({
            "ok": false,
            "error": "Message cannot be empty",
        }));
    };
    let use_llm = body["use_llm"].as_bool().unwrap_or(false);

    let response = {
        let mut engine = state.engine.lock().await;
        engine.ask(message, use_llm).await
    };

    Json(serde_json::json!({
        "ok": true,
        "id": uuid::Uuid::new_v4().to_string(),
        "response": response,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "user_message": message,
        "used_llm": use_llm,
    }))
}

/// Engine statistics.
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    let engine = state.engine.lock().await;
    Json(serde_json::json!({
        "ok": true,
        "stats": engine.stats(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Refresh the knowledge base from the configured document source.
pub async fn update_knowledge(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut engine = state.engine.lock().await;
    match engine.refresh_from_source().await {
        Ok(count) => Json(serde_json::json!({
            "ok": true,
            "documents": count,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// Ranked knowledge search — `{query, max_results?}`.
pub async fn knowledge_search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or("");
    let max_results = body["max_results"]
        .as_u64()
        .map(|n| n as usize)
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_MAX_RESULTS);

    let engine = state.engine.lock().await;
    let hits = engine.store().search(query, max_results);
    Json(serde_json::json!({
        "ok": true,
        "count": hits.len(),
        "results": hits,
    }))
}

/// Add a document — `{name, content, metadata?}`.
pub async fn knowledge_add_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let (Some(name), Some(content)) = (required_str(&body, "name"), required_str(&body, "content"))
    else {
        return Json(serde_json::json!({"ok": false, "error": "name and content required"}));
    };
    let metadata = string_map(&body, "metadata");

    let mut engine = state.engine.lock().await;
    match engine.store_mut().add_document(name, content, metadata) {
        Ok(()) => Json(serde_json::json!({"ok": true, "message": format!("Document '{name}' added")})),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// Add a FAQ — `{category, question, answer, keywords?}`.
pub async fn knowledge_add_faq(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let (Some(category), Some(question), Some(answer)) = (
        required_str(&body, "category"),
        required_str(&body, "question"),
        required_str(&body, "answer"),
    ) else {
        return Json(
            serde_json::json!({"ok": false, "error": "category, question and answer required"}),
        );
    };
    let keywords = string_list(&body, "keywords");

    let mut engine = state.engine.lock().await;
    match engine.store_mut().add_faq(category, question, answer, keywords) {
        Ok(()) => Json(serde_json::json!({"ok": true, "message": "FAQ added"})),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// Add a location — `{name, address, details?}`.
pub async fn knowledge_add_location(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let (Some(name), Some(address)) = (required_str(&body, "name"), required_str(&body, "address"))
    else {
        return Json(serde_json::json!({"ok": false, "error": "name and address required"}));
    };
    let details = string_map(&body, "details");

    let mut engine = state.engine.lock().await;
    match engine.store_mut().add_location(name, address, details) {
        Ok(()) => Json(serde_json::json!({"ok": true, "message": format!("Location '{name}' added")})),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// Add a schedule entry — `{name, date, time, description?}`.
pub async fn knowledge_add_schedule(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let (Some(name), Some(date), Some(time)) = (
        required_str(&body, "name"),
        required_str(&body, "date"),
        required_str(&body, "time"),
    ) else {
        return Json(serde_json::json!({"ok": false, "error": "name, date and time required"}));
    };
    let description = body["description"].as_str().unwrap_or("");

    let mut engine = state.engine.lock().await;
    match engine.store_mut().add_schedule(name, date, time, description) {
        Ok(()) => Json(serde_json::json!({"ok": true, "message": format!("Schedule '{name}' added")})),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// All FAQs in one category.
pub async fn knowledge_faqs_by_category(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(category): axum::extract::Path<String>,
) -> Json<Value> {
    let engine = state.engine.lock().await;
    let faqs = engine.store().faqs_in_category(&category);
    Json(serde_json::json!({
        "ok": true,
        "category": category,
        "count": faqs.len(),
        "faqs": faqs,
    }))
}

/// All locations.
pub async fn knowledge_list_locations(State(state): State<Arc<AppState>>) -> Json<Value> {
    let engine = state.engine.lock().await;
    Json(serde_json::json!({"ok": true, "locations": engine.store().locations()}))
}

/// All schedules.
pub async fn knowledge_list_schedules(State(state): State<Arc<AppState>>) -> Json<Value> {
    let engine = state.engine.lock().await;
    Json(serde_json::json!({"ok": true, "schedules": engine.store().schedules()}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_str_rejects_blank_and_missing() {
        let body = serde_json::json!({"message": "  hi  ", "empty": "   ", "number": 7});
        assert_eq!(required_str(&body, "message"), Some("hi"));
        assert_eq!(required_str(&body, "empty"), None);
        assert_eq!(required_str(&body, "number"), None);
        assert_eq!(required_str(&body, "missing"), None);
    }

    #[test]
    fn test_string_map_keeps_string_values_only() {
        let body = serde_json::json!({"metadata": {"kind": "notice", "rank": 3}});
        let map = string_map(&body, "metadata");
        assert_eq!(map.get("kind").map(String::as_str), Some("notice"));
        assert!(!map.contains_key("rank"));
        assert!(string_map(&body, "missing").is_empty());
    }

    #[test]
    fn test_string_list_distinguishes_missing_from_empty() {
        let body = serde_json::json!({"keywords": ["报到", "签到"], "empty": []});
        assert_eq!(
            string_list(&body, "keywords"),
            Some(vec!["报到".to_string(), "签到".to_string()])
        );
        assert_eq!(string_list(&body, "empty"), Some(vec![]));
        assert_eq!(string_list(&body, "missing"), None);
    }
}
