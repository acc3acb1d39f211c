use std::collections::BTreeMap;

use serde::Serialize;

/// Invocation result in the shape hosting platforms expect: a numeric status
/// code, a string-keyed header map, and a string body.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ResponseEnvelope {
    /// 200 envelope carrying a rendered report body.
    ///
    /// Responses are cross-origin readable and marked uncacheable so a
    /// dashboard always shows the latest run.
    pub fn success(body: String, content_type: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        headers.insert("Cache-Control".to_string(), "no-cache".to_string());
        Self {
            status_code: 200,
            headers,
            body,
        }
    }

    /// 500 envelope with a JSON diagnostic body: `{error, details, trace}`.
    pub fn failure(error: &str, details: &str, trace: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        let body = serde_json::json!({
            "error": error,
            "details": details,
            "trace": trace,
        })
        .to_string();
        Self {
            status_code: 500,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}
