//! Response envelope printed for every dashboard request.
//!
//! Success is `{"status": 1, ...data}`; failure is
//! `{"status": 0, "code": <code>, "error": <message>}`.

use serde_json::{Map, Value, json};

pub(crate) const STATUS_KEY: &str = "status";

pub(crate) fn success(mut data: Map<String, Value>) -> Value {
    data.entry(STATUS_KEY).or_insert(json!(1));
    Value::Object(data)
}

pub(crate) fn failure(code: i64, error: &str) -> Value {
    json!({ "status": 0, "code": code, "error": error })
}

pub(crate) fn is_success(envelope: &Value) -> bool {
    envelope.get(STATUS_KEY) == Some(&json!(1))
}

/// Compact single-line JSON, or indented JSON in debug mode.
pub(crate) fn render(envelope: &Value, debug: bool) -> Result<String, serde_json::Error> {
    if debug {
        serde_json::to_string_pretty(envelope)
    } else {
        serde_json::to_string(envelope)
    }
}
