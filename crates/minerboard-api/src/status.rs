//! Interpretation of the `STATUS` record attached to miner responses.

use std::fmt;

use serde_json::Value;

use crate::ApiError;
use crate::codec::{DecodedResponse, Record};

/// Section holding the status record.
pub const STATUS_SECTION: &str = "STATUS";

const MISSING_STATUS_MESSAGE: &str = "Missing STATUS response";
const MISSING_STATUS_CODE: i64 = -6;
const DEFAULT_SUCCESS_MESSAGE: &str = "Completed successfully.";
const DEFAULT_FAILURE_MESSAGE: &str = "Message missing";
const DEFAULT_FAILURE_CODE: i64 = -10;

/// Severity letter reported in `STATUS.STATUS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    /// `S`
    Success,
    /// `W`
    Warning,
    /// `I`
    Info,
    /// `E`
    Error,
    /// Anything else the miner might send.
    Other(String),
}

impl StatusKind {
    fn parse(letter: &str) -> Self {
        match letter {
            "S" => Self::Success,
            "W" => Self::Warning,
            "I" => Self::Info,
            "E" => Self::Error,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => formatter.write_str("S"),
            Self::Warning => formatter.write_str("W"),
            Self::Info => formatter.write_str("I"),
            Self::Error => formatter.write_str("E"),
            Self::Other(letter) => formatter.write_str(letter),
        }
    }
}

/// The first record of the `STATUS` section, with absent fields left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    /// Severity; `E` when the field is missing.
    pub kind: StatusKind,
    /// `Msg`, if present.
    pub message: Option<String>,
    /// `Code`, if present and numeric.
    pub code: Option<i64>,
}

impl StatusRecord {
    /// Extracts the status record, substituting a synthetic error record when
    /// the response carries none.
    #[must_use]
    pub fn from_response(response: &DecodedResponse) -> Self {
        response
            .record(STATUS_SECTION, 0)
            .map_or_else(Self::missing, Self::from_record)
    }

    fn missing() -> Self {
        Self {
            kind: StatusKind::Error,
            message: Some(MISSING_STATUS_MESSAGE.to_owned()),
            code: Some(MISSING_STATUS_CODE),
        }
    }

    fn from_record(record: &Record) -> Self {
        let kind = record
            .get("STATUS")
            .and_then(Value::as_str)
            .map_or(StatusKind::Error, StatusKind::parse);
        let message = record.get("Msg").and_then(text_field);
        let code = record.get("Code").and_then(integer_field);
        Self {
            kind,
            message,
            code,
        }
    }

    /// Whether the miner reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }
}

fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().and_then(whole_number)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Whole floats such as `13.0` count as integer codes. Their shortest
/// display form has no fractional part, so it parses as an `i64`.
fn whole_number(value: f64) -> Option<i64> {
    value.to_string().parse().ok()
}

/// Validates the status of a mutating command's response.
///
/// Returns the miner's message on success.
///
/// # Errors
///
/// Returns [`ApiError::DaemonError`] with the miner's code (or `-10` when it
/// sent none) and the message `Invalid status: <STATUS> - <Msg>`. A response
/// with no status record fails with code `-6`.
pub fn check(response: &DecodedResponse) -> Result<String, ApiError> {
    let status = StatusRecord::from_response(response);
    if status.is_success() {
        return Ok(status
            .message
            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_owned()));
    }

    let message = status.message.as_deref().unwrap_or(DEFAULT_FAILURE_MESSAGE);
    Err(ApiError::DaemonError {
        code: status.code.unwrap_or(DEFAULT_FAILURE_CODE),
        message: format!("Invalid status: {} - {message}", status.kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::codec::decode;

    fn daemon_error(raw: &str) -> (i64, String) {
        let response = decode(raw.as_bytes()).expect("decode fixture");
        match check(&response) {
            Err(ApiError::DaemonError { code, message }) => (code, message),
            other => panic!("expected daemon error, got {other:?}"),
        }
    }

    #[test]
    fn success_returns_message() {
        let response = decode(br#"{"STATUS":[{"STATUS":"S","Msg":"ok"}]}"#).expect("decode");
        assert_eq!(check(&response).expect("success"), "ok");
    }

    #[test]
    fn success_without_message_uses_default() {
        let response = decode(br#"{"STATUS":[{"STATUS":"S"}]}"#).expect("decode");
        assert_eq!(check(&response).expect("success"), "Completed successfully.");
    }

    #[test]
    fn error_carries_code_and_message() {
        let (code, message) = daemon_error(r#"{"STATUS":[{"STATUS":"E","Msg":"bad","Code":7}]}"#);
        assert_eq!(code, 7);
        assert_eq!(message, "Invalid status: E - bad");
    }

    #[test]
    fn missing_status_section_is_synthesised() {
        let (code, message) = daemon_error("{}");
        assert_eq!(code, -6);
        assert_eq!(message, "Invalid status: E - Missing STATUS response");
    }

    #[test]
    fn empty_status_section_is_synthesised() {
        let (code, _) = daemon_error(r#"{"STATUS":[]}"#);
        assert_eq!(code, -6);
    }

    #[rstest]
    #[case(r#"{"STATUS":[{"STATUS":"W","Msg":"careful","Code":3}]}"#, 3, "Invalid status: W - careful")]
    #[case(r#"{"STATUS":[{"STATUS":"I","Code":"44"}]}"#, 44, "Invalid status: I - Message missing")]
    #[case(r#"{"STATUS":[{"STATUS":"E","Msg":"bad id","Code":13.0}]}"#, 13, "Invalid status: E - bad id")]
    #[case(r#"{"STATUS":[{"STATUS":"E","Msg":"odd code","Code":13.5}]}"#, -10, "Invalid status: E - odd code")]
    #[case(r#"{"STATUS":[{"Msg":"no letter"}]}"#, -10, "Invalid status: E - no letter")]
    #[case(r#"{"STATUS":[{"STATUS":"X","Msg":"odd"}]}"#, -10, "Invalid status: X - odd")]
    fn non_success_statuses_fail(
        #[case] raw: &str,
        #[case] expected_code: i64,
        #[case] expected_message: &str,
    ) {
        let (code, message) = daemon_error(raw);
        assert_eq!(code, expected_code);
        assert_eq!(message, expected_message);
    }

    #[test]
    fn status_record_exposes_parsed_fields() {
        let response =
            decode(br#"{"STATUS":[{"STATUS":"I","Msg":"info","Code":22}]}"#).expect("decode");
        let status = StatusRecord::from_response(&response);
        assert_eq!(status.kind, StatusKind::Info);
        assert_eq!(status.message.as_deref(), Some("info"));
        assert_eq!(status.code, Some(22));
        assert!(!status.is_success());
    }
}
