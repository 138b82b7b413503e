//! Wire encoding for miner API requests and responses.
//!
//! A request is a single JSON object, `{"command": ..., "parameter": ...}`.
//! Multi-argument commands join their arguments with commas after escaping
//! backslashes and commas; single-argument commands send the value as is. A
//! response is a JSON object whose keys are section names (`STATUS`, `POOLS`,
//! ...) mapping to arrays of records.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ApiError;

/// One record of a response section, keyed by the miner's field names.
pub type Record = Map<String, Value>;

/// Arguments attached to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Parameter {
    /// The command takes no argument.
    #[default]
    None,
    /// A single bare value, sent without escaping.
    Scalar(String),
    /// Several values, escaped and comma-joined.
    List(Vec<String>),
}

/// A named miner command with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    parameter: Parameter,
}

impl Command {
    /// Builds a command without arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: Parameter::None,
        }
    }

    /// Builds a command with a single bare argument such as a pool id.
    #[must_use]
    pub fn with_scalar(name: impl Into<String>, value: impl ToString) -> Self {
        Self {
            name: name.into(),
            parameter: Parameter::Scalar(value.to_string()),
        }
    }

    /// Builds a command whose arguments are escaped and comma-joined.
    #[must_use]
    pub fn with_list<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameter: Parameter::List(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Command name as sent to the miner.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments carried by the command.
    #[must_use]
    pub const fn parameter(&self) -> &Parameter {
        &self.parameter
    }
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter: Option<String>,
}

impl<'a> From<&'a Command> for WireMessage<'a> {
    fn from(command: &'a Command) -> Self {
        let parameter = match &command.parameter {
            Parameter::None => None,
            Parameter::Scalar(value) => Some(value.clone()),
            Parameter::List(values) if values.is_empty() => None,
            Parameter::List(values) => Some(
                values
                    .iter()
                    .map(|value| escape(value))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        };
        Self {
            command: &command.name,
            parameter,
        }
    }
}

/// Serialises a command into the request bytes sent to the miner.
///
/// # Errors
///
/// Returns [`ApiError::Encode`] if JSON serialisation fails.
pub fn encode(command: &Command) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(&WireMessage::from(command)).map_err(ApiError::Encode)
}

/// Escapes one list argument: `\` becomes `\\` and `,` becomes `\,`.
#[must_use]
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        if matches!(character, '\\' | ',') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

/// Splits a joined parameter string on unescaped commas and unescapes each
/// element. This is the inverse of the list encoding.
#[must_use]
pub fn split_parameters(joined: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut characters = joined.chars();
    while let Some(character) = characters.next() {
        match character {
            '\\' => {
                if let Some(next) = characters.next() {
                    current.push(next);
                }
            }
            ',' => values.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    values.push(current);
    values
}

/// A decoded miner response: section name to records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedResponse {
    sections: Map<String, Value>,
}

impl DecodedResponse {
    /// Whether the response had no top-level keys at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Borrows the records of a section. Missing sections, non-array
    /// sections and non-object entries all read as nothing.
    pub fn records<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Record> + 'a {
        self.sections
            .get(name)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    /// Returns the record at `index` of a section, if present.
    #[must_use]
    pub fn record(&self, name: &str, index: usize) -> Option<&Record> {
        self.sections
            .get(name)
            .and_then(Value::as_array)
            .and_then(|records| records.get(index))
            .and_then(Value::as_object)
    }

    /// Takes ownership of a section's records, empty when absent.
    #[must_use]
    pub fn into_section(mut self, name: &str) -> Vec<Record> {
        match self.sections.remove(name) {
            Some(Value::Array(records)) => records
                .into_iter()
                .filter_map(|record| match record {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Decodes a raw response into its sections.
///
/// Surrounding whitespace (miners often send a trailing NUL or newline) is
/// trimmed first. Anything that is not a UTF-8 encoded JSON object fails.
///
/// # Errors
///
/// Returns [`ApiError::MalformedResponse`] carrying the raw payload.
pub fn decode(raw: &[u8]) -> Result<DecodedResponse, ApiError> {
    let malformed = |source: Option<serde_json::Error>| ApiError::MalformedResponse {
        raw_payload: String::from_utf8_lossy(raw).into_owned(),
        source,
    };
    let text = std::str::from_utf8(raw).map_err(|_| malformed(None))?;
    let trimmed = text.trim_matches(|character: char| character.is_whitespace() || character == '\0');
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(sections)) => Ok(DecodedResponse { sections }),
        Ok(_) => Err(malformed(None)),
        Err(error) => Err(malformed(Some(error))),
    }
}
