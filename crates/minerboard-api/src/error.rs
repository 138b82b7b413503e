//! Failure taxonomy for miner API calls.
//!
//! Every variant is fatal for the call that produced it; nothing is retried.
//! [`ApiError::code`] maps each failure onto the numeric code surfaced to
//! dashboard clients.

use std::io;

use thiserror::Error;

/// Code reported when a connect failure carries no OS error number.
pub const CONNECT_FAILED_CODE: i64 = -3;
/// Code reported for short writes.
pub const WRITE_INCOMPLETE_CODE: i64 = -1;
/// Code reported for read failures.
pub const READ_ERROR_CODE: i64 = 0;
/// Code reported for responses that could not be decoded.
pub const MALFORMED_RESPONSE_CODE: i64 = -2;
/// Code reported when the miner closed the connection without sending data.
pub const EMPTY_RESPONSE_CODE: i64 = -4;
/// Code reported when a request could not be serialised.
pub const ENCODE_FAILED_CODE: i64 = -5;

/// Errors surfaced by a single miner API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resolving or connecting to the miner failed, or the connect timed out.
    #[error("error connecting to miner at {endpoint} - {reason}")]
    ConnectionFailed {
        /// Endpoint the client tried to reach.
        endpoint: String,
        /// Human readable description of the failure.
        reason: String,
        /// Raw OS error number, when the operating system supplied one.
        os_code: Option<i32>,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The socket accepted fewer bytes than the encoded request.
    #[error("unable to write {expected} bytes, only {actual} written")]
    WriteIncomplete {
        /// Length of the encoded request.
        expected: usize,
        /// Bytes accepted before the write stopped.
        actual: usize,
        /// IO error that stopped the write, if any.
        #[source]
        source: Option<io::Error>,
    },
    /// Reading the response failed, including a read deadline expiring.
    #[error("read error: {0}")]
    ReadError(#[source] io::Error),
    /// The miner closed the connection without sending anything.
    #[error("no data read, connection closed")]
    EmptyResponse,
    /// The response was not a JSON object.
    #[error("unable to parse response ({raw_payload})")]
    MalformedResponse {
        /// Response text as received, lossily decoded as UTF-8.
        raw_payload: String,
        /// Parser error, absent when the payload was valid JSON of the wrong shape.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// The miner answered with a non-success status.
    #[error("{message}")]
    DaemonError {
        /// Status code reported by the miner.
        code: i64,
        /// Composed status description.
        message: String,
    },
    /// The request could not be serialised.
    #[error("failed to serialise miner command: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    /// Numeric code for the failure envelope.
    ///
    /// Daemon failures carry the miner's own code; connect failures carry the
    /// OS error number when one exists.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            Self::ConnectionFailed { os_code, .. } => {
                os_code.map_or(CONNECT_FAILED_CODE, i64::from)
            }
            Self::WriteIncomplete { .. } => WRITE_INCOMPLETE_CODE,
            Self::ReadError(_) => READ_ERROR_CODE,
            Self::EmptyResponse => EMPTY_RESPONSE_CODE,
            Self::MalformedResponse { .. } => MALFORMED_RESPONSE_CODE,
            Self::DaemonError { code, .. } => *code,
            Self::Encode(_) => ENCODE_FAILED_CODE,
        }
    }

    /// Whether the miner itself rejected the command, as opposed to a
    /// transport or decoding failure.
    #[must_use]
    pub const fn is_daemon_error(&self) -> bool {
        matches!(self, Self::DaemonError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(ApiError::EmptyResponse, EMPTY_RESPONSE_CODE)]
    #[case(ApiError::ReadError(io::Error::from(io::ErrorKind::TimedOut)), READ_ERROR_CODE)]
    #[case(
        ApiError::WriteIncomplete { expected: 20, actual: 4, source: None },
        WRITE_INCOMPLETE_CODE
    )]
    #[case(
        ApiError::MalformedResponse { raw_payload: String::from("<html>"), source: None },
        MALFORMED_RESPONSE_CODE
    )]
    #[case(ApiError::DaemonError { code: 13, message: String::from("x") }, 13)]
    fn codes_follow_failure_kind(#[case] error: ApiError, #[case] expected: i64) {
        assert_eq!(error.code(), expected);
    }

    #[test]
    fn connect_code_prefers_os_error_number() {
        let error = ApiError::ConnectionFailed {
            endpoint: String::from("tcp://127.0.0.1:4028"),
            reason: String::from("Connection refused"),
            os_code: Some(111),
            source: io::Error::from_raw_os_error(111),
        };
        assert_eq!(error.code(), 111);
        assert!(error.to_string().contains("Connection refused"));
    }

    #[test]
    fn connect_code_falls_back_without_os_error() {
        let error = ApiError::ConnectionFailed {
            endpoint: String::from("tcp://rig:4028"),
            reason: String::from("timed out"),
            os_code: None,
            source: io::Error::from(io::ErrorKind::TimedOut),
        };
        assert_eq!(error.code(), CONNECT_FAILED_CODE);
    }

    #[test]
    fn short_write_message_reports_both_counts() {
        let error = ApiError::WriteIncomplete {
            expected: 42,
            actual: 7,
            source: None,
        };
        assert_eq!(error.to_string(), "unable to write 42 bytes, only 7 written");
    }
}
