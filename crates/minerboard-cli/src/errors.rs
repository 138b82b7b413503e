//! Error types for the CLI runtime.

use std::io;

use minerboard_api::ApiError;
use minerboard_config::ConfigError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Code reported when a request lacks a required value.
pub(crate) const MISSING_PARAMETER_CODE: i64 = -101;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[source] ConfigError),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("Missing required parameter")]
    MissingParameter,
    #[error(transparent)]
    Miner(#[from] ApiError),
    #[error("failed to render response: {0}")]
    Render(serde_json::Error),
    #[error("failed to write response: {0}")]
    WriteOutput(io::Error),
}

impl AppError {
    /// Code for the failure envelope, when this error belongs in one.
    ///
    /// Only failures of the request itself are reported through the
    /// envelope; usage, configuration and output errors go to stderr.
    pub(crate) fn envelope_code(&self) -> Option<i64> {
        match self {
            Self::MissingParameter => Some(MISSING_PARAMETER_CODE),
            Self::Miner(error) => Some(error.code()),
            _ => None,
        }
    }
}
