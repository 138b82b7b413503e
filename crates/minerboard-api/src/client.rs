//! Typed operations over the miner API.
//!
//! Each method is one connect/write/read/close cycle. Queries return the
//! matching response section as is; pool management commands return the
//! miner's status message after [`status::check`].

use minerboard_config::MinerEndpoint;
use serde_json::Value;
use tracing::debug;

use crate::codec::{self, Command, DecodedResponse, Record};
use crate::status;
use crate::transport::{self, Connector, TcpConnector};
use crate::ApiError;

const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");

/// Value returned by the version accessors when the field is missing.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Client for one miner endpoint.
///
/// The client keeps no connection between calls, so a shared reference can be
/// used from several threads at once.
#[derive(Debug, Clone)]
pub struct MinerClient<C = TcpConnector> {
    endpoint: MinerEndpoint,
    connector: C,
}

impl MinerClient {
    /// Builds a client that talks to `endpoint` over TCP.
    #[must_use]
    pub const fn new(endpoint: MinerEndpoint) -> Self {
        Self::with_connector(endpoint, TcpConnector)
    }
}

impl<C> MinerClient<C> {
    /// Builds a client using a custom connector.
    #[must_use]
    pub const fn with_connector(endpoint: MinerEndpoint, connector: C) -> Self {
        Self {
            endpoint,
            connector,
        }
    }

    /// Endpoint every call connects to.
    #[must_use]
    pub const fn endpoint(&self) -> &MinerEndpoint {
        &self.endpoint
    }
}

impl<C: Connector> MinerClient<C> {
    /// Sends one command and decodes the response without checking its status.
    ///
    /// # Errors
    ///
    /// Returns any transport or decoding failure.
    pub fn call(&self, command: &Command) -> Result<DecodedResponse, ApiError> {
        let request = codec::encode(command)?;
        debug!(
            target: CLIENT_TARGET,
            command = command.name(),
            endpoint = %self.endpoint,
            "sending miner command"
        );
        let raw = transport::exchange(&self.connector, &self.endpoint, &request)?;
        codec::decode(&raw)
    }

    fn call_checked(&self, command: &Command) -> Result<String, ApiError> {
        let response = self.call(command)?;
        let message = status::check(&response)?;
        debug!(target: CLIENT_TARGET, command = command.name(), %message, "miner accepted command");
        Ok(message)
    }

    fn section(&self, command: &str, section: &str) -> Result<Vec<Record>, ApiError> {
        Ok(self.call(&Command::new(command))?.into_section(section))
    }

    /// Device list and statistics (`devs`).
    ///
    /// # Errors
    ///
    /// Returns any transport or decoding failure.
    pub fn devices(&self) -> Result<Vec<Record>, ApiError> {
        self.section("devs", "DEVS")
    }

    /// Device failures and notifications (`notify`).
    ///
    /// # Errors
    ///
    /// Returns any transport or decoding failure.
    pub fn notify(&self) -> Result<Vec<Record>, ApiError> {
        self.section("notify", "NOTIFY")
    }

    /// Configured pools and their statistics (`pools`).
    ///
    /// # Errors
    ///
    /// Returns any transport or decoding failure.
    pub fn pools(&self) -> Result<Vec<Record>, ApiError> {
        self.section("pools", "POOLS")
    }

    /// Miner software version from `VERSION[index].CGMiner`, or `"unknown"`.
    ///
    /// # Errors
    ///
    /// Returns any transport or decoding failure. A missing field is not an
    /// error.
    pub fn miner_version(&self, index: usize) -> Result<String, ApiError> {
        self.version_field(index, "CGMiner")
    }

    /// API version from `VERSION[index].API`, or `"unknown"`.
    ///
    /// # Errors
    ///
    /// Returns any transport or decoding failure. A missing field is not an
    /// error.
    pub fn api_version(&self, index: usize) -> Result<String, ApiError> {
        self.version_field(index, "API")
    }

    fn version_field(&self, index: usize, field: &str) -> Result<String, ApiError> {
        let response = self.call(&Command::new("version"))?;
        Ok(read_version_field(&response, index, field))
    }

    /// Adds a pool with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::DaemonError`] when the miner rejects the pool, or
    /// any transport or decoding failure.
    pub fn add_pool(&self, url: &str, user: &str, pass: &str) -> Result<String, ApiError> {
        self.call_checked(&Command::with_list("addpool", [url, user, pass]))
    }

    /// Removes the pool with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::DaemonError`] when the miner rejects the id, or any
    /// transport or decoding failure.
    pub fn delete_pool(&self, id: u32) -> Result<String, ApiError> {
        self.call_checked(&Command::with_scalar("removepool", id))
    }

    /// Moves the pool with the given id to the highest priority.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::DaemonError`] when the miner rejects the id, or any
    /// transport or decoding failure.
    pub fn top_pool(&self, id: u32) -> Result<String, ApiError> {
        self.call_checked(&Command::with_scalar("switchpool", id))
    }

    /// Enables or disables the pool with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::DaemonError`] when the miner rejects the id, or any
    /// transport or decoding failure.
    pub fn enable_pool(&self, id: u32, enabled: bool) -> Result<String, ApiError> {
        let name = if enabled { "enablepool" } else { "disablepool" };
        self.call_checked(&Command::with_scalar(name, id))
    }

    /// Persists the miner's current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::DaemonError`] when the miner cannot save, or any
    /// transport or decoding failure.
    pub fn save(&self) -> Result<String, ApiError> {
        self.call_checked(&Command::new("save"))
    }
}

fn read_version_field(response: &DecodedResponse, index: usize, field: &str) -> String {
    match response.record("VERSION", index).and_then(|record| record.get(field)) {
        Some(Value::String(version)) => version.clone(),
        Some(Value::Number(version)) => version.to_string(),
        _ => UNKNOWN_VERSION.to_owned(),
    }
}
