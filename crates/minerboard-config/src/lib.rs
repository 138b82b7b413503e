//! Shared configuration for the minerboard workspace.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path` / `MINERBOARD_CONFIG_PATH`), then
//! `MINERBOARD_*` environment variables, then command-line flags.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod defaults;
mod endpoint;
mod logging;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MINER_ADDRESS, DEFAULT_MINER_PORT, DEFAULT_MINER_TIMEOUT_SECS,
    default_log_filter, default_log_format, default_miner_address, default_miner_port,
    default_miner_timeout,
};
pub use endpoint::MinerEndpoint;
pub use logging::{LogFormat, LogFormatParseError};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration layer could not be read or merged.
    #[error(transparent)]
    Load(Arc<OrthoError>),
    /// The miner timeout resolved to zero seconds.
    #[error("miner_timeout must be at least 1 second")]
    ZeroTimeout,
}

/// Resolved configuration for the dashboard tools.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "MINERBOARD")]
pub struct Config {
    /// Host name or address of the miner API.
    #[ortho_config(default = defaults::default_miner_address())]
    miner_address: String,
    /// TCP port of the miner API.
    #[ortho_config(default = defaults::default_miner_port())]
    miner_port: u16,
    /// Connect, read and write timeout in whole seconds.
    #[ortho_config(default = defaults::default_miner_timeout())]
    miner_timeout: u64,
    /// `tracing` filter expression.
    #[ortho_config(default = defaults::default_log_filter())]
    log_filter: String,
    /// Output format for diagnostics.
    #[ortho_config(default = defaults::default_log_format())]
    log_format: LogFormat,
    /// Render pretty debug output instead of the compact envelope.
    #[ortho_config(default = false)]
    debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            miner_address: default_miner_address(),
            miner_port: default_miner_port(),
            miner_timeout: default_miner_timeout(),
            log_filter: default_log_filter(),
            log_format: default_log_format(),
            debug: false,
        }
    }
}

impl Config {
    /// Loads layered configuration from the given arguments, environment and
    /// configuration file.
    ///
    /// The first argument is treated as the program name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] when a layer fails to load and
    /// [`ConfigError::ZeroTimeout`] when the merged timeout is zero.
    pub fn load_from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let config = Self::load_from_iter(args).map_err(ConfigError::Load)?;
        if config.miner_timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(config)
    }

    /// Miner endpoint assembled from the address, port and timeout settings.
    #[must_use]
    pub fn endpoint(&self) -> MinerEndpoint {
        MinerEndpoint::new(self.miner_address.clone(), self.miner_port)
            .with_timeout(Duration::from_secs(self.miner_timeout))
    }

    /// Returns a copy pointing at another miner. Mostly useful in tests.
    #[must_use]
    pub fn with_miner(mut self, address: impl Into<String>, port: u16) -> Self {
        self.miner_address = address.into();
        self.miner_port = port;
        self
    }

    /// Returns a copy with the given timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.miner_timeout = seconds;
        self
    }

    /// Configured `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Configured diagnostic output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Whether debug rendering is enabled by configuration.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_local_miner() {
        let endpoint = Config::default().endpoint();
        assert_eq!(endpoint.to_string(), "tcp://127.0.0.1:4028");
        assert_eq!(endpoint.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn timeout_flows_into_endpoint() {
        let endpoint = Config::default()
            .with_miner("rig-03", 4029)
            .with_timeout(12)
            .endpoint();
        assert_eq!(endpoint.host(), "rig-03");
        assert_eq!(endpoint.port(), 4029);
        assert_eq!(endpoint.connect_timeout(), Duration::from_secs(12));
    }

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
