use std::fmt;
use std::time::Duration;

use crate::defaults::DEFAULT_MINER_TIMEOUT_SECS;

/// Address of the miner API socket and the timeout applied to each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerEndpoint {
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl MinerEndpoint {
    /// Builds an endpoint with the default connect timeout.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_secs(DEFAULT_MINER_TIMEOUT_SECS),
        }
    }

    /// Replaces the connect timeout. Read and write deadlines use the same value.
    #[must_use]
    pub const fn with_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Host name or IP address of the miner.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port of the miner API.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Upper bound for connecting, and for each blocking read or write.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
}

impl fmt::Display for MinerEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "tcp://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_tcp_scheme() {
        let endpoint = MinerEndpoint::new("10.0.0.7", 4028);
        assert_eq!(endpoint.to_string(), "tcp://10.0.0.7:4028");
    }
}
