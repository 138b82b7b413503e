use crate::logging::LogFormat;

/// Address the miner API listens on when nothing else is configured.
pub const DEFAULT_MINER_ADDRESS: &str = "127.0.0.1";

/// Standard cgminer/bfgminer API port.
pub const DEFAULT_MINER_PORT: u16 = 4028;

/// Connect, read and write timeout in seconds.
pub const DEFAULT_MINER_TIMEOUT_SECS: u64 = 5;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Owned miner address used where allocation is required (e.g. serde).
pub fn default_miner_address() -> String {
    DEFAULT_MINER_ADDRESS.to_owned()
}

/// Default miner API port.
pub const fn default_miner_port() -> u16 {
    DEFAULT_MINER_PORT
}

/// Default miner timeout in seconds.
pub const fn default_miner_timeout() -> u64 {
    DEFAULT_MINER_TIMEOUT_SECS
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format. Output goes to a terminal more often than to a
/// log pipeline, so the single-line format wins.
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
