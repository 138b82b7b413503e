//! Client for the cgminer/bfgminer JSON API.
//!
//! The miner speaks a one-shot protocol: the client connects, sends a single
//! JSON command, reads a JSON response until the miner closes the connection,
//! and is done. [`MinerClient`] wraps that cycle in one method per supported
//! command and reports every failure as an [`ApiError`].
//!
//! ```no_run
//! use minerboard_api::MinerClient;
//! use minerboard_config::MinerEndpoint;
//!
//! # fn main() -> Result<(), minerboard_api::ApiError> {
//! let client = MinerClient::new(MinerEndpoint::new("127.0.0.1", 4028));
//! for pool in client.pools()? {
//!     println!("{:?}", pool.get("URL"));
//! }
//! client.top_pool(1)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
mod error;
pub mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod transport;

#[cfg(test)]
mod client_tests;

pub use client::{MinerClient, UNKNOWN_VERSION};
pub use codec::{Command, DecodedResponse, Parameter, Record};
pub use error::{
    ApiError, CONNECT_FAILED_CODE, EMPTY_RESPONSE_CODE, ENCODE_FAILED_CODE,
    MALFORMED_RESPONSE_CODE, READ_ERROR_CODE, WRITE_INCOMPLETE_CODE,
};
pub use status::{StatusKind, StatusRecord};
pub use transport::{Connection, Connector, TcpConnection, TcpConnector};
