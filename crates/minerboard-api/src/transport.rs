//! Socket transport for miner API calls.
//!
//! The miner accepts exactly one command per TCP connection and marks the end
//! of its response by closing the stream. [`exchange`] drives that cycle
//! (connect, write, read to EOF, close) over any [`Connector`], so tests can
//! substitute an in-process connection for the TCP one.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use minerboard_config::MinerEndpoint;
use tracing::{debug, trace};

use crate::ApiError;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
const READ_CHUNK: usize = 8192;

/// An open connection carrying one request and one response.
pub trait Connection {
    /// Writes the whole request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::WriteIncomplete`] when the peer stops accepting
    /// bytes before the request is fully written.
    fn write_all(&mut self, request: &[u8]) -> Result<(), ApiError>;

    /// Reads until the peer closes the stream.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ReadError`] on IO failure and
    /// [`ApiError::EmptyResponse`] when nothing was received.
    fn read_to_end(&mut self) -> Result<Vec<u8>, ApiError>;

    /// Releases the connection. Idempotent; failures are ignored.
    fn close(&mut self);
}

/// Opens connections to a miner endpoint.
pub trait Connector {
    /// Connection type produced by this connector.
    type Connection: Connection;

    /// Opens a connection within the endpoint's connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ConnectionFailed`] if the address cannot be
    /// resolved or the connection cannot be established in time.
    fn connect(&self, endpoint: &MinerEndpoint) -> Result<Self::Connection, ApiError>;
}

/// Performs one full request/response cycle.
///
/// Once a connection is open it is closed exactly once, whether the write,
/// the read, or neither fails.
///
/// # Errors
///
/// Propagates the first failure from connecting, writing or reading.
pub fn exchange<C>(
    connector: &C,
    endpoint: &MinerEndpoint,
    request: &[u8],
) -> Result<Vec<u8>, ApiError>
where
    C: Connector + ?Sized,
{
    let mut connection = connector.connect(endpoint)?;
    let outcome = connection
        .write_all(request)
        .and_then(|()| connection.read_to_end());
    connection.close();
    outcome
}

/// Writes `request` to `writer`, failing if the writer stalls or errors
/// before every byte is accepted.
///
/// # Errors
///
/// Returns [`ApiError::WriteIncomplete`] with the number of bytes written.
pub fn write_request<W>(writer: &mut W, request: &[u8]) -> Result<(), ApiError>
where
    W: Write + ?Sized,
{
    let expected = request.len();
    let mut written = 0usize;
    // A short write is progress; only a zero-length write or an error is short.
    while let Some(remaining) = request.get(written..).filter(|rest| !rest.is_empty()) {
        match writer.write(remaining) {
            Ok(0) => {
                return Err(ApiError::WriteIncomplete {
                    expected,
                    actual: written,
                    source: None,
                });
            }
            Ok(count) => written += count,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => {
                return Err(ApiError::WriteIncomplete {
                    expected,
                    actual: written,
                    source: Some(error),
                });
            }
        }
    }
    writer.flush().map_err(|error| ApiError::WriteIncomplete {
        expected,
        actual: written,
        source: Some(error),
    })
}

/// Drains `reader` until EOF.
///
/// # Errors
///
/// Returns [`ApiError::ReadError`] on IO failure (including timeouts) and
/// [`ApiError::EmptyResponse`] when EOF arrives before any data.
pub fn read_response<R>(reader: &mut R) -> Result<Vec<u8>, ApiError>
where
    R: Read + ?Sized,
{
    let mut response = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(count) => response.extend_from_slice(chunk.get(..count).unwrap_or_default()),
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Err(ApiError::ReadError(error)),
        }
    }
    if response.is_empty() {
        return Err(ApiError::EmptyResponse);
    }
    Ok(response)
}

/// Connects over TCP with the endpoint's timeout applied to connect, read and
/// write.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Connection = TcpConnection;

    fn connect(&self, endpoint: &MinerEndpoint) -> Result<TcpConnection, ApiError> {
        let failed = |source: io::Error| ApiError::ConnectionFailed {
            endpoint: endpoint.to_string(),
            reason: source.to_string(),
            os_code: source.raw_os_error(),
            source,
        };
        let timeout = endpoint.connect_timeout();
        let address = resolve_tcp_address(endpoint.host(), endpoint.port()).map_err(failed)?;
        debug!(
            target: TRANSPORT_TARGET,
            endpoint = %endpoint,
            %address,
            timeout_secs = timeout.as_secs(),
            "connecting to miner"
        );
        let stream = TcpStream::connect_timeout(&address, timeout).map_err(failed)?;
        stream.set_read_timeout(Some(timeout)).map_err(failed)?;
        stream.set_write_timeout(Some(timeout)).map_err(failed)?;
        Ok(TcpConnection {
            stream: Some(stream),
        })
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

/// A TCP stream to the miner. Reads and writes fail once closed.
#[derive(Debug)]
pub struct TcpConnection {
    stream: Option<TcpStream>,
}

impl TcpConnection {
    fn stream(&mut self) -> io::Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "connection closed"))
    }
}

impl Connection for TcpConnection {
    fn write_all(&mut self, request: &[u8]) -> Result<(), ApiError> {
        let stream = self.stream().map_err(|error| ApiError::WriteIncomplete {
            expected: request.len(),
            actual: 0,
            source: Some(error),
        })?;
        write_request(stream, request)?;
        trace!(target: TRANSPORT_TARGET, bytes = request.len(), "request sent");
        Ok(())
    }

    fn read_to_end(&mut self) -> Result<Vec<u8>, ApiError> {
        let stream = self.stream().map_err(ApiError::ReadError)?;
        let response = read_response(stream)?;
        trace!(target: TRANSPORT_TARGET, bytes = response.len(), "response received");
        Ok(response)
    }

    fn close(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        if let Err(error) = stream.shutdown(Shutdown::Both) {
            trace!(target: TRANSPORT_TARGET, %error, "ignoring socket shutdown failure");
        }
    }
}
