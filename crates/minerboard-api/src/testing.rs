//! In-process fake miner for tests.
//!
//! [`FakeMiner`] listens on an ephemeral TCP port and answers successive
//! connections with canned [`Reply`] values, one reply per connection, in
//! order. Every request it receives is recorded so tests can assert on the
//! exact wire format the client produced.

use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use minerboard_config::MinerEndpoint;
use serde_json::Value;

const ACCEPT_DEADLINE: Duration = Duration::from_secs(5);
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// How the fake miner answers one connection.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Sends the bytes, then closes the connection.
    Raw(Vec<u8>),
    /// Closes the connection without sending anything.
    Close,
    /// Keeps the connection open, silent, for the given time before closing.
    Stall(Duration),
}

impl Reply {
    /// Sends a JSON document and closes.
    #[must_use]
    pub fn json(value: &Value) -> Self {
        Self::Raw(value.to_string().into_bytes())
    }

    /// Sends text verbatim and closes.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self::Raw(text.as_bytes().to_vec())
    }
}

/// A fake miner serving a fixed script of replies.
pub struct FakeMiner {
    port: u16,
    requests: Arc<Mutex<Vec<Value>>>,
    handle: Option<thread::JoinHandle<io::Result<()>>>,
}

impl FakeMiner {
    /// Starts serving `replies` on `127.0.0.1` and an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub fn spawn(replies: Vec<Reply>) -> io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        listener.set_nonblocking(true)?;
        let port = listener.local_addr()?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || serve(&listener, replies, &recorded));
        Ok(Self {
            port,
            requests,
            handle: Some(handle),
        })
    }

    /// Port the fake miner listens on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Endpoint pointing at this fake miner.
    #[must_use]
    pub fn endpoint(&self) -> MinerEndpoint {
        MinerEndpoint::new("127.0.0.1", self.port)
    }

    /// Waits for every scripted reply to be served and returns the requests
    /// received, in order.
    ///
    /// # Errors
    ///
    /// Returns the serving thread's error, or an error if it panicked.
    pub fn finish(mut self) -> io::Result<Vec<Value>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| io::Error::other("fake miner thread panicked"))??;
        }
        self.requests()
    }

    /// Requests received so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the request log lock was poisoned.
    pub fn requests(&self) -> io::Result<Vec<Value>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .map_err(|error| io::Error::other(format!("lock requests: {error}")))
    }
}

impl Drop for FakeMiner {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(error)) => tracing::warn!(%error, "fake miner stopped with an error"),
            Err(_) => tracing::warn!("fake miner thread panicked"),
        }
    }
}

fn serve(
    listener: &TcpListener,
    replies: Vec<Reply>,
    requests: &Arc<Mutex<Vec<Value>>>,
) -> io::Result<()> {
    for reply in replies {
        let Some(stream) = accept(listener)? else {
            // Nobody connected; the client under test gave up early.
            return Ok(());
        };
        record_request(&stream, requests)?;
        respond(stream, reply)?;
    }
    Ok(())
}

fn accept(listener: &TcpListener) -> io::Result<Option<TcpStream>> {
    let deadline = Instant::now() + ACCEPT_DEADLINE;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false)?;
                stream.set_read_timeout(Some(REQUEST_READ_TIMEOUT))?;
                return Ok(Some(stream));
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return Ok(None);
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(error) => return Err(error),
        }
    }
}

/// The client never half-closes, so the request is delimited by the end of
/// its JSON object rather than by EOF.
fn record_request(stream: &TcpStream, requests: &Arc<Mutex<Vec<Value>>>) -> io::Result<()> {
    let mut values = serde_json::Deserializer::from_reader(stream).into_iter::<Value>();
    let request = match values.next() {
        Some(Ok(value)) => value,
        Some(Err(error)) => return Err(io::Error::new(io::ErrorKind::InvalidData, error)),
        None => return Ok(()),
    };
    requests
        .lock()
        .map_err(|error| io::Error::other(format!("lock requests: {error}")))?
        .push(request);
    Ok(())
}

fn respond(mut stream: TcpStream, reply: Reply) -> io::Result<()> {
    match reply {
        Reply::Raw(bytes) => {
            stream.write_all(&bytes)?;
            stream.flush()
        }
        Reply::Close => Ok(()),
        Reply::Stall(duration) => {
            thread::sleep(duration);
            Ok(())
        }
    }
}
