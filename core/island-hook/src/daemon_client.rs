//! Client for the AI Island daemon socket.
//!
//! One status record per connection. Only a permission request waits for a
//! reply; every other record is written and the connection closed. Nothing
//! here fails the hook: any problem is logged and surfaces as "no decision".
//!
//! The daemon's reply has no length prefix or delimiter. Reads accumulate into
//! a buffer and a parse is attempted after every chunk; the first complete
//! JSON value is the reply and anything after it is discarded.

use crate::config::HookConfig;
use island_protocol::{DecisionOutcome, StatusRecord, MAX_RESPONSE_BYTES, READ_CHUNK_BYTES};
use serde::Serialize;
use serde_json::Value;
use socket2::{Domain, SockAddr, Socket, Type};
use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Pause between connect attempts while the daemon's accept backlog is full.
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize status record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write status record: {0}")]
    Write(#[source] io::Error),

    #[error("failed to read daemon response: {0}")]
    Read(#[source] io::Error),

    #[error("timed out after {}s waiting on daemon", .0.as_secs())]
    TimedOut(Duration),

    #[error("daemon response exceeded {} bytes", MAX_RESPONSE_BYTES)]
    ResponseTooLarge,
}

impl ClientError {
    /// Socket timeouts surface as WouldBlock/TimedOut io errors.
    fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            Self::Read(ref err) | Self::Write(ref err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                Self::TimedOut(timeout)
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub socket: PathBuf,
    pub exists: bool,
    pub reachable: bool,
}

#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &HookConfig) -> Self {
        Self::new(config.socket_path.clone(), config.timeout)
    }

    /// Sends `record` and, for a permission request, blocks for the daemon's
    /// decision. A missing socket means no daemon is running; that is the
    /// normal case and returns `None` without connecting.
    pub fn deliver(&self, record: &StatusRecord) -> Option<DecisionOutcome> {
        if !self.socket_path.exists() {
            tracing::debug!(
                socket = %self.socket_path.display(),
                event = %record.event,
                "Daemon socket not found, skipping"
            );
            return None;
        }

        match self.exchange(record) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    event = %record.event,
                    "Socket error talking to daemon"
                );
                None
            }
        }
    }

    /// Connects and immediately closes without sending anything.
    pub fn probe(&self) -> ProbeReport {
        let exists = self.socket_path.exists();
        let reachable = exists
            && self
                .connect()
                .map(|stream| {
                    let _ = stream.shutdown(Shutdown::Both);
                })
                .is_ok();
        ProbeReport {
            socket: self.socket_path.clone(),
            exists,
            reachable,
        }
    }

    /// Connects within the client timeout. A listener with a full accept
    /// backlog refuses a non-blocking connect with `EAGAIN`; that is retried
    /// until the deadline passes.
    fn connect(&self) -> Result<UnixStream, ClientError> {
        let connect_err = |source: io::Error| ClientError::Connect {
            path: self.socket_path.clone(),
            source,
        };
        let address = SockAddr::unix(&self.socket_path).map_err(connect_err)?;
        let deadline = Instant::now() + self.timeout;

        loop {
            let socket = Socket::new(Domain::UNIX, Type::STREAM, None).map_err(connect_err)?;
            socket.set_nonblocking(true).map_err(connect_err)?;
            match socket.connect(&address) {
                Ok(()) => {
                    socket.set_nonblocking(false).map_err(connect_err)?;
                    return Ok(UnixStream::from(socket));
                }
                Err(err) if connect_pending(&err) => {}
                Err(err) => return Err(connect_err(err)),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ClientError::TimedOut(self.timeout));
            }
            thread::sleep(CONNECT_RETRY_DELAY.min(deadline - now));
        }
    }

    // The stream is dropped, and the descriptor closed, on every return path.
    fn exchange(&self, record: &StatusRecord) -> Result<Option<DecisionOutcome>, ClientError> {
        let mut stream = self.connect()?;
        let _ = stream.set_read_timeout(Some(self.timeout));
        let _ = stream.set_write_timeout(Some(self.timeout));

        let payload = serde_json::to_vec(record)?;
        stream
            .write_all(&payload)
            .map_err(|err| ClientError::Write(err).with_timeout(self.timeout))?;
        stream.flush().ok();

        if !record.expects_response() {
            let _ = stream.shutdown(Shutdown::Both);
            tracing::debug!(event = %record.event, "Status delivered");
            return Ok(None);
        }

        tracing::debug!(
            tool = ?record.tool_name,
            tool_use_id = ?record.tool_use_id,
            "Waiting for permission decision"
        );
        let response = read_response(&mut stream).map_err(|err| err.with_timeout(self.timeout))?;

        Ok(response.as_ref().and_then(DecisionOutcome::from_response))
    }
}

fn connect_pending(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock || err.raw_os_error() == Some(libc::EINPROGRESS)
}

/// Reads until the buffer holds one complete JSON value. Returns `Ok(None)`
/// if the peer closes first.
pub(crate) fn read_response<R: Read>(reader: &mut R) -> Result<Option<Value>, ClientError> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_BYTES];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => {
                if !buffer.is_empty() {
                    tracing::warn!(
                        bytes = buffer.len(),
                        "Daemon closed connection before a complete response"
                    );
                }
                return Ok(None);
            }
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(ClientError::Read(err)),
        };

        buffer.extend_from_slice(&chunk[..n]);
        if let Some(value) = first_complete_value(&buffer) {
            return Ok(Some(value));
        }
        if buffer.len() > MAX_RESPONSE_BYTES {
            return Err(ClientError::ResponseTooLarge);
        }
    }
}

fn first_complete_value(buffer: &[u8]) -> Option<Value> {
    serde_json::Deserializer::from_slice(buffer)
        .into_iter::<Value>()
        .next()?
        .ok()
}
