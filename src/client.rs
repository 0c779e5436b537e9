//! The connection bridge: lifecycle, reader task, typed sends.
//!
//! One [`Client`] owns one connection to the game server. `connect` opens
//! the socket and spawns two tasks: a writer draining the outbound channel
//! and a reader feeding socket bytes through a [`FrameBuffer`] into the
//! [`DispatchRegistry`]. `send` encodes a [`Message`] with the current
//! session token and queues it; callbacks fire on the reader task in wire
//! order.
//!
//! # Example
//!
//! ```no_run
//! use flotilla_client::{Client, Message, MessageType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new();
//!     client.subscribe(MessageType::AuthSuccess, |msg| {
//!         println!("logged in: {msg:?}");
//!     });
//!
//!     client.connect("127.0.0.1", 9090).await?;
//!     client.send(&Message::Login {
//!         username: "captain".into(),
//!         password: "hunter2".into(),
//!     })
//!     .await?;
//!
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dispatch::{DispatchRegistry, Subscription};
use crate::error::{ClientError, Result};
use crate::protocol::{decode_frame, encode_frame, FrameBuffer, Message, MessageType};
use crate::transport::tcp;
use crate::writer::{spawn_writer_task, WriterHandle};

/// How long `disconnect` waits for the reader task before aborting it.
const READER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Pause after a transient read error before retrying.
const TRANSIENT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Socket read chunk size. Frames are 5520 bytes, so a chunk is at most a
/// frame and change.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl ConnectionState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

/// State shared between the `Client` handle and its reader task.
struct Shared {
    state: AtomicU8,
    registry: DispatchRegistry,
    token: Mutex<String>,
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn token_lock(&self) -> MutexGuard<'_, String> {
        // Token writes cannot leave the String malformed; recover from
        // poisoning instead of propagating a panic.
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Client endpoint for one game-server connection.
///
/// Not `Clone`: the handle owns the connection. Share subscription access
/// by handing out [`registry()`](Client::registry) references, or wrap the
/// whole client in your own `Arc<Mutex<_>>` if multiple owners must drive
/// the lifecycle.
pub struct Client {
    shared: Arc<Shared>,
    writer: Option<WriterHandle>,
    reader_task: Option<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl Client {
    /// Create a disconnected client with an empty registry and no token.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: AtomicU8::new(ConnectionState::Disconnected as u8),
                registry: DispatchRegistry::new(),
                token: Mutex::new(String::new()),
            }),
            writer: None,
            reader_task: None,
            shutdown: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// The callback registry for this connection.
    pub fn registry(&self) -> &DispatchRegistry {
        &self.shared.registry
    }

    /// Register a callback for one message type. See
    /// [`DispatchRegistry::subscribe`].
    pub fn subscribe<F>(&self, ty: MessageType, callback: F) -> Subscription
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.shared.registry.subscribe(ty, callback)
    }

    /// Remove a previously registered callback. No-op if already gone.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.shared.registry.unsubscribe(subscription);
    }

    /// Set the session token stamped into every subsequent outgoing frame.
    ///
    /// Call this with the credential from an `AuthToken` message. An empty
    /// token encodes as an all-zero token region.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.shared.token_lock() = token.into();
    }

    /// The current session token (empty before authentication).
    pub fn token(&self) -> String {
        self.shared.token_lock().clone()
    }

    /// Connect to the game server over TCP.
    ///
    /// On success the state is `Connected` and the background reader is
    /// running. On any failure the state returns to `Disconnected` and the
    /// error is reported, never panicked.
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        if self.state() != ConnectionState::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }
        self.shared.set_state(ConnectionState::Connecting);

        match tcp::connect(host, port).await {
            Ok((reader, writer)) => {
                self.attach(reader, writer);
                info!(host, port, "connected");
                Ok(())
            }
            Err(e) => {
                self.shared.set_state(ConnectionState::Disconnected);
                warn!(host, port, error = %e, "connect failed");
                Err(e)
            }
        }
    }

    /// Run the connection lifecycle over caller-supplied I/O halves.
    ///
    /// Same semantics as [`connect`](Client::connect) minus the TCP dial;
    /// used with in-memory transports such as `tokio::io::duplex`.
    pub fn connect_with<R, W>(&mut self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        if self.state() != ConnectionState::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }
        self.attach(reader, writer);
        Ok(())
    }

    fn attach<R, W>(&mut self, reader: R, writer: W)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (writer_handle, _writer_task) = spawn_writer_task(writer);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let shared = self.shared.clone();
        let reader_task = tokio::spawn(read_loop(reader, shared, shutdown_rx));

        self.writer = Some(writer_handle);
        self.reader_task = Some(reader_task);
        self.shutdown = Some(shutdown_tx);
        self.shared.set_state(ConnectionState::Connected);
    }

    /// Encode a message with the current session token and queue it for
    /// writing.
    ///
    /// At-most-once: a frame accepted here is written exactly once and
    /// never retried. Requires `Connected`.
    pub async fn send(&self, message: &Message) -> Result<()> {
        if self.state() != ConnectionState::Connected {
            return Err(ClientError::NotConnected);
        }
        let writer = self.writer.as_ref().ok_or(ClientError::NotConnected)?;

        let token = self.token();
        let frame = encode_frame(message, &token)?;
        writer.send(frame).await
    }

    /// Tear the connection down.
    ///
    /// Signals the reader, waits up to two seconds for it to stop, aborts
    /// it if it does not, and drops the writer (which ends
    /// the writer task). Idempotent: calling while already disconnected
    /// does nothing.
    pub async fn disconnect(&mut self) {
        // Closing the writer channel ends the writer task.
        self.writer = None;

        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }

        if let Some(task) = self.reader_task.take() {
            let abort = task.abort_handle();
            if tokio::time::timeout(READER_SHUTDOWN_TIMEOUT, task)
                .await
                .is_err()
            {
                warn!("reader task did not stop in time, aborting");
                abort.abort();
            }
        }

        self.shared.set_state(ConnectionState::Disconnected);
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader task: socket bytes → frames → dispatch.
///
/// Runs until the shutdown signal fires or the peer closes. Decode
/// failures drop the offending frame and keep reading; transient read
/// errors pause briefly and retry.
async fn read_loop<R>(mut reader: R, shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>)
where
    R: AsyncRead + Unpin,
{
    let mut frame_buffer = FrameBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = tokio::select! {
            changed = shutdown.changed() => {
                // Signalled, or the Client handle is gone entirely.
                let _ = changed;
                debug!("reader shutting down");
                return;
            }
            read = reader.read(&mut chunk) => match read {
                Ok(0) => {
                    info!("peer closed the connection");
                    shared.set_state(ConnectionState::Disconnected);
                    return;
                }
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "read error, retrying");
                    tokio::time::sleep(TRANSIENT_ERROR_BACKOFF).await;
                    continue;
                }
            },
        };

        for frame in frame_buffer.push(&chunk[..n]) {
            match decode_frame(&frame) {
                Ok(decoded) => shared.registry.dispatch(&decoded.message),
                Err(e) => warn!(error = %e, "dropping undecodable frame"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn test_new_client_starts_disconnected() {
        let client = Client::new();
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(!client.is_connected());
        assert_eq!(client.token(), "");
    }

    #[tokio::test]
    async fn test_send_while_disconnected() {
        let client = Client::new();
        let result = client.send(&Message::Ping).await;
        assert!(matches!(result, Err(ClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_connect_with_rejects_second_connection() {
        let mut client = Client::new();
        let (a, _b) = duplex(1024);
        let (ar, aw) = tokio::io::split(a);
        client.connect_with(ar, aw).unwrap();
        assert!(client.is_connected());

        let (c, _d) = duplex(1024);
        let (cr, cw) = tokio::io::split(c);
        assert!(matches!(
            client.connect_with(cr, cw),
            Err(ClientError::AlreadyConnected)
        ));
    }

    #[tokio::test]
    async fn test_connect_failure_returns_to_disconnected() {
        let mut client = Client::new();
        let result = client.connect("127.0.0.1", 1).await;
        assert!(result.is_err());
        assert_eq!(client.state(), ConnectionState::Disconnected);

        // And the handle is reusable afterwards.
        let result = client.connect("127.0.0.1", 1).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let mut client = Client::new();
        client.disconnect().await;
        client.disconnect().await;
        assert_eq!(client.state(), ConnectionState::Disconnected);

        let (a, _b) = duplex(64 * 1024);
        let (ar, aw) = tokio::io::split(a);
        client.connect_with(ar, aw).unwrap();
        client.disconnect().await;
        client.disconnect().await;
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_set_token_round_trip() {
        let client = Client::new();
        client.set_token("session-abc");
        assert_eq!(client.token(), "session-abc");
        client.set_token("");
        assert_eq!(client.token(), "");
    }
}
