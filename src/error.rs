//! Error types for flotilla-client.

use thiserror::Error;

/// Main error type for all client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A buffer with a length other than the fixed frame size was handed
    /// to the decoder.
    #[error("bad frame length: got {0} bytes")]
    BadFrameLength(usize),

    /// The 4-byte type field carried a tag with no known mapping.
    #[error("unknown message type tag: {0}")]
    UnknownMessageType(i32),

    /// A serialized payload would not fit the fixed payload region.
    #[error("payload too large: {len} > {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },

    /// Operation requires an established connection.
    #[error("not connected")]
    NotConnected,

    /// `connect` was called while a connection is already up.
    #[error("already connected")]
    AlreadyConnected,

    /// Connection closed (by the peer, or the writer task has stopped).
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;
