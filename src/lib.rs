//! Client endpoint for the Flotilla battleship server.
//!
//! Talks the server's fixed-frame TCP protocol: every message is one
//! 5520-byte frame (`4-byte LE type | 512-byte token | 5004-byte payload`)
//! with hand-laid payload layouts shared bit-for-bit with the C server.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!  send(&Message) ──►│ encode_frame ─► writer task  │──► TCP
//!                    │                              │
//!  TCP ─────────────►│ FrameBuffer ─► decode_frame  │
//!                    │        │                     │
//!                    │        ▼                     │
//!                    │  DispatchRegistry ─► callbacks
//!                    └──────────────────────────────┘
//!                               Client
//! ```
//!
//! - [`protocol`] — frame layout, the [`Message`] union, codec, re-assembly.
//! - [`dispatch`] — per-type callback registry with panic isolation.
//! - [`Client`] — connection lifecycle, background reader, typed sends.
//!
//! # Quick start
//!
//! ```no_run
//! use flotilla_client::{Client, Message, MessageType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new();
//!     client.subscribe(MessageType::ChatMessage, |msg| {
//!         if let Message::ChatMessage { username, text } = msg {
//!             println!("<{username}> {text}");
//!         }
//!     });
//!
//!     client.connect("127.0.0.1", 9090).await?;
//!     client.send(&Message::Login {
//!         username: "captain".into(),
//!         password: "hunter2".into(),
//!     })
//!     .await?;
//!     # Ok(())
//! }
//! ```

mod client;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod transport;
mod writer;

pub use client::{Client, ConnectionState};
pub use dispatch::{DispatchRegistry, Subscription};
pub use error::{ClientError, Result};
pub use protocol::{decode_frame, encode_frame, DecodedFrame, Message, MessageType, PlayerInfo};
pub use writer::WriterHandle;
