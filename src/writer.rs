//! Dedicated writer task for outbound frames.
//!
//! All sends funnel through one mpsc channel drained by a single task that
//! owns the socket's write half. Concurrent callers never touch the socket,
//! so frames can never interleave mid-write.
//!
//! ```text
//! send()  ─┐
//! send()  ─┼─► mpsc::Sender<Bytes> ─► writer task ─► socket
//! send()  ─┘
//! ```
//!
//! Frames are fixed-size and flow at game rate, so the loop is plain
//! `write_all` + `flush` per frame.

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{ClientError, Result};

/// Outbound channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Handle for sending encoded frames to the writer task.
///
/// Cheaply cloneable; dropping every clone shuts the task down cleanly.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Bytes>,
}

impl WriterHandle {
    /// Queue one encoded frame for writing.
    ///
    /// Waits for channel capacity if the queue is full. Returns
    /// [`ClientError::ConnectionClosed`] once the writer task has stopped.
    pub async fn send(&self, frame: Bytes) -> Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| ClientError::ConnectionClosed)
    }
}

/// Spawn the writer task and return a handle for sending frames.
///
/// The task ends when every [`WriterHandle`] clone is dropped (clean
/// shutdown) or on the first write error; the `JoinHandle` reports which.
pub fn spawn_writer_task<W>(writer: W) -> (WriterHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_CAPACITY);
    let task = tokio::spawn(writer_loop(rx, writer));
    (WriterHandle { tx }, task)
}

async fn writer_loop<W>(mut rx: mpsc::Receiver<Bytes>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = rx.recv().await {
        writer.write_all(&frame).await?;
        writer.flush().await?;
    }
    // Channel closed, clean shutdown.
    Ok(())
}
