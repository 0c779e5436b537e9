//! TCP connection establishment.

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::Result;

/// Read half of a connected game-server socket.
pub type TcpReader = OwnedReadHalf;
/// Write half of a connected game-server socket.
pub type TcpWriter = OwnedWriteHalf;

/// Open a TCP connection to the game server and split it.
///
/// `TCP_NODELAY` is set: frames are small and latency-sensitive, Nagle
/// buffering only adds turn lag.
pub async fn connect(host: &str, port: u16) -> Result<(TcpReader, TcpWriter)> {
    let stream = TcpStream::connect((host, port)).await?;
    stream.set_nodelay(true)?;
    debug!(host, port, "tcp connection established");
    Ok(stream.into_split())
}
