//! Framed transport
//!
//! Wire format: u32 big-endian length prefix followed by the serde_json
//! encoded [`GatewayMessage`], with a maximum-size guard and per-operation
//! timeouts. Request/response endpoints keep one pooled connection each
//! and reconnect on demand.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::debug;

use groot_core::{ChannelError, ChannelResult};

use crate::channel::ChannelConfig;
use crate::message::GatewayMessage;

/// Run one I/O future under an optional deadline.
pub(crate) async fn io_with_deadline<T>(
    deadline: Option<Duration>,
    what: &str,
    fut: impl Future<Output = std::io::Result<T>>,
) -> ChannelResult<T> {
    let result = match deadline {
        Some(deadline) => timeout(deadline, fut)
            .await
            .map_err(|_| ChannelError::Timeout(what.to_string()))?,
        None => fut.await,
    };
    result.map_err(|e| ChannelError::Connection(format!("{what}: {e}")))
}

/// Write one length-prefixed message.
pub(crate) async fn write_frame<W: AsyncWrite + Unpin>(
    stream: &mut W,
    message: &GatewayMessage,
    max_message_size: usize,
    deadline: Option<Duration>,
) -> ChannelResult<()> {
    let data = serde_json::to_vec(message)
        .map_err(|e| ChannelError::Protocol(format!("encoding {}: {e}", message.kind())))?;

    if data.len() > max_message_size {
        return Err(ChannelError::Protocol(format!(
            "message too large: {} bytes (max {})",
            data.len(),
            max_message_size
        )));
    }

    let len = (data.len() as u32).to_be_bytes();
    io_with_deadline(deadline, "writing frame header", stream.write_all(&len)).await?;
    io_with_deadline(deadline, "writing frame body", stream.write_all(&data)).await?;
    io_with_deadline(deadline, "flushing frame", stream.flush()).await
}

/// Read one length-prefixed message. `deadline: None` waits indefinitely;
/// event listeners rely on that, their deadline lives in the coordinator.
pub(crate) async fn read_frame<R: AsyncRead + Unpin>(
    stream: &mut R,
    max_message_size: usize,
    deadline: Option<Duration>,
) -> ChannelResult<GatewayMessage> {
    let mut len_buf = [0u8; 4];
    io_with_deadline(deadline, "reading frame header", stream.read_exact(&mut len_buf)).await?;

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_message_size {
        return Err(ChannelError::Protocol(format!(
            "incoming message too large: {len} bytes (max {max_message_size})"
        )));
    }

    let mut buf = vec![0u8; len];
    io_with_deadline(deadline, "reading frame body", stream.read_exact(&mut buf)).await?;

    serde_json::from_slice(&buf).map_err(|e| ChannelError::Protocol(format!("decoding frame: {e}")))
}

/// One remote endpoint with a pooled connection, reconnected on demand.
pub(crate) struct Endpoint {
    address: String,
    stream: Mutex<Option<TcpStream>>,
}

impl Endpoint {
    pub(crate) fn new(address: String) -> Self {
        Self {
            address,
            stream: Mutex::new(None),
        }
    }

    pub(crate) fn address(&self) -> &str {
        &self.address
    }

    /// Send one request and read one response.
    ///
    /// The connection is taken out of the pool for the whole exchange and
    /// only put back after the response was fully read. If this future is
    /// cancelled or fails mid-exchange the stream is dropped with it, so a
    /// half-used connection with a response still in flight can never be
    /// handed to a later request.
    pub(crate) async fn request(
        &self,
        message: &GatewayMessage,
        config: &ChannelConfig,
    ) -> ChannelResult<GatewayMessage> {
        let mut stream = match self.stream.lock().await.take() {
            Some(stream) => stream,
            None => {
                debug!(address = %self.address, "connecting");
                io_with_deadline(
                    Some(config.connect_timeout()),
                    "connecting",
                    TcpStream::connect(&self.address),
                )
                .await?
            }
        };

        write_frame(
            &mut stream,
            message,
            config.max_message_size,
            Some(config.write_timeout()),
        )
        .await?;
        let response =
            read_frame(&mut stream, config.max_message_size, Some(config.read_timeout())).await?;

        *self.stream.lock().await = Some(stream);
        Ok(response)
    }
}
