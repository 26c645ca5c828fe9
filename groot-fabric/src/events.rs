//! Commit-event subscriptions
//!
//! One fresh connection per write attempt: connect to the event peer,
//! send a signed registration for the transaction id, then read events
//! until the matching one arrives. The coordinator bounds the wait and
//! closes the subscription on every exit path.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use groot_core::{
    ChannelError, ChannelResult, CommitEventSource, CommitListener, CommitNotice, TransactionId,
};

use crate::channel::ChannelConfig;
use crate::identity::Identity;
use crate::message::{GatewayMessage, RegisterTxEventPayload};
use crate::transport::{io_with_deadline, read_frame, write_frame};

pub struct FabricEventSource {
    config: ChannelConfig,
    identity: Arc<Identity>,
}

impl FabricEventSource {
    pub fn new(config: ChannelConfig, identity: Arc<Identity>) -> Self {
        Self { config, identity }
    }
}

#[async_trait]
impl CommitEventSource for FabricEventSource {
    async fn register(&self, tx_id: &TransactionId) -> ChannelResult<Box<dyn CommitListener>> {
        let address = self.config.event_peer()?;

        let mut stream = io_with_deadline(
            Some(self.config.connect_timeout()),
            "connecting to event peer",
            TcpStream::connect(&address),
        )
        .await?;

        let registration = GatewayMessage::RegisterTxEvent(RegisterTxEventPayload {
            tx_id: tx_id.clone(),
            creator: self.identity.creator(),
            signature: self.identity.sign(tx_id.as_str().as_bytes()),
        });
        write_frame(
            &mut stream,
            &registration,
            self.config.max_message_size,
            Some(self.config.write_timeout()),
        )
        .await?;

        // A registration is only live once acknowledged. Returning before
        // the ack could let the peer process the registration after the
        // commit event fired, turning a committed write into a timeout.
        match read_frame(
            &mut stream,
            self.config.max_message_size,
            Some(self.config.read_timeout()),
        )
        .await?
        {
            GatewayMessage::RegisterAck(ack) if ack.tx_id == *tx_id => {}
            GatewayMessage::RegisterAck(ack) => {
                return Err(ChannelError::Protocol(format!(
                    "registration acknowledged for wrong transaction: {}",
                    ack.tx_id
                )))
            }
            other => {
                return Err(ChannelError::Protocol(format!(
                    "unexpected reply to event registration: {}",
                    other.kind()
                )))
            }
        }

        debug!(tx_id = %tx_id, event_peer = %address, "commit event registration acknowledged");

        Ok(Box::new(FabricCommitListener {
            stream: Some(stream),
            tx_id: tx_id.clone(),
            max_message_size: self.config.max_message_size,
        }))
    }
}

struct FabricCommitListener {
    stream: Option<TcpStream>,
    tx_id: TransactionId,
    max_message_size: usize,
}

#[async_trait]
impl CommitListener for FabricCommitListener {
    async fn wait(&mut self) -> ChannelResult<CommitNotice> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ChannelError::Connection("subscription already closed".to_string()))?;

        loop {
            // Unbounded read; the coordinator owns the deadline.
            match read_frame(stream, self.max_message_size, None).await? {
                GatewayMessage::TxEvent(event) if event.tx_id == self.tx_id => {
                    return Ok(CommitNotice {
                        tx_id: event.tx_id,
                        code: event.code,
                    });
                }
                // Events for other transactions on the same channel.
                GatewayMessage::TxEvent(_) => continue,
                other => {
                    return Err(ChannelError::Protocol(format!(
                        "unexpected message on event stream: {}",
                        other.kind()
                    )))
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
    }
}
