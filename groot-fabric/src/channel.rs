//! Fabric channel client
//!
//! Long-lived session against one channel: pooled connections to the
//! endorsing peers and the ordering service, built once at startup and
//! read-only afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use groot_core::{
    ChannelClient, ChannelError, ChannelResult, EndorsedTransaction, Operation, Proposal,
    ProposalResult, QueryResponse, SubmissionOutcome, SubmissionStatus, TransactionId,
    ENDORSEMENT_OK,
};

use crate::identity::Identity;
use crate::message::{
    BroadcastRequestPayload, GatewayMessage, ProposalRequestPayload, QueryRequestPayload,
    BROADCAST_SUCCESS,
};
use crate::transport::Endpoint;

/// Channel/session configuration.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Channel (ledger) identifier.
    pub channel_id: String,
    /// Chaincode deployed on the channel.
    pub chaincode_id: String,
    /// Endorsing peers, minimum one.
    pub peer_addresses: Vec<String>,
    /// Ordering service endpoint.
    pub orderer_address: String,
    /// Commit-event peer; defaults to the first endorsing peer.
    pub event_address: Option<String>,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds.
    pub read_timeout_ms: u64,
    /// Write timeout in milliseconds.
    pub write_timeout_ms: u64,
    /// Maximum message size in bytes.
    pub max_message_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel_id: "mychannel".to_string(),
            chaincode_id: "groot-chaincode".to_string(),
            peer_addresses: vec!["127.0.0.1:7051".to_string()],
            orderer_address: "127.0.0.1:7050".to_string(),
            event_address: None,
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
            write_timeout_ms: 10000,
            max_message_size: 16 * 1024 * 1024,
        }
    }
}

impl ChannelConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Where commit events are delivered.
    pub fn event_peer(&self) -> ChannelResult<String> {
        self.event_address
            .clone()
            .or_else(|| self.peer_addresses.first().cloned())
            .ok_or_else(|| ChannelError::Connection("no event peer configured".to_string()))
    }
}

/// Pooled client for one channel's peers and orderer.
pub struct FabricChannel {
    config: ChannelConfig,
    identity: Arc<Identity>,
    peers: Vec<Endpoint>,
    orderer: Endpoint,
}

impl FabricChannel {
    pub fn new(config: ChannelConfig, identity: Arc<Identity>) -> Self {
        let peers = config
            .peer_addresses
            .iter()
            .cloned()
            .map(Endpoint::new)
            .collect();
        let orderer = Endpoint::new(config.orderer_address.clone());
        Self {
            config,
            identity,
            peers,
            orderer,
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    fn proposal_signing_bytes(tx_id: &TransactionId, operation: &Operation) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(tx_id.as_str().as_bytes());
        data.extend_from_slice(operation.name().as_bytes());
        for arg in operation.args() {
            data.extend_from_slice(arg.as_bytes());
        }
        data
    }

    fn proposal_request(&self, proposal: &Proposal) -> GatewayMessage {
        let operation = proposal.operation();
        let signing = Self::proposal_signing_bytes(proposal.tx_id(), operation);
        GatewayMessage::ProposalRequest(ProposalRequestPayload {
            tx_id: proposal.tx_id().clone(),
            channel_id: self.config.channel_id.clone(),
            chaincode_id: self.config.chaincode_id.clone(),
            fcn: operation.name().to_string(),
            args: operation.args().to_vec(),
            creator: self.identity.creator(),
            signature: self.identity.sign(&signing),
            timestamp: proposal.created_at(),
        })
    }
}

#[async_trait]
impl ChannelClient for FabricChannel {
    async fn send_proposal(&self, proposal: &Proposal) -> ChannelResult<ProposalResult> {
        let request = self.proposal_request(proposal);

        let mut status = None;
        let mut message = None;
        let mut endorsements = Vec::new();

        for peer in &self.peers {
            let response = peer.request(&request, &self.config).await?;
            match response {
                GatewayMessage::ProposalResponse(reply) => {
                    debug!(
                        peer = peer.address(),
                        status = reply.status,
                        "proposal response received"
                    );
                    // The first response decides goodness; endorsements
                    // from every approving peer ride along.
                    if status.is_none() {
                        status = Some(reply.status);
                        message = reply.message;
                    }
                    if reply.status == ENDORSEMENT_OK {
                        if let Some(endorsement) = reply.endorsement {
                            endorsements.push(endorsement);
                        }
                    }
                }
                other => {
                    return Err(ChannelError::Protocol(format!(
                        "unexpected reply to proposal from {}: {}",
                        peer.address(),
                        other.kind()
                    )))
                }
            }
        }

        let status = status
            .ok_or_else(|| ChannelError::Connection("no endorsing peers configured".to_string()))?;

        Ok(ProposalResult {
            status,
            message,
            endorsements,
        })
    }

    async fn broadcast(&self, tx: &EndorsedTransaction) -> ChannelResult<SubmissionOutcome> {
        let payload = serde_json::to_vec(tx)
            .map_err(|e| ChannelError::Protocol(format!("encoding endorsed transaction: {e}")))?;

        let request = GatewayMessage::BroadcastRequest(BroadcastRequestPayload {
            tx_id: tx.proposal().tx_id().clone(),
            channel_id: self.config.channel_id.clone(),
            signature: self.identity.sign(&payload),
            creator: self.identity.creator(),
            payload,
        });

        match self.orderer.request(&request, &self.config).await? {
            GatewayMessage::BroadcastResponse(reply) => {
                if reply.status == BROADCAST_SUCCESS {
                    Ok(SubmissionOutcome::accepted())
                } else {
                    Ok(SubmissionOutcome {
                        status: SubmissionStatus::Rejected,
                        info: reply.info.or(Some(reply.status)),
                    })
                }
            }
            other => Err(ChannelError::Protocol(format!(
                "unexpected reply to broadcast: {}",
                other.kind()
            ))),
        }
    }

    async fn query(&self, operation: &Operation) -> ChannelResult<Vec<QueryResponse>> {
        let request = GatewayMessage::QueryRequest(QueryRequestPayload {
            channel_id: self.config.channel_id.clone(),
            chaincode_id: self.config.chaincode_id.clone(),
            fcn: operation.name().to_string(),
            args: operation.args().to_vec(),
            creator: self.identity.creator(),
        });

        let mut responses = Vec::new();
        for peer in &self.peers {
            match peer.request(&request, &self.config).await? {
                GatewayMessage::QueryResponse(reply) => {
                    responses.push(match (reply.payload, reply.error) {
                        (Some(bytes), _) => QueryResponse::Payload(bytes),
                        (None, Some(error)) => QueryResponse::Error(error),
                        (None, None) => {
                            QueryResponse::Error("empty query response".to_string())
                        }
                    });
                }
                other => {
                    return Err(ChannelError::Protocol(format!(
                        "unexpected reply to query from {}: {}",
                        peer.address(),
                        other.kind()
                    )))
                }
            }
        }
        Ok(responses)
    }
}
