//! Gateway wire messages
//!
//! Messages exchanged with the ledger network endpoints. Every frame on
//! the wire is one of these, serde_json encoded behind a length prefix
//! (see `transport`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use groot_core::{Endorsement, TransactionId};

/// Broadcast status the ordering service answers with on acceptance.
pub const BROADCAST_SUCCESS: &str = "SUCCESS";

/// Wire message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayMessage {
    /// Client → peer: simulate and endorse a proposal.
    ProposalRequest(ProposalRequestPayload),
    /// Peer → client: endorsement result.
    ProposalResponse(ProposalResponsePayload),
    /// Client → orderer: sequence an endorsed transaction.
    BroadcastRequest(BroadcastRequestPayload),
    /// Orderer → client: accepted for sequencing or rejected.
    BroadcastResponse(BroadcastResponsePayload),
    /// Client → peer: read-only chaincode query.
    QueryRequest(QueryRequestPayload),
    /// Peer → client: query payload or error value.
    QueryResponse(QueryResponsePayload),
    /// Client → peer: signed registration for one transaction's commit
    /// event.
    RegisterTxEvent(RegisterTxEventPayload),
    /// Peer → client: the registration is active. Events emitted after
    /// this point are guaranteed to be delivered.
    RegisterAck(RegisterAckPayload),
    /// Peer → client: validation code for a committed transaction.
    TxEvent(TxEventPayload),
}

impl GatewayMessage {
    /// Message kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayMessage::ProposalRequest(_) => "ProposalRequest",
            GatewayMessage::ProposalResponse(_) => "ProposalResponse",
            GatewayMessage::BroadcastRequest(_) => "BroadcastRequest",
            GatewayMessage::BroadcastResponse(_) => "BroadcastResponse",
            GatewayMessage::QueryRequest(_) => "QueryRequest",
            GatewayMessage::QueryResponse(_) => "QueryResponse",
            GatewayMessage::RegisterTxEvent(_) => "RegisterTxEvent",
            GatewayMessage::RegisterAck(_) => "RegisterAck",
            GatewayMessage::TxEvent(_) => "TxEvent",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRequestPayload {
    pub tx_id: TransactionId,
    pub channel_id: String,
    pub chaincode_id: String,
    pub fcn: String,
    pub args: Vec<String>,
    /// Submitting identity, `user_id:pubkey_hex`.
    pub creator: String,
    /// Client signature over the proposal digest, hex encoded.
    pub signature: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalResponsePayload {
    pub status: u16,
    pub message: Option<String>,
    /// Present iff the peer endorsed the simulation.
    pub endorsement: Option<Endorsement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastRequestPayload {
    pub tx_id: TransactionId,
    pub channel_id: String,
    /// Serialized endorsed transaction, opaque to the orderer.
    pub payload: Vec<u8>,
    pub creator: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponsePayload {
    /// `SUCCESS` on acceptance for sequencing; anything else is a
    /// rejection code.
    pub status: String,
    pub info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequestPayload {
    pub channel_id: String,
    pub chaincode_id: String,
    pub fcn: String,
    pub args: Vec<String>,
    pub creator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponsePayload {
    pub payload: Option<Vec<u8>>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTxEventPayload {
    pub tx_id: TransactionId,
    pub creator: String,
    /// Event registration must be signed.
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAckPayload {
    pub tx_id: TransactionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxEventPayload {
    pub tx_id: TransactionId,
    /// `VALID` or a specific invalidation reason.
    pub code: String,
}
