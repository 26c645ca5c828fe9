//! Error types for the gateway core

use thiserror::Error;

use crate::types::TransactionId;

/// Failure kinds for a write attempt.
///
/// Exactly one of these (or the committed transaction id) comes back from
/// every call to [`Coordinator::submit`](crate::Coordinator::submit); no
/// network fault escapes the coordinator boundary uncategorized.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// Endorsement declined or structurally absent. Non-retryable: this is
    /// the expected-failure path for business-rule violations such as a
    /// duplicate record.
    #[error("proposal rejected by endorser (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    ProposalRejected { status: u16, message: Option<String> },

    /// The ordering service did not accept the transaction. Retryable with
    /// a fresh transaction id.
    #[error("ordering service rejected the transaction: {}", .info.as_deref().unwrap_or("no detail"))]
    OrderingFailed { info: Option<String> },

    /// The ordering service did not answer within the submission deadline.
    /// Retryable with a fresh transaction id.
    #[error("ordering service did not respond within {waited_ms}ms")]
    OrderingTimeout { waited_ms: u64 },

    /// No commit event within the deadline. Ledger state is unknown, not
    /// rolled back; query before retrying to avoid a duplicate write.
    #[error("no commit confirmation within {waited_ms}ms; ledger state is indeterminate")]
    CommitTimeout { waited_ms: u64 },

    /// The peer explicitly invalidated the transaction. Non-retryable with
    /// the same arguments.
    #[error("transaction invalidated by peer: {code}")]
    CommitInvalid { code: String },

    /// The event subscription mechanism itself failed. A hard failure of
    /// the attempt, not of the ledger write.
    #[error("event hub failure: {0}")]
    EventHub(String),

    /// Transport failure talking to peers or orderer.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}

impl SubmitError {
    /// Whether resubmitting with a fresh transaction id is safe.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmitError::OrderingFailed { .. }
                | SubmitError::OrderingTimeout { .. }
                | SubmitError::Channel(_)
        )
    }
}

/// Failure kinds for a read attempt.
#[derive(Error, Debug)]
pub enum QueryError {
    /// No usable payload: zero or multiple responses, or the peer returned
    /// an error value.
    #[error("query returned no usable payload")]
    NotFound,

    /// Transport failure talking to the query peers.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Errors at the channel/session seam.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("identity error: {0}")]
    Identity(String),
}

/// Caller-visible result of one write attempt.
pub type Outcome = Result<TransactionId, SubmitError>;

/// Caller-visible result of one read attempt: the raw query payload.
pub type QueryOutcome = Result<Vec<u8>, QueryError>;

/// Result type alias for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;
