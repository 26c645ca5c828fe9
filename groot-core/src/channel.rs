//! Channel/session seam
//!
//! The ledger network (endorsing peers, ordering service, event delivery)
//! is an external collaborator. The coordinator only sees these traits;
//! `groot-fabric` provides the wire implementation and tests provide
//! stubs.
//!
//! Implementations must be safe for concurrent read-only use: each call
//! may run alongside any number of others, and per-attempt resources
//! (proposals, event subscriptions) are ephemeral rather than shared.

use async_trait::async_trait;

use crate::error::ChannelResult;
use crate::types::{
    CommitNotice, EndorsedTransaction, Operation, Proposal, ProposalResult, QueryResponse,
    SubmissionOutcome, TransactionId,
};

/// Client for the channel's peers and ordering service.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Send a proposal to the configured endorsing peers and collect their
    /// responses into one [`ProposalResult`].
    async fn send_proposal(&self, proposal: &Proposal) -> ChannelResult<ProposalResult>;

    /// Forward an endorsed transaction to the ordering service.
    ///
    /// The returned outcome reflects orderer acceptance for sequencing
    /// only, never ledger commit.
    async fn broadcast(&self, tx: &EndorsedTransaction) -> ChannelResult<SubmissionOutcome>;

    /// Send a read-only operation to the query-capable peers and return
    /// every response received.
    async fn query(&self, operation: &Operation) -> ChannelResult<Vec<QueryResponse>>;
}

/// Source of peer-emitted transaction commit events.
#[async_trait]
pub trait CommitEventSource: Send + Sync {
    /// Open a subscription and register interest in one transaction id.
    ///
    /// Registration must be complete before the corresponding event could
    /// plausibly fire; callers rely on this to avoid a missed-event race.
    async fn register(&self, tx_id: &TransactionId) -> ChannelResult<Box<dyn CommitListener>>;
}

/// A live commit-event subscription for one transaction id.
#[async_trait]
pub trait CommitListener: Send {
    /// Wait for the commit event. Unbounded; the caller imposes the
    /// deadline.
    async fn wait(&mut self) -> ChannelResult<CommitNotice>;

    /// Tear the subscription down. Idempotent; called on every exit path.
    async fn close(&mut self);
}
