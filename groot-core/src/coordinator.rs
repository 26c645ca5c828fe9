//! Transaction Coordinator
//!
//! Owns the full lifecycle of one write: build proposal → submit to
//! endorsers → validate endorsement → submit to orderer → wait for the
//! peer commit event → resolve the final outcome.
//!
//! State machine: `Built -> ProposalSent -> {Rejected | AwaitingResult}
//! -> Resolved`. `Resolved` is terminal; exactly one [`Outcome`] is
//! produced per attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::channel::{ChannelClient, CommitEventSource, CommitListener};
use crate::config::CoordinatorConfig;
use crate::error::{Outcome, SubmitError};
use crate::types::{
    CommitStatus, EndorsedTransaction, Operation, Proposal, SubmissionOutcome, TransactionId,
};

/// Coordinates write operations against the ledger network.
///
/// Holds only long-lived session handles; everything per-attempt is local
/// to [`submit`](Self::submit), so concurrent calls never share mutable
/// state.
pub struct Coordinator {
    channel: Arc<dyn ChannelClient>,
    events: Arc<dyn CommitEventSource>,
    config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(
        channel: Arc<dyn ChannelClient>,
        events: Arc<dyn CommitEventSource>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            channel,
            events,
            config,
        }
    }

    /// Submit one write operation and resolve it to a single [`Outcome`].
    ///
    /// Returns the committed transaction id, or the first failure the
    /// resolution order surfaces: proposal rejection, then ordering
    /// failure, then commit timeout or invalidation.
    pub async fn submit(&self, operation: Operation) -> Outcome {
        let tx_id = TransactionId::generate();
        let proposal = Proposal::new(tx_id.clone(), operation);

        debug!(
            tx_id = %tx_id,
            operation = proposal.operation().name(),
            "sending transaction proposal"
        );

        let endorsement = self.channel.send_proposal(&proposal).await?;
        if !endorsement.is_good() {
            warn!(
                tx_id = %tx_id,
                operation = proposal.operation().name(),
                status = endorsement.status,
                "transaction proposal rejected"
            );
            return Err(SubmitError::ProposalRejected {
                status: endorsement.status,
                message: endorsement.message,
            });
        }

        debug!(
            tx_id = %tx_id,
            endorsements = endorsement.endorsements.len(),
            "transaction proposal endorsed"
        );

        let endorsed = EndorsedTransaction::new(proposal, endorsement.endorsements);

        // Registration must exist before the peer could emit the event.
        let listener = self
            .events
            .register(&tx_id)
            .await
            .map_err(|e| SubmitError::EventHub(e.to_string()))?;

        // Submission and commit-wait are logically independent
        // confirmations; await both (a join, never a race).
        let (submission, commit) = tokio::join!(
            self.broadcast_with_deadline(&endorsed),
            Self::await_commit(listener, self.config.commit_wait()),
        );

        self.resolve(tx_id, submission?, commit?)
    }

    async fn broadcast_with_deadline(
        &self,
        tx: &EndorsedTransaction,
    ) -> Result<SubmissionOutcome, SubmitError> {
        match timeout(self.config.submit_timeout(), self.channel.broadcast(tx)).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => Err(SubmitError::Channel(e)),
            Err(_) => Err(SubmitError::OrderingTimeout {
                waited_ms: self.config.submit_timeout_ms,
            }),
        }
    }

    /// Wait for the commit event or the deadline, then tear the
    /// subscription down. The subscription is closed on every exit path.
    async fn await_commit(
        mut listener: Box<dyn CommitListener>,
        deadline: Duration,
    ) -> Result<CommitStatus, SubmitError> {
        let status = match timeout(deadline, listener.wait()).await {
            Ok(Ok(notice)) => Ok(CommitStatus::from_code(&notice.code)),
            Ok(Err(e)) => Err(SubmitError::EventHub(e.to_string())),
            Err(_) => Ok(CommitStatus::Timeout),
        };
        listener.close().await;
        status
    }

    /// Resolution table: the orderer's answer is checked first, then the
    /// peer's validation. Outcome reflects both, never either alone.
    fn resolve(
        &self,
        tx_id: TransactionId,
        submission: SubmissionOutcome,
        commit: CommitStatus,
    ) -> Outcome {
        if !submission.is_accepted() {
            warn!(tx_id = %tx_id, "ordering service rejected the transaction");
            return Err(SubmitError::OrderingFailed {
                info: submission.info,
            });
        }

        match commit {
            CommitStatus::Valid => {
                info!(tx_id = %tx_id, "transaction committed on peer");
                Ok(tx_id)
            }
            CommitStatus::Timeout => {
                warn!(
                    tx_id = %tx_id,
                    waited_ms = self.config.commit_wait_ms,
                    "no commit event within deadline; ledger state unknown"
                );
                Err(SubmitError::CommitTimeout {
                    waited_ms: self.config.commit_wait_ms,
                })
            }
            CommitStatus::Invalid(code) => {
                warn!(tx_id = %tx_id, code = %code, "transaction invalidated by peer");
                Err(SubmitError::CommitInvalid { code })
            }
        }
    }
}
