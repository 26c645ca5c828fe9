//! Domain types for the transaction pipeline
//!
//! One result type per stage: proposal, submission, commit event. The
//! coordinator owns all of these for the duration of one attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Endorsement success status code.
pub const ENDORSEMENT_OK: u16 = 200;

/// Validation code for a committed transaction.
pub const VALIDATION_OK: &str = "VALID";

/// Opaque identifier minted once per write attempt.
///
/// Correlates the proposal, the submitted transaction and the commit
/// event. Never reused, even on retry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Mint a fresh transaction id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One ledger operation: a symbolic chaincode function name and its
/// ordered string arguments. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    name: String,
    args: Vec<String>,
}

impl Operation {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Unsigned-by-network, client-signed request for endorsers to simulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    tx_id: TransactionId,
    operation: Operation,
    created_at: DateTime<Utc>,
}

impl Proposal {
    pub fn new(tx_id: TransactionId, operation: Operation) -> Self {
        Self {
            tx_id,
            operation,
            created_at: Utc::now(),
        }
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A single peer's signed endorsement payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endorsement {
    /// Endpoint of the endorsing peer.
    pub endorser: String,
    /// Opaque simulation payload.
    pub payload: Vec<u8>,
    /// Peer signature over the payload, hex encoded.
    pub signature: String,
}

/// Response collected from the endorsing peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalResult {
    /// Status of the first peer response.
    pub status: u16,
    /// Optional message from the first peer response.
    pub message: Option<String>,
    /// Endorsements from every peer that approved the simulation.
    pub endorsements: Vec<Endorsement>,
}

impl ProposalResult {
    /// Endorsement is good iff the status is the success code and at least
    /// one endorsement is present.
    pub fn is_good(&self) -> bool {
        self.status == ENDORSEMENT_OK && !self.endorsements.is_empty()
    }
}

/// A proposal plus the endorsements backing it, ready for the orderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndorsedTransaction {
    proposal: Proposal,
    endorsements: Vec<Endorsement>,
}

impl EndorsedTransaction {
    pub fn new(proposal: Proposal, endorsements: Vec<Endorsement>) -> Self {
        Self {
            proposal,
            endorsements,
        }
    }

    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    pub fn endorsements(&self) -> &[Endorsement] {
        &self.endorsements
    }
}

/// Whether the ordering service accepted the batch for sequencing.
///
/// Independent from ledger commit: `Accepted` means sequencing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Accepted,
    Rejected,
}

/// Result of forwarding the endorsed transaction to the ordering service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub status: SubmissionStatus,
    pub info: Option<String>,
}

impl SubmissionOutcome {
    pub fn accepted() -> Self {
        Self {
            status: SubmissionStatus::Accepted,
            info: None,
        }
    }

    pub fn rejected(info: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Rejected,
            info: Some(info.into()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == SubmissionStatus::Accepted
    }
}

/// Peer-emitted notification that a transaction was validated or
/// invalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitNotice {
    pub tx_id: TransactionId,
    /// Validation code; `VALID` or a specific invalidation reason.
    pub code: String,
}

/// Resolved commit-wait result. Exactly one is produced per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitStatus {
    Valid,
    Invalid(String),
    Timeout,
}

impl CommitStatus {
    pub fn from_code(code: &str) -> Self {
        if code == VALIDATION_OK {
            Self::Valid
        } else {
            Self::Invalid(code.to_string())
        }
    }
}

/// One peer's answer to a query: a payload, or an error value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueryResponse {
    Payload(Vec<u8>),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_status_parses_validation_codes() {
        assert_eq!(CommitStatus::from_code("VALID"), CommitStatus::Valid);
        assert_eq!(
            CommitStatus::from_code("ENDORSEMENT_POLICY_FAILURE"),
            CommitStatus::Invalid("ENDORSEMENT_POLICY_FAILURE".to_string())
        );
    }

    #[test]
    fn proposal_result_requires_status_and_endorsement() {
        let endorsement = Endorsement {
            endorser: "peer0".to_string(),
            payload: vec![1, 2, 3],
            signature: "ab".to_string(),
        };

        let good = ProposalResult {
            status: 200,
            message: None,
            endorsements: vec![endorsement.clone()],
        };
        assert!(good.is_good());

        let bad_status = ProposalResult {
            status: 500,
            message: Some("This technology already exists".to_string()),
            endorsements: vec![endorsement],
        };
        assert!(!bad_status.is_good());

        let no_endorsements = ProposalResult {
            status: 200,
            message: None,
            endorsements: vec![],
        };
        assert!(!no_endorsements.is_good());
    }

    #[test]
    fn transaction_ids_are_unique() {
        let a = TransactionId::generate();
        let b = TransactionId::generate();
        assert_ne!(a, b);
    }
}
