//! Groot Gateway Core
//!
//! Turns "write record X to the ledger" into a durable, peer-confirmed
//! ledger write with a bounded wait and a single deterministic outcome.
//!
//! The two entry points are:
//! - [`Coordinator::submit`] — build a proposal, collect endorsements,
//!   forward the endorsed transaction to the ordering service and wait for
//!   the peer commit event, resolving everything into one [`Outcome`].
//! - [`QueryExecutor::query`] — the read-only sibling: no transaction id,
//!   no ordering, no commit wait.
//!
//! Network access happens behind the [`channel`] traits; this crate owns
//! the lifecycle logic only.

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod query;
pub mod types;

pub use channel::{ChannelClient, CommitEventSource, CommitListener};
pub use config::CoordinatorConfig;
pub use coordinator::Coordinator;
pub use error::{ChannelError, ChannelResult, Outcome, QueryError, QueryOutcome, SubmitError};
pub use query::QueryExecutor;
pub use types::{
    CommitNotice, CommitStatus, EndorsedTransaction, Endorsement, Operation, Proposal,
    ProposalResult, QueryResponse, SubmissionOutcome, SubmissionStatus, TransactionId,
    ENDORSEMENT_OK, VALIDATION_OK,
};
