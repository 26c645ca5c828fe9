//! Query Executor
//!
//! Read-only sibling of the coordinator: no transaction id, no ordering,
//! no commit wait. Idempotent and safe to retry freely.

use std::sync::Arc;

use tracing::debug;

use crate::channel::ChannelClient;
use crate::error::{QueryError, QueryOutcome};
use crate::types::{Operation, QueryResponse};

/// Executes read-only operations against the query-capable peers.
pub struct QueryExecutor {
    channel: Arc<dyn ChannelClient>,
}

impl QueryExecutor {
    pub fn new(channel: Arc<dyn ChannelClient>) -> Self {
        Self { channel }
    }

    /// Run one query and return the first well-formed payload.
    ///
    /// Exactly one peer response is expected. Zero or multiple responses,
    /// or a response that is itself an error value, resolve to
    /// [`QueryError::NotFound`].
    pub async fn query(&self, operation: Operation) -> QueryOutcome {
        debug!(operation = operation.name(), "sending query");

        let mut responses = self.channel.query(&operation).await?;

        let single = match (responses.pop(), responses.is_empty()) {
            (Some(response), true) => response,
            (_, _) => {
                debug!(
                    operation = operation.name(),
                    "unexpected query response count"
                );
                return Err(QueryError::NotFound);
            }
        };

        match single {
            QueryResponse::Payload(bytes) => Ok(bytes),
            QueryResponse::Error(message) => {
                debug!(
                    operation = operation.name(),
                    error = %message,
                    "peer returned error payload"
                );
                Err(QueryError::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ChannelResult;
    use crate::types::{EndorsedTransaction, Proposal, ProposalResult, SubmissionOutcome};

    struct StubQueryChannel {
        responses: Vec<QueryResponse>,
        operation_seen: Mutex<Option<Operation>>,
    }

    impl StubQueryChannel {
        fn returning(responses: Vec<QueryResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses,
                operation_seen: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ChannelClient for StubQueryChannel {
        async fn send_proposal(&self, _proposal: &Proposal) -> ChannelResult<ProposalResult> {
            unreachable!("queries never send proposals")
        }

        async fn broadcast(
            &self,
            _tx: &EndorsedTransaction,
        ) -> ChannelResult<SubmissionOutcome> {
            unreachable!("queries never reach the orderer")
        }

        async fn query(&self, operation: &Operation) -> ChannelResult<Vec<QueryResponse>> {
            *self.operation_seen.lock().unwrap() = Some(operation.clone());
            Ok(self.responses.clone())
        }
    }

    #[tokio::test]
    async fn single_payload_is_returned() {
        let channel =
            StubQueryChannel::returning(vec![QueryResponse::Payload(b"{\"tech\":\"orange\"}".to_vec())]);
        let executor = QueryExecutor::new(channel.clone());

        let payload = executor
            .query(Operation::new("get_tech", vec!["orange".to_string()]))
            .await
            .expect("payload expected");

        assert_eq!(payload, b"{\"tech\":\"orange\"}");
        let seen = channel.operation_seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.name(), "get_tech");
        assert_eq!(seen.args(), ["orange".to_string()]);
    }

    #[tokio::test]
    async fn error_payload_resolves_to_not_found() {
        let channel = StubQueryChannel::returning(vec![QueryResponse::Error(
            "no record for key".to_string(),
        )]);
        let executor = QueryExecutor::new(channel);

        let outcome = executor
            .query(Operation::new("get_tech", vec!["orange".to_string()]))
            .await;

        assert!(matches!(outcome, Err(QueryError::NotFound)));
    }

    #[tokio::test]
    async fn zero_responses_resolve_to_not_found() {
        let channel = StubQueryChannel::returning(vec![]);
        let executor = QueryExecutor::new(channel);

        let outcome = executor
            .query(Operation::new("get_all_tech", vec!["".to_string()]))
            .await;

        assert!(matches!(outcome, Err(QueryError::NotFound)));
    }

    #[tokio::test]
    async fn multiple_responses_resolve_to_not_found() {
        let channel = StubQueryChannel::returning(vec![
            QueryResponse::Payload(b"a".to_vec()),
            QueryResponse::Payload(b"b".to_vec()),
        ]);
        let executor = QueryExecutor::new(channel);

        let outcome = executor
            .query(Operation::new("query_tech", vec!["".to_string()]))
            .await;

        assert!(matches!(outcome, Err(QueryError::NotFound)));
    }

    #[tokio::test]
    async fn identical_queries_yield_identical_results() {
        let channel = StubQueryChannel::returning(vec![QueryResponse::Payload(b"stable".to_vec())]);
        let executor = QueryExecutor::new(channel);
        let op = Operation::new("get_cert_verify", vec!["cert-1".to_string()]);

        let first = executor.query(op.clone()).await.expect("payload");
        let second = executor.query(op).await.expect("payload");

        assert_eq!(first, second);
    }
}
