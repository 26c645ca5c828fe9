//! End-to-end submission and query flows against stub network endpoints.
//!
//! Spins up in-process TCP stubs for an endorsing peer, the ordering
//! service and the event peer, then drives the real coordinator through
//! the full proposal → broadcast → commit-event pipeline.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use groot_core::{Coordinator, CoordinatorConfig, Endorsement, Operation, QueryExecutor};
use groot_fabric::message::{
    BroadcastResponsePayload, ProposalResponsePayload, QueryResponsePayload, RegisterAckPayload,
    TxEventPayload,
};
use groot_fabric::{ChannelConfig, FabricChannel, FabricEventSource, GatewayMessage, Identity};

async fn read_message(stream: &mut TcpStream) -> GatewayMessage {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await.unwrap();
    let mut buf = vec![0u8; u32::from_be_bytes(len_buf) as usize];
    stream.read_exact(&mut buf).await.unwrap();
    serde_json::from_slice(&buf).unwrap()
}

async fn write_message(stream: &mut TcpStream, message: &GatewayMessage) {
    let data = serde_json::to_vec(message).unwrap();
    stream.write_all(&(data.len() as u32).to_be_bytes()).await.unwrap();
    stream.write_all(&data).await.unwrap();
}

/// Endorsing peer stub: endorses every proposal, answers queries for the
/// key "orange" with an error value and everything else with a payload.
async fn spawn_peer() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                loop {
                    let reply = match read_message(&mut stream).await {
                        GatewayMessage::ProposalRequest(request) => {
                            GatewayMessage::ProposalResponse(ProposalResponsePayload {
                                status: 200,
                                message: None,
                                endorsement: Some(Endorsement {
                                    endorser: "peer0".to_string(),
                                    payload: serde_json::to_vec(&request.args).unwrap(),
                                    signature: "cafe".to_string(),
                                }),
                            })
                        }
                        GatewayMessage::QueryRequest(request) => {
                            if request.args == ["orange".to_string()] {
                                GatewayMessage::QueryResponse(QueryResponsePayload {
                                    payload: None,
                                    error: Some("no record for key orange".to_string()),
                                })
                            } else {
                                GatewayMessage::QueryResponse(QueryResponsePayload {
                                    payload: Some(b"{\"technology\":\"LIDAR\"}".to_vec()),
                                    error: None,
                                })
                            }
                        }
                        _ => return,
                    };
                    write_message(&mut stream, &reply).await;
                }
            });
        }
    });
    address
}

/// Ordering service stub: accepts every broadcast.
async fn spawn_orderer() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                loop {
                    match read_message(&mut stream).await {
                        GatewayMessage::BroadcastRequest(_) => {
                            write_message(
                                &mut stream,
                                &GatewayMessage::BroadcastResponse(BroadcastResponsePayload {
                                    status: "SUCCESS".to_string(),
                                    info: None,
                                }),
                            )
                            .await;
                        }
                        _ => return,
                    }
                }
            });
        }
    });
    address
}

/// Event peer stub: acknowledges the registration, emits an unrelated
/// event first, then the VALID event for the registered transaction.
async fn spawn_event_peer() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                if let GatewayMessage::RegisterTxEvent(registration) =
                    read_message(&mut stream).await
                {
                    write_message(
                        &mut stream,
                        &GatewayMessage::RegisterAck(RegisterAckPayload {
                            tx_id: registration.tx_id.clone(),
                        }),
                    )
                    .await;
                    write_message(
                        &mut stream,
                        &GatewayMessage::TxEvent(TxEventPayload {
                            tx_id: groot_core::TransactionId::from("some-other-tx"),
                            code: "VALID".to_string(),
                        }),
                    )
                    .await;
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    write_message(
                        &mut stream,
                        &GatewayMessage::TxEvent(TxEventPayload {
                            tx_id: registration.tx_id,
                            code: "VALID".to_string(),
                        }),
                    )
                    .await;
                }
            });
        }
    });
    address
}

async fn gateway() -> (Coordinator, QueryExecutor) {
    let config = ChannelConfig {
        peer_addresses: vec![spawn_peer().await],
        orderer_address: spawn_orderer().await,
        event_address: Some(spawn_event_peer().await),
        ..ChannelConfig::default()
    };
    let identity = Arc::new(Identity::generate("user1"));
    let channel = Arc::new(FabricChannel::new(config.clone(), identity.clone()));
    let events = Arc::new(FabricEventSource::new(config, identity));

    (
        Coordinator::new(channel.clone(), events, CoordinatorConfig::default()),
        QueryExecutor::new(channel),
    )
}

#[tokio::test]
async fn submit_commits_over_the_wire() {
    let (coordinator, _) = gateway().await;

    let operation = Operation::new(
        "add_cont",
        [
            "LIDAR",
            "patent",
            "AcmeCo",
            "123",
            "24m",
            "spec.pdf",
            "abcd1234",
            "2024-01-01",
            "active",
        ]
        .map(String::from)
        .to_vec(),
    );

    let tx_id = coordinator.submit(operation).await.expect("should commit");
    assert!(!tx_id.as_str().is_empty());
}

#[tokio::test]
async fn sequential_submits_reuse_the_session() {
    let (coordinator, _) = gateway().await;

    let op = || Operation::new("add_client", ["LIDAR", "AcmeCo", "12", "active"].map(String::from).to_vec());

    let first = coordinator.submit(op()).await.expect("first commit");
    let second = coordinator.submit(op()).await.expect("second commit");
    assert_ne!(first, second);
}

#[tokio::test]
async fn unacknowledged_registration_fails_the_submit() {
    // Event peer that answers the registration with an event instead of
    // an ack; the write must fail before the orderer is ever involved.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let event_address = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            tokio::spawn(async move {
                if let GatewayMessage::RegisterTxEvent(registration) =
                    read_message(&mut stream).await
                {
                    write_message(
                        &mut stream,
                        &GatewayMessage::TxEvent(TxEventPayload {
                            tx_id: registration.tx_id,
                            code: "VALID".to_string(),
                        }),
                    )
                    .await;
                }
            });
        }
    });

    let config = ChannelConfig {
        peer_addresses: vec![spawn_peer().await],
        orderer_address: spawn_orderer().await,
        event_address: Some(event_address),
        ..ChannelConfig::default()
    };
    let identity = Arc::new(Identity::generate("user1"));
    let channel = Arc::new(FabricChannel::new(config.clone(), identity.clone()));
    let events = Arc::new(FabricEventSource::new(config, identity));
    let coordinator = Coordinator::new(channel, events, CoordinatorConfig::default());

    let outcome = coordinator
        .submit(Operation::new("add_client", ["LIDAR", "AcmeCo", "12", "active"].map(String::from).to_vec()))
        .await;

    assert!(matches!(
        outcome,
        Err(groot_core::SubmitError::EventHub(_))
    ));
}

#[tokio::test]
async fn query_returns_the_peer_payload() {
    let (_, executor) = gateway().await;

    let payload = executor
        .query(Operation::new("get_tech", vec!["LIDAR".to_string()]))
        .await
        .expect("payload");
    assert_eq!(payload, b"{\"technology\":\"LIDAR\"}");
}

#[tokio::test]
async fn query_error_value_is_not_found() {
    let (_, executor) = gateway().await;

    let outcome = executor
        .query(Operation::new("get_tech", vec!["orange".to_string()]))
        .await;
    assert!(matches!(outcome, Err(groot_core::QueryError::NotFound)));
}
