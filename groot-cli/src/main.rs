//! Groot Gateway Command Line Interface
//!
//! Usage:
//!   groot init           - Generate a signing identity into the key store
//!   groot start          - Start the gateway HTTP server
//!   groot submit <fcn>   - Submit one write operation and wait for commit
//!   groot query <fcn>    - Evaluate one read-only operation

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use groot_api::{run_server, ApiConfig, AppState};
use groot_core::{Coordinator, CoordinatorConfig, Operation, QueryExecutor};
use groot_fabric::{ChannelConfig, FabricChannel, FabricEventSource, Identity};

#[derive(Parser)]
#[command(name = "groot")]
#[command(about = "HTTP gateway to the groot permissioned ledger")]
#[command(version)]
struct Cli {
    /// Key store directory
    #[arg(long, default_value = "keystore")]
    key_store: PathBuf,

    /// Enrolled user id
    #[arg(long, default_value = "user1")]
    user: String,

    /// Endorsing peer address (repeatable)
    #[arg(long = "peer", default_value = "127.0.0.1:7051")]
    peers: Vec<String>,

    /// Ordering service address
    #[arg(long, default_value = "127.0.0.1:7050")]
    orderer: String,

    /// Commit-event peer address (defaults to the first peer)
    #[arg(long)]
    event_peer: Option<String>,

    /// Channel id
    #[arg(long, default_value = "mychannel")]
    channel: String,

    /// Chaincode id
    #[arg(long, default_value = "groot-chaincode")]
    chaincode: String,

    /// Commit-event wait in milliseconds
    #[arg(long, default_value = "3000")]
    commit_wait_ms: u64,

    /// Ordering submission deadline in milliseconds
    #[arg(long, default_value = "10000")]
    submit_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a signing identity into the key store
    Init,

    /// Start the gateway HTTP server
    Start {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Submit one write operation and wait for the commit event
    Submit {
        /// Chaincode function name
        fcn: String,
        /// Ordered string arguments
        args: Vec<String>,
    },

    /// Evaluate one read-only operation
    Query {
        /// Chaincode function name
        fcn: String,
        /// Lookup key; omitted for list-style queries
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match cli.command {
        Commands::Init => {
            let identity = Identity::generate(&cli.user);
            let key_path = identity.persist(&cli.key_store)?;

            println!("Identity {} written to {}", cli.user, key_path.display());
            println!("Public key: {}", identity.public_key_hex());
            Ok(())
        }

        // Bind by reference: `cli` is still borrowed whole by build_state.
        Commands::Start { ref host, port } => {
            println!("Starting groot gateway on {}:{}...", host, port);

            let state = build_state(&cli)?;
            let config = ApiConfig {
                host: host.clone(),
                port,
                enable_cors: true,
            };

            run_server(&config, state).await?;
            Ok(())
        }

        Commands::Submit { ref fcn, ref args } => {
            let state = build_state(&cli)?;
            let tx_id = state
                .coordinator
                .submit(Operation::new(fcn.clone(), args.clone()))
                .await?;

            println!("Committed: {}", tx_id);
            Ok(())
        }

        Commands::Query { ref fcn, ref key } => {
            let state = build_state(&cli)?;
            // List-style queries still carry one empty-string argument.
            let args = match key {
                Some(key) => vec![key.clone()],
                None => vec![String::new()],
            };
            let payload = state.executor.query(Operation::new(fcn.clone(), args)).await?;

            println!("{}", String::from_utf8_lossy(&payload));
            Ok(())
        }
    }
}

/// Wire the channel, event source and coordinator from CLI options.
fn build_state(cli: &Cli) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let identity = Arc::new(Identity::load(&cli.key_store, &cli.user)?);

    let config = ChannelConfig {
        channel_id: cli.channel.clone(),
        chaincode_id: cli.chaincode.clone(),
        peer_addresses: cli.peers.clone(),
        orderer_address: cli.orderer.clone(),
        event_address: cli.event_peer.clone(),
        ..ChannelConfig::default()
    };

    let channel = Arc::new(FabricChannel::new(config.clone(), identity.clone()));
    let events = Arc::new(FabricEventSource::new(config, identity));

    let coordinator = Arc::new(Coordinator::new(
        channel.clone(),
        events,
        CoordinatorConfig {
            commit_wait_ms: cli.commit_wait_ms,
            submit_timeout_ms: cli.submit_timeout_ms,
        },
    ));
    let executor = Arc::new(QueryExecutor::new(channel));

    Ok(AppState::new(coordinator, executor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn init_seeds_the_key_store() {
        let store = tempfile::tempdir().unwrap();
        let store_arg = store.path().to_str().unwrap();

        let cli = parse(&["groot", "--key-store", store_arg, "init"]);
        run_command(cli).await.unwrap();

        assert!(store.path().join("user1.key").exists());
    }

    #[tokio::test]
    async fn start_options_and_state_share_the_same_cli() {
        let store = tempfile::tempdir().unwrap();
        Identity::generate("user1").persist(store.path()).unwrap();
        let store_arg = store.path().to_str().unwrap();

        let cli = parse(&[
            "groot",
            "--key-store",
            store_arg,
            "start",
            "--port",
            "0",
        ]);

        match cli.command {
            Commands::Start { ref host, port } => {
                let state = build_state(&cli).unwrap();
                assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 0);
            }
            _ => panic!("expected the start subcommand"),
        }
    }

    #[tokio::test]
    async fn missing_identity_fails_before_any_network_setup() {
        let store = tempfile::tempdir().unwrap();
        let store_arg = store.path().to_str().unwrap();

        let cli = parse(&["groot", "--key-store", store_arg, "query", "get_all_tech"]);
        let err = run_command(cli).await.unwrap_err();

        assert!(err.to_string().contains("user1.key"));
    }
}
