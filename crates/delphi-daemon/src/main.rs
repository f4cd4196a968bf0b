//! delphi-daemon: the Delphi price-feed oracle daemon.
//!
//! Single OS process running a Tokio async runtime. Reporters and operators
//! talk to it via JSON-RPC over a Unix socket; every state change arrives
//! as an Ed25519-signed action.

mod auth;
mod commands;
mod config;
mod rpc;

use std::sync::Arc;

use delphi_db::SqliteStore;
use delphi_oracle::host::{StaticValidators, SystemClock};
use delphi_oracle::{Host, OracleEngine};
use delphi_types::MAX_VALIDATORS;
use tracing::{error, info, warn};

use crate::auth::Keyring;
use crate::config::DaemonConfig;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// The oracle engine. One lock around each call keeps writes serial.
    pub engine: Arc<tokio::sync::Mutex<OracleEngine<SqliteStore>>>,
    /// Keys of accounts allowed to push actions, plus accepted payloads.
    /// Locked after `engine` when both are held.
    pub keyring: tokio::sync::Mutex<Keyring>,
    /// Configuration.
    pub config: DaemonConfig,
}

impl DaemonState {
    pub fn new(engine: OracleEngine<SqliteStore>, keyring: Keyring, config: DaemonConfig) -> Self {
        Self {
            engine: Arc::new(tokio::sync::Mutex::new(engine)),
            keyring: tokio::sync::Mutex::new(keyring),
            config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("delphi={}", config.advanced.log_level).parse()?),
        )
        .init();

    info!("Delphi daemon starting");

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    // 2. Open database
    let db_path = data_dir.join("delphi.db");
    let store = SqliteStore::open(&db_path)?;
    info!("Database opened at {:?}", db_path);

    // 3. Build engine
    if config.oracle.validators.len() > MAX_VALIDATORS {
        warn!(
            configured = config.oracle.validators.len(),
            "only the first {MAX_VALIDATORS} validators are used"
        );
    }
    let host = Host::new(SystemClock, StaticValidators::new(&config.oracle.validators));
    let engine = OracleEngine::new(config.oracle.params.clone(), store, host)?;
    info!(
        controller = %config.oracle.params.controller,
        capacity = config.oracle.params.capacity,
        min_interval_secs = config.oracle.params.min_interval_secs,
        "Oracle engine ready"
    );

    // 4. Load account keys
    let keyring = Keyring::from_config(&config.accounts, config.rpc.action_ttl_secs)?;
    if keyring.is_empty() {
        warn!("No accounts configured; every pushed action will be rejected");
    }

    // 5. Build daemon state
    let socket_path = data_dir.join(&config.rpc.socket_name);
    let state = Arc::new(DaemonState::new(engine, keyring, config));

    // 6. Start IPC server
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());
    info!("Starting JSON-RPC server on {:?}", socket_path);

    // 7. Run the RPC server until shutdown
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}
