//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! newline-delimited JSON-RPC 2.0 calls to the command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use delphi_oracle::OracleError;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

use crate::auth::AuthError;
use crate::commands;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    fn new(code: i32, message: &str, data: Option<serde_json::Value>) -> Self {
        Self {
            code,
            message: message.to_string(),
            data,
        }
    }

    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self::new(-32700, "PARSE_ERROR", None)
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self::new(-32600, "INVALID_REQUEST", None)
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            -32601,
            "METHOD_NOT_FOUND",
            Some(serde_json::json!({"method": method})),
        )
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self::new(
            -32602,
            "INVALID_PARAMS",
            Some(serde_json::json!({"detail": detail})),
        )
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self::new(
            -32603,
            "INTERNAL_ERROR",
            Some(serde_json::json!({"detail": detail})),
        )
    }

    // Oracle errors

    /// Value outside the accepted range (-32020).
    pub fn out_of_range(value: u64, min: u64, max: u64) -> Self {
        Self::new(
            -32020,
            "OUT_OF_RANGE",
            Some(serde_json::json!({"value": value, "min": min, "max": max})),
        )
    }

    /// Reporter not listed and not an active validator (-32021).
    pub fn not_qualified(account: &str) -> Self {
        Self::new(
            -32021,
            "NOT_QUALIFIED",
            Some(serde_json::json!({"account": account})),
        )
    }

    /// Reporter wrote too recently (-32022).
    pub fn rate_limited(account: &str, retry_at: u64) -> Self {
        Self::new(
            -32022,
            "RATE_LIMITED",
            Some(serde_json::json!({"account": account, "retry_at": retry_at})),
        )
    }

    /// Administrative action from a non-controller (-32023).
    pub fn unauthorized(account: &str) -> Self {
        Self::new(
            -32023,
            "UNAUTHORIZED",
            Some(serde_json::json!({"account": account})),
        )
    }

    /// Signer cannot act as the named reporter (-32024).
    pub fn auth_mismatch(caller: &str, reporter: &str) -> Self {
        Self::new(
            -32024,
            "AUTH_MISMATCH",
            Some(serde_json::json!({"caller": caller, "reporter": reporter})),
        )
    }

    /// Envelope signature did not verify (-32025).
    pub fn bad_signature(account: &str) -> Self {
        Self::new(
            -32025,
            "BAD_SIGNATURE",
            Some(serde_json::json!({"account": account})),
        )
    }

    /// Envelope expired or expires too far ahead (-32026).
    pub fn action_expired(expires_at: u64, now: u64) -> Self {
        Self::new(
            -32026,
            "ACTION_EXPIRED",
            Some(serde_json::json!({"expires_at": expires_at, "now": now})),
        )
    }

    /// No key registered for the envelope account (-32027).
    pub fn unknown_account(account: &str) -> Self {
        Self::new(
            -32027,
            "UNKNOWN_ACCOUNT",
            Some(serde_json::json!({"account": account})),
        )
    }

    /// Envelope was already accepted once (-32028).
    pub fn action_replayed(account: &str) -> Self {
        Self::new(
            -32028,
            "ACTION_REPLAYED",
            Some(serde_json::json!({"account": account})),
        )
    }
}

impl From<OracleError> for RpcError {
    fn from(e: OracleError) -> Self {
        match e {
            OracleError::OutOfRange { value, min, max } => Self::out_of_range(value, min, max),
            OracleError::NotQualified(account) => Self::not_qualified(&account.to_string()),
            OracleError::RateLimited { reporter, retry_at } => {
                Self::rate_limited(&reporter.to_string(), retry_at)
            }
            OracleError::Unauthorized(account) => Self::unauthorized(&account.to_string()),
            OracleError::AuthMismatch { caller, reporter } => {
                Self::auth_mismatch(&caller.to_string(), &reporter.to_string())
            }
            other => Self::internal_error(&other.to_string()),
        }
    }
}

impl From<AuthError> for RpcError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::UnknownAccount(account) => Self::unknown_account(&account.to_string()),
            AuthError::BadSignature(account) => Self::bad_signature(&account.to_string()),
            AuthError::Expired { expires_at, now } => Self::action_expired(expires_at, now),
            AuthError::Replayed(account) => Self::action_replayed(&account.to_string()),
            other => Self::internal_error(&other.to_string()),
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&state, &line).await;
        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Parse one request line and run it.
pub async fn handle_line(state: &Arc<DaemonState>, line: &str) -> RpcResponse {
    match serde_json::from_str::<RpcRequest>(line) {
        Ok(request) if request.jsonrpc == "2.0" => dispatch_request(state, request).await,
        Ok(request) => RpcResponse::error(request.id, RpcError::invalid_request()),
        Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
    }
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
async fn dispatch_request(state: &Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    let method = request.method.as_str();

    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Signed actions
        "push_action" => commands::oracle::push_action(state, &request.params).await,

        // Queries
        "get_latest" => commands::query::get_latest(state).await,
        "get_observations" => commands::query::get_observations(state, &request.params).await,
        "get_observations_between" => {
            commands::query::get_observations_between(state, &request.params).await
        }
        "get_stats" => commands::query::get_stats(state, &request.params).await,
        "get_oracles" => commands::query::get_oracles(state).await,
        "is_qualified" => commands::query::is_qualified(state, &request.params).await,
        "get_params" => commands::query::get_params(state).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}
