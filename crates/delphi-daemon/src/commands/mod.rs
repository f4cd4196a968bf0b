//! IPC command handlers.
//!
//! `oracle` runs signed actions; `query` serves read-only views.

pub mod oracle;
pub mod query;

use delphi_types::AccountName;
use serde_json::Value;

use crate::rpc::RpcError;

/// Required account-name parameter.
fn account_param(params: &Value, key: &str) -> Result<AccountName, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))?
        .parse()
        .map_err(|e| RpcError::invalid_params(&format!("{key}: {e}")))
}

/// Required u64 parameter.
fn u64_param(params: &Value, key: &str) -> Result<u64, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::internal_error(&e.to_string()))
}
