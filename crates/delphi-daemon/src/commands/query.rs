//! Read-only query handlers.

use std::sync::Arc;

use serde_json::Value;

use super::{account_param, to_json, u64_param};
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Latest price, smoothed price and window fill. `null` before the first write.
pub async fn get_latest(state: &Arc<DaemonState>) -> Result {
    let engine = state.engine.lock().await;
    let snapshot = engine.snapshot()?;
    to_json(&snapshot)
}

/// Up to `limit` observations, newest first. Defaults to the window capacity.
pub async fn get_observations(state: &Arc<DaemonState>, params: &Value) -> Result {
    let engine = state.engine.lock().await;
    let limit = match params.get("limit").and_then(|v| v.as_u64()) {
        Some(limit) => usize::try_from(limit).unwrap_or(usize::MAX),
        None => engine.params().capacity,
    };
    to_json(&engine.observations(limit)?)
}

/// Observations with `from <= observed_at <= to`, oldest first.
pub async fn get_observations_between(state: &Arc<DaemonState>, params: &Value) -> Result {
    let from = u64_param(params, "from")?;
    let to = u64_param(params, "to")?;
    let engine = state.engine.lock().await;
    to_json(&engine.observations_between(from, to)?)
}

/// Write statistics of one reporter, or of every reporter without `owner`.
pub async fn get_stats(state: &Arc<DaemonState>, params: &Value) -> Result {
    let engine = state.engine.lock().await;
    if params.get("owner").is_some() {
        let owner = account_param(params, "owner")?;
        to_json(&engine.reporter_stats(owner)?)
    } else {
        to_json(&engine.all_reporter_stats()?)
    }
}

/// The explicit reporter allow-list.
pub async fn get_oracles(state: &Arc<DaemonState>) -> Result {
    let engine = state.engine.lock().await;
    to_json(&engine.reporters()?)
}

/// Whether `owner` may currently submit observations.
pub async fn is_qualified(state: &Arc<DaemonState>, params: &Value) -> Result {
    let owner = account_param(params, "owner")?;
    let engine = state.engine.lock().await;
    let qualified = engine.is_qualified(owner)?;
    Ok(serde_json::json!({ "owner": owner.to_string(), "qualified": qualified }))
}

/// Active oracle tunables, the static validator list and the action TTL.
pub async fn get_params(state: &Arc<DaemonState>) -> Result {
    let engine = state.engine.lock().await;
    let mut value = to_json(engine.params())?;
    if let Value::Object(map) = &mut value {
        map.insert(
            "validators".to_string(),
            to_json(&state.config.oracle.validators)?,
        );
        map.insert(
            "action_ttl_secs".to_string(),
            Value::from(state.config.rpc.action_ttl_secs),
        );
    }
    Ok(value)
}
