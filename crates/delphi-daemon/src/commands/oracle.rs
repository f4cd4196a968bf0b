//! Signed action handler.

use std::sync::Arc;

use delphi_oracle::Applied;
use delphi_types::ActionEnvelope;
use serde_json::Value;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Verify a signed envelope and run its action as the signing account.
pub async fn push_action(state: &Arc<DaemonState>, params: &Value) -> Result {
    let raw = params
        .get("envelope")
        .ok_or_else(|| RpcError::invalid_params("envelope required"))?;
    let envelope: ActionEnvelope = serde_json::from_value(raw.clone())
        .map_err(|e| RpcError::invalid_params(&format!("envelope: {e}")))?;

    let mut engine = state.engine.lock().await;
    let now = engine.now();
    let caller = {
        let mut keyring = state.keyring.lock().await;
        let verified = keyring.verify(&envelope, now);
        tracing::debug!(remembered = keyring.remembered(), "envelope checked");
        verified.map_err(|e| {
            tracing::debug!(account = %envelope.payload.account, error = %e, "envelope rejected");
            RpcError::from(e)
        })?
    };

    let applied = engine.apply(caller, &envelope.payload.action)?;
    Ok(match applied {
        Applied::Written(observation) => serde_json::json!({
            "applied": "write",
            "observation": super::to_json(&observation)?,
        }),
        Applied::ReportersReplaced(count) => serde_json::json!({
            "applied": "setoracles",
            "reporters": count,
        }),
        Applied::Cleared => serde_json::json!({ "applied": "clear" }),
    })
}
