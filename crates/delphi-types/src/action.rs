//! Signed actions pushed to the daemon.
//!
//! The signature covers the `serde_json` encoding of [`SignedAction`]. Field
//! order of typed structs is fixed, so signer and verifier produce the same
//! bytes without a separate canonical form.

use serde::{Deserialize, Serialize};

use crate::{AccountName, Timestamp};

/// A state-changing oracle action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Action {
    /// Submit a price observation as `owner`.
    Write { owner: AccountName, value: u64 },
    /// Replace the reporter allow-list.
    #[serde(rename = "setoracles")]
    SetOracles { oracles: Vec<AccountName> },
    /// Wipe all oracle state.
    Clear,
}

impl Action {
    /// Short name for logs and RPC responses.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Write { .. } => "write",
            Action::SetOracles { .. } => "setoracles",
            Action::Clear => "clear",
        }
    }
}

/// The signed part of an envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAction {
    /// Account whose key signs the action.
    pub account: AccountName,
    pub action: Action,
    /// The action is rejected once the host clock passes this time.
    pub expires_at: Timestamp,
}

impl SignedAction {
    /// Bytes covered by the signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// A signed action as submitted over RPC.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionEnvelope {
    pub payload: SignedAction,
    /// Hex-encoded 64-byte Ed25519 signature.
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags() {
        let write = Action::Write {
            owner: "feeder".parse().expect("name"),
            value: 4200,
        };
        let json = serde_json::to_value(&write).expect("serialize");
        assert_eq!(json["name"], "write");
        assert_eq!(json["owner"], "feeder");

        let set: Action = serde_json::from_str(r#"{"name":"setoracles","oracles":["a","b"]}"#)
            .expect("deserialize");
        assert_eq!(set.name(), "setoracles");

        let clear: Action = serde_json::from_str(r#"{"name":"clear"}"#).expect("deserialize");
        assert_eq!(clear, Action::Clear);
    }

    #[test]
    fn test_signing_bytes_stable() {
        let payload = SignedAction {
            account: "feeder".parse().expect("name"),
            action: Action::Clear,
            expires_at: 10,
        };
        let a = payload.signing_bytes().expect("encode");
        let reparsed: SignedAction = serde_json::from_slice(&a).expect("decode");
        assert_eq!(reparsed.signing_bytes().expect("encode"), a);
        assert_eq!(
            String::from_utf8(a).expect("utf8"),
            r#"{"account":"feeder","action":{"name":"clear"},"expires_at":10}"#
        );
    }
}
