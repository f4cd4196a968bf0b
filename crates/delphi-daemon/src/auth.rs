//! Signed action verification.
//!
//! Every pushed action arrives as an [`ActionEnvelope`] signed with the
//! Ed25519 key registered for its account. The verified account becomes the
//! caller the engine sees. Each signed payload is accepted at most once:
//! the keyring remembers it until it expires.

use std::collections::HashMap;

use delphi_crypto::ed25519::VerifyingKey;
use delphi_types::{AccountName, ActionEnvelope, Timestamp};

use crate::config::AccountConfig;

/// Envelope rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no key registered for account {0}")]
    UnknownAccount(AccountName),

    #[error("bad signature for account {0}")]
    BadSignature(AccountName),

    #[error("action expiring at {expires_at} is not acceptable at {now}")]
    Expired { expires_at: Timestamp, now: Timestamp },

    #[error("action from account {0} was already accepted")]
    Replayed(AccountName),

    #[error("invalid key for account {account}: {detail}")]
    InvalidKey { account: AccountName, detail: String },
}

/// Registered account keys, the accepted expiry horizon and the payloads
/// already accepted.
#[derive(Debug, Clone)]
pub struct Keyring {
    keys: HashMap<AccountName, VerifyingKey>,
    ttl_secs: u64,
    /// Signing bytes of accepted payloads, mapped to their expiry.
    accepted: HashMap<Vec<u8>, Timestamp>,
}

impl Keyring {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            keys: HashMap::new(),
            ttl_secs,
            accepted: HashMap::new(),
        }
    }

    /// Build from the `[[accounts]]` config entries.
    pub fn from_config(accounts: &[AccountConfig], ttl_secs: u64) -> Result<Self, AuthError> {
        let mut keyring = Self::new(ttl_secs);
        for entry in accounts {
            let key = VerifyingKey::from_hex(&entry.public_key).map_err(|e| AuthError::InvalidKey {
                account: entry.name,
                detail: e.to_string(),
            })?;
            keyring.insert(entry.name, key);
        }
        Ok(keyring)
    }

    pub fn insert(&mut self, account: AccountName, key: VerifyingKey) {
        self.keys.insert(account, key);
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check the envelope and return the account it was signed for.
    ///
    /// An envelope is accepted at `now` if its account has a registered key,
    /// the signature verifies, `now <= expires_at <= now + ttl`, and the same
    /// payload has not been accepted before. Accepting it consumes it.
    pub fn verify(&mut self, envelope: &ActionEnvelope, now: Timestamp) -> Result<AccountName, AuthError> {
        let account = envelope.payload.account;
        let key = self
            .keys
            .get(&account)
            .ok_or(AuthError::UnknownAccount(account))?;
        delphi_crypto::envelope::open(key, envelope).map_err(|_| AuthError::BadSignature(account))?;

        let expires_at = envelope.payload.expires_at;
        if expires_at < now || expires_at > now.saturating_add(self.ttl_secs) {
            return Err(AuthError::Expired { expires_at, now });
        }

        self.accepted.retain(|_, until| *until >= now);
        let digest = envelope
            .payload
            .signing_bytes()
            .map_err(|_| AuthError::BadSignature(account))?;
        if self.accepted.contains_key(&digest) {
            return Err(AuthError::Replayed(account));
        }
        self.accepted.insert(digest, expires_at);
        Ok(account)
    }

    /// Number of payloads remembered for replay checks.
    pub fn remembered(&self) -> usize {
        self.accepted.len()
    }
}
