//! Action envelopes.

use delphi_types::{ActionEnvelope, SignedAction};

use crate::ed25519::{Signature, SigningKey, VerifyingKey};
use crate::{CryptoError, Result};

/// Sign `payload` and wrap it into an envelope.
pub fn seal(key: &SigningKey, payload: SignedAction) -> Result<ActionEnvelope> {
    let bytes = payload
        .signing_bytes()
        .map_err(|e| CryptoError::Serialization(e.to_string()))?;
    let signature = key.sign(&bytes).to_hex();
    Ok(ActionEnvelope { payload, signature })
}

/// Check the envelope signature against `key`.
///
/// Only the signature is checked; expiry and account binding are up to the
/// caller.
pub fn open(key: &VerifyingKey, envelope: &ActionEnvelope) -> Result<()> {
    let signature = Signature::from_hex(&envelope.signature)?;
    let bytes = envelope
        .payload
        .signing_bytes()
        .map_err(|e| CryptoError::Serialization(e.to_string()))?;
    key.verify(&bytes, &signature)
}
