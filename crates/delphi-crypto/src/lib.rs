//! # delphi-crypto
//!
//! Signing primitives for Delphi actions.
//!
//! ## Modules
//!
//! - [`ed25519`] — Ed25519 keys, signing and verification (RFC 8032)
//! - [`envelope`] — Signing and verifying [`delphi_types::ActionEnvelope`]s

pub mod ed25519;
pub mod envelope;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("signature verification failed")]
    SignatureVerification,

    /// Invalid key or signature length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Hex decoding failed.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience result type for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Decode a hex string into a fixed-size byte array.
pub fn decode_hex_array<const N: usize>(s: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(s.trim())?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength { expected: N, actual })
}
