//! # delphi-oracle
//!
//! Price-point ingestion and aggregation engine.
//!
//! A bounded set of reporters submit price observations. The engine keeps the
//! most recent [`capacity`](params::OracleParams::capacity) observations and
//! annotates each write into a full window with a trimmed average of the
//! window's values. Every write is gated by reporter admission and a
//! per-reporter minimum interval.
//!
//! ## Modules
//!
//! - [`host`] — Clock, identity and validator-list collaborators
//! - [`store`] — Storage access patterns and the in-memory store
//! - [`registry`] — Reporter admission (allow-list or active validator)
//! - [`rate_limit`] — Minimum interval between writes of one reporter
//! - [`window`] — Rolling observation window and trimmed average
//! - [`engine`] — Write orchestration and read queries
//! - [`admin`] — Controller-only registry replacement and full reset
//! - [`params`] — Tunables

pub mod admin;
pub mod engine;
pub mod host;
pub mod params;
pub mod rate_limit;
pub mod registry;
pub mod store;
pub mod window;

pub use engine::{Applied, OracleEngine};
pub use host::{Clock, Host, IdentityVerifier, ValidatorSet, ValidatorSource};
pub use params::OracleParams;
pub use store::{MemoryStore, OracleStore};

use delphi_types::{AccountName, Timestamp};

/// Error types for oracle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// Submitted value is outside the accepted price range.
    #[error("value {value} outside of allowed range [{min}, {max}]")]
    OutOfRange {
        /// The rejected value.
        value: u64,
        /// Lowest accepted value.
        min: u64,
        /// Highest accepted value.
        max: u64,
    },

    /// Reporter is neither on the allow-list nor an active validator.
    #[error("account {0} is not an active producer or approved oracle")]
    NotQualified(AccountName),

    /// Reporter wrote again before the minimum interval elapsed.
    #[error("account {reporter} can write again at {retry_at}")]
    RateLimited {
        /// The limited reporter.
        reporter: AccountName,
        /// Earliest timestamp at which a write is accepted.
        retry_at: Timestamp,
    },

    /// Administrative action from an account other than the controller.
    #[error("account {0} is not the controlling account")]
    Unauthorized(AccountName),

    /// Caller is not authorized to act as the named reporter.
    #[error("caller {caller} cannot act as {reporter}")]
    AuthMismatch {
        /// Verified caller identity.
        caller: AccountName,
        /// Reporter named in the request.
        reporter: AccountName,
    },

    /// Tunables are inconsistent.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The decreasing sequence key space is used up.
    #[error("observation sequence exhausted")]
    SequenceExhausted,

    /// Backing store failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl OracleError {
    /// Whether the same request may succeed later without changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::RateLimited { .. })
    }
}

/// Convenience result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_limit_is_retryable() {
        let who: AccountName = "feeder".parse().expect("name");
        assert!(OracleError::RateLimited {
            reporter: who,
            retry_at: 55
        }
        .is_retryable());
        assert!(!OracleError::NotQualified(who).is_retryable());
        assert!(!OracleError::OutOfRange {
            value: 1,
            min: 100,
            max: 200
        }
        .is_retryable());
        assert!(!OracleError::Unauthorized(who).is_retryable());
    }

    #[test]
    fn test_messages() {
        let who: AccountName = "feeder".parse().expect("name");
        assert_eq!(
            OracleError::NotQualified(who).to_string(),
            "account feeder is not an active producer or approved oracle"
        );
        assert_eq!(
            OracleError::OutOfRange {
                value: 99,
                min: 100,
                max: 100_000_000
            }
            .to_string(),
            "value 99 outside of allowed range [100, 100000000]"
        );
    }
}
