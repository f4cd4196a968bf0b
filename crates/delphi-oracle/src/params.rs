//! Oracle tunables.

use delphi_types::{
    AccountName, DEFAULT_CONTROLLER, DEFAULT_TRIM_SKIP, DEFAULT_TRIM_TAKE,
    DEFAULT_WINDOW_CAPACITY, MIN_WRITE_INTERVAL_SECS, VAL_MAX, VAL_MIN,
};
use serde::{Deserialize, Serialize};

use crate::{OracleError, Result};

/// Tunables of one oracle instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleParams {
    /// Maximum number of observations kept.
    pub capacity: usize,
    /// Lowest values skipped when averaging a full window.
    pub trim_skip: usize,
    /// Values averaged after the skip; the rest of the high end is dropped.
    pub trim_take: usize,
    pub val_min: u64,
    pub val_max: u64,
    /// Minimum seconds between two accepted writes of one reporter.
    pub min_interval_secs: u64,
    /// Account allowed to run administrative actions.
    pub controller: AccountName,
}

impl Default for OracleParams {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WINDOW_CAPACITY,
            trim_skip: DEFAULT_TRIM_SKIP,
            trim_take: DEFAULT_TRIM_TAKE,
            val_min: VAL_MIN,
            val_max: VAL_MAX,
            min_interval_secs: MIN_WRITE_INTERVAL_SECS,
            controller: DEFAULT_CONTROLLER,
        }
    }
}

impl OracleParams {
    /// Check that the tunables describe a usable window.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidParams`] if the window is empty, the value
    ///   range is inverted, or the trim does not fit in the window
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(OracleError::InvalidParams(
                "capacity must be non-zero".to_string(),
            ));
        }
        if self.val_min > self.val_max {
            return Err(OracleError::InvalidParams(format!(
                "val_min {} exceeds val_max {}",
                self.val_min, self.val_max
            )));
        }
        if self.trim_take == 0 {
            return Err(OracleError::InvalidParams(
                "trim_take must be non-zero".to_string(),
            ));
        }
        if self.trim_skip.saturating_add(self.trim_take) > self.capacity {
            return Err(OracleError::InvalidParams(format!(
                "trim of {} + {} does not fit a window of {}",
                self.trim_skip, self.trim_take, self.capacity
            )));
        }
        Ok(())
    }

    /// Whether `value` is an acceptable price.
    pub fn in_range(&self, value: u64) -> bool {
        (self.val_min..=self.val_max).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = OracleParams::default();
        assert_eq!(params.capacity, 21);
        assert_eq!(params.trim_skip, 5);
        assert_eq!(params.trim_take, 9);
        assert_eq!(params.val_min, 100);
        assert_eq!(params.val_max, 100_000_000);
        assert_eq!(params.min_interval_secs, 55);
        assert_eq!(params.controller.to_string(), "eostitanprod");
        params.validate().expect("defaults are valid");
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let params = OracleParams::default();
        assert!(params.in_range(100));
        assert!(params.in_range(100_000_000));
        assert!(!params.in_range(99));
        assert!(!params.in_range(100_000_001));
    }

    #[test]
    fn test_rejects_empty_window() {
        let params = OracleParams {
            capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(OracleError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_trim() {
        let params = OracleParams {
            capacity: 10,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(OracleError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let params = OracleParams {
            val_min: 500,
            val_max: 100,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let params: OracleParams =
            toml::from_str("min_interval_secs = 60\ncontroller = \"feedadmin\"").expect("parse");
        assert_eq!(params.min_interval_secs, 60);
        assert_eq!(params.controller.to_string(), "feedadmin");
        assert_eq!(params.capacity, 21);
    }
}
