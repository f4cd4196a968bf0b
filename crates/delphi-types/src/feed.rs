//! Feed records: observations, per-reporter write statistics and the
//! consumer-facing price snapshot.

use serde::{Deserialize, Serialize};

use crate::AccountName;

/// Host timestamp in Unix epoch seconds.
pub type Timestamp = u64;

/// One reported price point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Decreasing insertion key; the newest observation has the smallest value.
    pub sequence: u64,
    pub reporter: AccountName,
    /// Price in hundredths of a cent.
    pub value: u64,
    /// Trimmed average computed when this observation was written into a
    /// full window; the observation's own value before that.
    pub trimmed_average: u64,
    pub observed_at: Timestamp,
}

/// Write statistics for a reporter that has had at least one write accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterStats {
    pub reporter: AccountName,
    pub last_write_at: Timestamp,
    /// Informational; starts at 0 on the first accepted write.
    pub write_count: u64,
}

/// What consumers read to get the current price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Latest raw price.
    pub price: u64,
    /// Latest trimmed average, or the raw price while the window is filling.
    pub smoothed: u64,
    pub reporter: AccountName,
    pub observed_at: Timestamp,
    pub window_len: usize,
    pub window_full: bool,
}

impl PriceSnapshot {
    /// Build a snapshot from the newest observation and the window fill state.
    pub fn from_latest(latest: &Observation, window_len: usize, capacity: usize) -> Self {
        let window_full = window_len >= capacity;
        Self {
            price: latest.value,
            smoothed: if window_full || latest.trimmed_average != 0 {
                latest.trimmed_average
            } else {
                latest.value
            },
            reporter: latest.reporter,
            observed_at: latest.observed_at,
            window_len,
            window_full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(value: u64, trimmed_average: u64) -> Observation {
        Observation {
            sequence: u64::MAX,
            reporter: "feeder".parse().expect("name"),
            value,
            trimmed_average,
            observed_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_snapshot_uses_average() {
        let snap = PriceSnapshot::from_latest(&obs(5000, 4800), 21, 21);
        assert_eq!(snap.price, 5000);
        assert_eq!(snap.smoothed, 4800);
        assert!(snap.window_full);
    }

    #[test]
    fn test_snapshot_falls_back_to_value() {
        let snap = PriceSnapshot::from_latest(&obs(5000, 0), 3, 21);
        assert_eq!(snap.smoothed, 5000);
        assert!(!snap.window_full);
        assert_eq!(snap.window_len, 3);
    }

    #[test]
    fn test_observation_json_shape() {
        let json = serde_json::to_value(obs(100, 100)).expect("serialize");
        assert_eq!(json["reporter"], "feeder");
        assert_eq!(json["sequence"], u64::MAX);
    }
}
