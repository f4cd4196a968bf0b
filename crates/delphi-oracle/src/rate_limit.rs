//! Per-reporter write pacing.
//!
//! A reporter's first accepted write creates its state with a counter of 0
//! and is never limited. Each later write must come at least
//! `min_interval` seconds after the previous accepted one.

use delphi_types::{AccountName, ReporterStats, Timestamp};

use crate::store::RateStore;
use crate::{OracleError, Result};

/// Minimum-interval limiter.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    min_interval: u64,
}

impl RateLimiter {
    pub fn new(min_interval: u64) -> Self {
        Self { min_interval }
    }

    /// Accept a write from `reporter` at `now` and record it.
    ///
    /// State is only touched when the write is accepted.
    ///
    /// # Errors
    ///
    /// - [`OracleError::RateLimited`] if the previous accepted write was less
    ///   than `min_interval` seconds before `now`
    pub fn check_and_record<S>(
        &self,
        store: &mut S,
        reporter: AccountName,
        now: Timestamp,
    ) -> Result<ReporterStats>
    where
        S: RateStore + ?Sized,
    {
        let next = match store.rate_state(reporter)? {
            None => ReporterStats {
                reporter,
                last_write_at: now,
                write_count: 0,
            },
            Some(prev) => {
                let retry_at = prev.last_write_at.saturating_add(self.min_interval);
                if now < retry_at {
                    return Err(OracleError::RateLimited { reporter, retry_at });
                }
                ReporterStats {
                    reporter,
                    last_write_at: now,
                    write_count: prev.write_count.saturating_add(1),
                }
            }
        };
        store.put_rate_state(&next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn feeder() -> AccountName {
        "feeder".parse().expect("name")
    }

    #[test]
    fn test_first_write_starts_at_zero() {
        let limiter = RateLimiter::new(55);
        let mut store = MemoryStore::new();
        let stats = limiter
            .check_and_record(&mut store, feeder(), 1000)
            .expect("first write");
        assert_eq!(stats.write_count, 0);
        assert_eq!(stats.last_write_at, 1000);
    }

    #[test]
    fn test_first_write_never_limited() {
        let limiter = RateLimiter::new(u64::MAX);
        let mut store = MemoryStore::new();
        limiter
            .check_and_record(&mut store, feeder(), 0)
            .expect("first write at time zero");
    }

    #[test]
    fn test_second_write_too_soon() {
        let limiter = RateLimiter::new(55);
        let mut store = MemoryStore::new();
        limiter
            .check_and_record(&mut store, feeder(), 1000)
            .expect("first");

        let err = limiter
            .check_and_record(&mut store, feeder(), 1054)
            .unwrap_err();
        assert_eq!(
            err,
            OracleError::RateLimited {
                reporter: feeder(),
                retry_at: 1055
            }
        );

        let stats = store.rate_state(feeder()).expect("get").expect("present");
        assert_eq!(stats.last_write_at, 1000);
        assert_eq!(stats.write_count, 0);
    }

    #[test]
    fn test_write_at_exact_interval() {
        let limiter = RateLimiter::new(55);
        let mut store = MemoryStore::new();
        limiter
            .check_and_record(&mut store, feeder(), 1000)
            .expect("first");
        let stats = limiter
            .check_and_record(&mut store, feeder(), 1055)
            .expect("second");
        assert_eq!(stats.write_count, 1);
        assert_eq!(stats.last_write_at, 1055);
    }

    #[test]
    fn test_clock_going_backwards_is_limited() {
        let limiter = RateLimiter::new(55);
        let mut store = MemoryStore::new();
        limiter
            .check_and_record(&mut store, feeder(), 1000)
            .expect("first");
        assert!(limiter
            .check_and_record(&mut store, feeder(), 900)
            .is_err());
    }

    #[test]
    fn test_reporters_limited_independently() {
        let limiter = RateLimiter::new(55);
        let mut store = MemoryStore::new();
        let other: AccountName = "other".parse().expect("name");
        limiter
            .check_and_record(&mut store, feeder(), 1000)
            .expect("feeder");
        limiter
            .check_and_record(&mut store, other, 1001)
            .expect("other is independent");
    }
}
