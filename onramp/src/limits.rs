//! In-memory rate limiting for funding attempts.
//!
//! Caps how often and how much a single wallet can be funded: a rolling
//! hourly request count and a rolling 24-hour USD total. State lives in
//! process memory only and is keyed by wallet address. Checks run before
//! any signing or network work.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Default cap on funding requests per wallet per hour.
pub const DEFAULT_MAX_REQUESTS_PER_HOUR: u32 = 5;
/// Default cap on funded USD per wallet per rolling 24 hours.
pub const DEFAULT_MAX_USD_PER_DAY: f64 = 5_000.0;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Rate-limit configuration.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    /// Maximum funding requests per wallet per rolling hour.
    pub max_requests_per_hour: u32,
    /// Maximum funded USD per wallet per rolling 24 hours.
    pub max_usd_per_day: f64,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            max_requests_per_hour: DEFAULT_MAX_REQUESTS_PER_HOUR,
            max_usd_per_day: DEFAULT_MAX_USD_PER_DAY,
        }
    }
}

#[derive(Debug, Default)]
struct WalletRecord {
    requests: Vec<Instant>,
    amounts: Vec<(Instant, f64)>,
}

impl WalletRecord {
    fn prune(&mut self, now: Instant) {
        self.requests
            .retain(|at| now.saturating_duration_since(*at) < HOUR);
        self.amounts
            .retain(|(at, _)| now.saturating_duration_since(*at) < DAY);
    }
}

/// Per-wallet sliding-window rate limiter.
#[derive(Debug, Default)]
pub struct RateLimiter {
    limits: RateLimits,
    records: Mutex<HashMap<String, WalletRecord>>,
}

impl RateLimiter {
    /// Create a limiter with the given limits.
    #[must_use]
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limits,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Check whether another funding attempt of `amount_usd` is allowed
    /// for `wallet`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RateLimited`] when the hourly request cap is
    /// reached or the attempt would exceed the daily USD cap.
    pub fn check(&self, wallet: &str, amount_usd: f64) -> Result<()> {
        self.check_at(wallet, amount_usd, Instant::now())
    }

    fn check_at(&self, wallet: &str, amount_usd: f64, now: Instant) -> Result<()> {
        let mut records = self.records.lock().expect("rate limiter mutex poisoned");
        let Some(record) = records.get_mut(wallet) else {
            return Ok(());
        };
        record.prune(now);

        if record.requests.len() >= self.limits.max_requests_per_hour as usize {
            let retry_in = record
                .requests
                .first()
                .map(|oldest| HOUR.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or_default();
            return Err(Error::RateLimited(format!(
                "hourly funding request limit reached; try again in {} minutes",
                retry_in.as_secs().div_ceil(60)
            )));
        }

        let daily_total: f64 = record.amounts.iter().map(|(_, amount)| amount).sum();
        if daily_total + amount_usd > self.limits.max_usd_per_day {
            return Err(Error::RateLimited(format!(
                "daily funding limit of ${} would be exceeded",
                self.limits.max_usd_per_day
            )));
        }

        Ok(())
    }

    /// Record a completed funding attempt.
    pub fn record(&self, wallet: &str, amount_usd: f64) {
        self.record_at(wallet, amount_usd, Instant::now());
    }

    fn record_at(&self, wallet: &str, amount_usd: f64, now: Instant) {
        let mut records = self.records.lock().expect("rate limiter mutex poisoned");
        let record = records.entry(wallet.to_string()).or_default();
        record.requests.push(now);
        record.amounts.push((now, amount_usd));
    }
}
