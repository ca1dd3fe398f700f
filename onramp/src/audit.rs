//! In-memory audit trail of funding sessions.
//!
//! Keeps the most recent sessions for operator inspection. Bounded and
//! process-local only — nothing survives a restart.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::SystemTime;

use crate::request::{Asset, Network};

/// Maximum number of retained session records.
const MAX_RECORDS: usize = 1000;

/// One completed funding session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// When the session was created.
    pub timestamp: SystemTime,
    /// Local correlation id from the funding result.
    pub session_id: String,
    /// Destination wallet address.
    pub wallet_address: String,
    /// Funded amount in USD.
    pub amount_usd: f64,
    /// Purchased asset.
    pub asset: Asset,
    /// Delivery network.
    pub network: Network,
}

/// Bounded log of recent funding sessions, newest last.
#[derive(Debug, Default)]
pub struct SessionLog {
    records: Mutex<VecDeque<SessionRecord>>,
}

impl SessionLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session, dropping the oldest once the cap is reached.
    pub fn record(&self, record: SessionRecord) {
        let mut records = self.records.lock().expect("session log mutex poisoned");
        if records.len() == MAX_RECORDS {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// The most recent `n` sessions, newest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<SessionRecord> {
        let records = self.records.lock().expect("session log mutex poisoned");
        records.iter().rev().take(n).cloned().collect()
    }

    /// Number of retained sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("session log mutex poisoned").len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(id: &str) -> SessionRecord {
        SessionRecord {
            timestamp: SystemTime::now(),
            session_id: id.to_string(),
            wallet_address: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string(),
            amount_usd: 25.0,
            asset: Asset::Usdc,
            network: Network::Base,
        }
    }

    #[test]
    fn records_sessions_newest_first() {
        let log = SessionLog::new();
        log.record(record("a"));
        log.record(record("b"));
        log.record(record("c"));

        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_id, "c");
        assert_eq!(recent[1].session_id, "b");
    }

    #[test]
    fn drops_oldest_past_the_cap() {
        let log = SessionLog::new();
        for i in 0..(MAX_RECORDS + 5) {
            log.record(record(&i.to_string()));
        }

        assert_eq!(log.len(), MAX_RECORDS);
        let recent = log.recent(1);
        assert_eq!(recent[0].session_id, (MAX_RECORDS + 4).to_string());
    }

    #[test]
    fn empty_log_reports_empty() {
        let log = SessionLog::new();
        assert!(log.is_empty());
        assert!(log.recent(10).is_empty());
    }
}
