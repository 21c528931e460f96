//! Contact recency: when each user last answered a notification call.
//!
//! Only answered calls are recorded. The escalation job consults the ledger to
//! hold back users still inside the cooldown window.

use crate::libs::error::Result;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub trait ContactLedger: Send + Sync {
    fn last_contact(&self, user_id: i64) -> Result<Option<DateTime<Utc>>>;

    fn record_contact(&self, user_id: i64, at: DateTime<Utc>) -> Result<()>;
}

/// Where the ledger keeps its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    /// Process memory; forgotten on restart.
    Memory,
    /// The `contacts` table of the record store.
    #[default]
    Database,
}

/// Process-local ledger. Entries vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryContactLedger {
    entries: Mutex<HashMap<i64, DateTime<Utc>>>,
}

impl MemoryContactLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContactLedger for MemoryContactLedger {
    fn last_contact(&self, user_id: i64) -> Result<Option<DateTime<Utc>>> {
        Ok(self.entries.lock().get(&user_id).copied())
    }

    fn record_contact(&self, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        self.entries.lock().insert(user_id, at);
        Ok(())
    }
}

/// True while `now` is less than `cooldown` after the last successful contact.
pub fn within_cooldown(last_contact: Option<DateTime<Utc>>, now: DateTime<Utc>, cooldown: TimeDelta) -> bool {
    match last_contact {
        Some(last) => now - last < cooldown,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cooldown_boundary() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let day = TimeDelta::hours(24);
        assert!(!within_cooldown(None, t, day));
        assert!(within_cooldown(Some(t), t + TimeDelta::hours(23), day));
        assert!(!within_cooldown(Some(t), t + day, day));
    }

    #[test]
    fn memory_ledger_overwrites() {
        let ledger = MemoryContactLedger::new();
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        ledger.record_contact(7, t).unwrap();
        ledger.record_contact(7, t + TimeDelta::hours(1)).unwrap();
        assert_eq!(ledger.last_contact(7).unwrap(), Some(t + TimeDelta::hours(1)));
        assert_eq!(ledger.last_contact(8).unwrap(), None);
    }
}
