//! Run leases shared by every process on the same database.
//!
//! [`SingleFlight`](crate::libs::jobs::SingleFlight) only sees its own
//! process. A lease row in the record store also keeps a manual
//! `duecall escalate` and the daemon's hourly run apart. Leases expire after
//! a TTL so a crashed holder cannot block a job for good; a live holder
//! renews its lease while the work runs.

use crate::libs::clock::Clock;
use crate::libs::error::Result;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_warning};
use chrono::{DateTime, TimeDelta, Utc};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_RENEW_EVERY: Duration = Duration::from_secs(60);

static NEXT_HOLDER: AtomicU64 = AtomicU64::new(1);

pub trait LeaseStore: Send + Sync {
    /// Takes `name` for `holder` until `expires_at`, unless another lease on
    /// `name` is still live at `now`. True when the lease was taken.
    fn try_acquire_lease(&self, name: &str, holder: &str, now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<bool>;

    /// Moves the expiry of a lease `holder` still owns. False when it was lost.
    fn renew_lease(&self, name: &str, holder: &str, expires_at: DateTime<Utc>) -> Result<bool>;

    fn release_lease(&self, name: &str, holder: &str) -> Result<()>;
}

/// Hands out leases under one holder identity.
#[derive(Clone)]
pub struct RunLease {
    store: Arc<dyn LeaseStore>,
    clock: Arc<dyn Clock>,
    holder: String,
    ttl: TimeDelta,
    renew_every: Duration,
}

impl RunLease {
    pub fn new(store: Arc<dyn LeaseStore>, clock: Arc<dyn Clock>) -> Self {
        let n = NEXT_HOLDER.fetch_add(1, Ordering::Relaxed);
        Self {
            store,
            clock,
            holder: format!("{}-{}", std::process::id(), n),
            ttl: TimeDelta::minutes(5),
            renew_every: DEFAULT_RENEW_EVERY,
        }
    }

    /// Overrides how long a lease lives without renewal and how often it is renewed.
    pub fn with_timing(mut self, ttl: TimeDelta, renew_every: Duration) -> Self {
        self.ttl = ttl;
        self.renew_every = renew_every;
        self
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Claims the lease on `name`, or `None` while another holder has it.
    pub fn acquire(&self, name: &str) -> Result<Option<LeaseGuard>> {
        let now = self.clock.now();
        if !self.store.try_acquire_lease(name, &self.holder, now, now + self.ttl)? {
            return Ok(None);
        }

        Ok(Some(LeaseGuard {
            lease: self.clone(),
            name: name.to_string(),
        }))
    }
}

/// A held lease. Released when dropped, including when the run is cancelled.
pub struct LeaseGuard {
    lease: RunLease,
    name: String,
}

impl LeaseGuard {
    /// Drives `work` to completion, renewing the lease on the way.
    pub async fn hold<F: Future>(&self, work: F) -> F::Output {
        tokio::pin!(work);
        let mut renew = tokio::time::interval(self.lease.renew_every);
        // The first tick completes at once
        renew.tick().await;

        loop {
            tokio::select! {
                output = &mut work => return output,
                _ = renew.tick() => self.renew(),
            }
        }
    }

    fn renew(&self) {
        let expires_at = self.lease.clock.now() + self.lease.ttl;
        match self.lease.store.renew_lease(&self.name, &self.lease.holder, expires_at) {
            Ok(true) => msg_debug!(format!("Lease of '{}' renewed until {}", self.name, expires_at)),
            Ok(false) => msg_warning!(Message::LeaseLost(self.name.clone())),
            Err(e) => msg_warning!(Message::LeaseRenewFailed(self.name.clone(), e.to_string())),
        }
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        if let Err(e) = self.lease.store.release_lease(&self.name, &self.lease.holder) {
            msg_warning!(Message::LeaseReleaseFailed(self.name.clone(), e.to_string()));
        }
    }
}
