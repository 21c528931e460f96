//! Wires the store, ledger, gateway and clock into the two jobs.

use crate::api::{CallGateway, DryRunGateway, TwilioGateway};
use crate::db::store::SqliteStore;
use crate::libs::clock::{Clock, SystemClock};
use crate::libs::config::{Config, SchedulerConfig};
use crate::libs::contacts::{ContactLedger, LedgerKind, MemoryContactLedger};
use crate::libs::escalation::Escalator;
use crate::libs::jobs::ScheduledJob;
use crate::libs::lease::RunLease;
use crate::libs::messages::Message;
use crate::libs::priority::PriorityRecalculator;
use crate::libs::store::RecordStore;
use crate::{msg_info, msg_warning};
use std::sync::Arc;

pub struct Engine {
    pub store: Arc<SqliteStore>,
    pub ledger: Arc<dyn ContactLedger>,
    pub gateway: Arc<dyn CallGateway>,
    pub clock: Arc<dyn Clock>,
    pub scheduler: SchedulerConfig,
}

impl Engine {
    /// Builds the engine from the stored configuration and the default database.
    ///
    /// `dry_run` forces the dry-run gateway even when credentials are configured.
    pub fn from_config(config: &Config, dry_run: bool) -> anyhow::Result<Self> {
        let store = Arc::new(SqliteStore::new()?);
        let gateway: Arc<dyn CallGateway> = match (&config.gateway, dry_run) {
            (Some(gateway), false) => Arc::new(TwilioGateway::new(gateway)),
            (None, false) => {
                msg_warning!(Message::GatewayNotConfigured);
                Arc::new(DryRunGateway::answering())
            }
            (_, true) => Arc::new(DryRunGateway::answering()),
        };

        Ok(Self::assemble(store, gateway, Arc::new(SystemClock), config.scheduler.clone().unwrap_or_default()))
    }

    /// Builds an engine around explicit parts.
    ///
    /// The ledger follows `scheduler.contact_ledger`, except that a gateway
    /// placing no real calls always gets a fresh in-memory ledger.
    pub fn assemble(store: Arc<SqliteStore>, gateway: Arc<dyn CallGateway>, clock: Arc<dyn Clock>, scheduler: SchedulerConfig) -> Self {
        let ledger: Arc<dyn ContactLedger> = match (scheduler.contact_ledger, gateway.places_real_calls()) {
            (LedgerKind::Database, true) => store.clone(),
            (LedgerKind::Database, false) => {
                msg_info!(Message::DryRunLedgerInMemory);
                Arc::new(MemoryContactLedger::new())
            }
            (LedgerKind::Memory, _) => Arc::new(MemoryContactLedger::new()),
        };

        Self {
            store,
            ledger,
            gateway,
            clock,
            scheduler,
        }
    }

    fn records(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    pub fn recalculator(&self) -> PriorityRecalculator {
        PriorityRecalculator::new(self.records(), self.clock.clone())
    }

    pub fn escalator(&self) -> Escalator {
        Escalator::new(
            self.records(),
            self.ledger.clone(),
            self.gateway.clone(),
            self.clock.clone(),
            self.scheduler.escalation_settings(),
        )
    }

    /// Leases in the database, so runs in other processes are seen too.
    pub fn run_lease(&self) -> RunLease {
        RunLease::new(self.store.clone(), self.clock.clone())
    }

    /// Daily priority job and hourly escalation job on their configured cadences.
    pub fn scheduled_jobs(&self) -> Vec<Arc<ScheduledJob>> {
        let lease = self.run_lease();
        vec![
            Arc::new(ScheduledJob::new(Arc::new(self.recalculator()), self.scheduler.priority_cadence()).with_lease(lease.clone())),
            Arc::new(ScheduledJob::new(Arc::new(self.escalator()), self.scheduler.escalation_cadence()).with_lease(lease)),
        ]
    }
}
