use crate::{
    db::store::SqliteStore,
    libs::{
        clock::{Clock, SystemClock},
        jobs::PRIORITY_JOB,
        lease::RunLease,
        messages::Message,
        priority::PriorityRecalculator,
        view::View,
    },
    msg_success, msg_warning,
};
use anyhow::Result;
use std::sync::Arc;

pub fn cmd() -> Result<()> {
    let store = Arc::new(SqliteStore::new()?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let Some(_lease) = RunLease::new(store.clone(), clock.clone()).acquire(PRIORITY_JOB)? else {
        msg_warning!(Message::JobHeldElsewhere(PRIORITY_JOB.to_string()));
        return Ok(());
    };

    let report = PriorityRecalculator::new(store, clock).run()?;

    View::priority_report(&report);
    msg_success!(Message::PriorityRunSummary(
        report.scanned,
        report.updated,
        report.unchanged,
        report.overdue,
        report.failures.len()
    ));

    Ok(())
}
