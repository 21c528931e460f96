#[cfg(test)]
mod tests {
    use chrono::{Local, TimeDelta, TimeZone, Utc};
    use duecall::db::store::SqliteStore;
    use duecall::libs::clock::ManualClock;
    use duecall::libs::lease::RunLease;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    /// Two stores on one database file, standing for two processes.
    struct LeaseTestContext {
        _temp_dir: TempDir,
        first: RunLease,
        second: RunLease,
        clock: Arc<ManualClock>,
    }

    impl TestContext for LeaseTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join("duecall.db");
            let clock = Arc::new(ManualClock::new(Local.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap().with_timezone(&Utc)));
            let first = RunLease::new(Arc::new(SqliteStore::open(&path).unwrap()), clock.clone());
            let second = RunLease::new(Arc::new(SqliteStore::open(&path).unwrap()), clock.clone());
            LeaseTestContext {
                _temp_dir: temp_dir,
                first,
                second,
                clock,
            }
        }
    }

    #[test_context(LeaseTestContext)]
    #[test]
    fn test_one_holder_at_a_time(ctx: &mut LeaseTestContext) {
        assert_ne!(ctx.first.holder(), ctx.second.holder());

        let held = ctx.first.acquire("escalation").unwrap();
        assert!(held.is_some());
        assert!(ctx.second.acquire("escalation").unwrap().is_none());
        // Other jobs are unaffected
        assert!(ctx.second.acquire("priority").unwrap().is_some());

        drop(held);
        assert!(ctx.second.acquire("escalation").unwrap().is_some());
    }

    #[test_context(LeaseTestContext)]
    #[test]
    fn test_expired_lease_is_taken_over(ctx: &mut LeaseTestContext) {
        let stale = ctx.first.acquire("escalation").unwrap().unwrap();
        ctx.clock.advance(TimeDelta::minutes(6));

        let taken = ctx.second.acquire("escalation").unwrap();
        assert!(taken.is_some());

        // The stale holder letting go must not free the new holder's lease
        drop(stale);
        assert!(ctx.first.acquire("escalation").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_holding_renews_the_lease() {
        let ctx = LeaseTestContext::setup();
        let renewing = ctx.first.clone().with_timing(TimeDelta::minutes(1), Duration::from_millis(20));
        let guard = renewing.acquire("escalation").unwrap().unwrap();

        ctx.clock.advance(TimeDelta::minutes(2));
        guard.hold(tokio::time::sleep(Duration::from_millis(100))).await;

        assert!(ctx.second.acquire("escalation").unwrap().is_none());
    }
}
