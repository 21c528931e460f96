#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use duecall::api::{CallGateway, CallHandle, CallOutcome};
    use duecall::db::store::SqliteStore;
    use duecall::libs::clock::ManualClock;
    use duecall::libs::contacts::{ContactLedger, MemoryContactLedger};
    use duecall::libs::error::{Error, Result};
    use duecall::libs::escalation::{CandidateState, EscalationSettings, Escalator};
    use duecall::libs::store::RecordStore;
    use duecall::libs::subtask::SubtaskStatus;
    use duecall::libs::user::PriorityClass;
    use duecall::libs::workflow::{register_user, SubtaskService, TaskService};
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Records every dialled number; numbers in `unreachable` fail to connect,
    /// numbers in `unanswered` ring out.
    #[derive(Default)]
    struct FakeGateway {
        dialled: Mutex<Vec<String>>,
        unreachable: HashSet<String>,
        unanswered: HashSet<String>,
        poll_delay: Option<Duration>,
    }

    #[async_trait]
    impl CallGateway for FakeGateway {
        async fn place_call(&self, phone_number: &str, message: &str) -> Result<CallHandle> {
            assert!(message.contains("is due"));
            if self.unreachable.contains(phone_number) {
                return Err(Error::GatewayFailure(format!("cannot reach {}", phone_number)));
            }
            self.dialled.lock().push(phone_number.to_string());
            Ok(CallHandle(phone_number.to_string()))
        }

        async fn poll_outcome(&self, handle: &CallHandle) -> Result<CallOutcome> {
            if let Some(delay) = self.poll_delay {
                tokio::time::sleep(delay).await;
            }
            if self.unanswered.contains(&handle.0) {
                Ok(CallOutcome::NotCompleted("no-answer".to_string()))
            } else {
                Ok(CallOutcome::Completed)
            }
        }
    }

    struct Fixture {
        _temp_dir: TempDir,
        store: Arc<SqliteStore>,
        clock: Arc<ManualClock>,
    }

    fn now() -> DateTime<Utc> {
        Local.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap().with_timezone(&Utc)
    }

    fn fixture() -> Fixture {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(SqliteStore::open(temp_dir.path().join("duecall.db")).unwrap());
        Fixture {
            _temp_dir: temp_dir,
            store,
            clock: Arc::new(ManualClock::new(now())),
        }
    }

    fn settings() -> EscalationSettings {
        EscalationSettings {
            pacing: Duration::ZERO,
            ..EscalationSettings::default()
        }
    }

    impl Fixture {
        fn user(&self, phone: &str, class: i64) -> i64 {
            register_user(self.store.as_ref(), phone, PriorityClass::try_from(class).unwrap()).unwrap().id.unwrap()
        }

        fn task(&self, user_id: i64, title: &str, due_offset_hours: i64) -> i64 {
            let due = now() + TimeDelta::hours(due_offset_hours);
            TaskService::new(self.store.as_ref(), self.clock.as_ref())
                .create(user_id, title, "details", due)
                .unwrap()
                .id
                .unwrap()
        }

        fn escalator(&self, ledger: Arc<dyn ContactLedger>, gateway: Arc<FakeGateway>) -> Escalator {
            Escalator::new(self.store.clone(), ledger, gateway, self.clock.clone(), settings())
        }
    }

    #[tokio::test]
    async fn test_calls_in_class_then_due_order() {
        let fx = fixture();
        let low = fx.user("15550102", 2);
        let high = fx.user("15550100", 0);
        let mid = fx.user("15550101", 1);
        fx.task(low, "low class", -30);
        fx.task(mid, "mid class", -2);
        fx.task(high, "high recent", -1);
        fx.task(high, "high oldest", -48);

        let gateway = Arc::new(FakeGateway::default());
        let report = fx.escalator(Arc::new(MemoryContactLedger::new()), gateway.clone()).run().await.unwrap();

        assert_eq!(report.selected, 4);
        let order: Vec<i64> = report.candidates.iter().map(|c| c.user_id).collect();
        assert_eq!(order, vec![high, high, mid, low]);
        // The second high-class task is held back by the contact made for the first
        assert_eq!(*gateway.dialled.lock(), vec!["15550100", "15550101", "15550102"]);
        assert_eq!(report.answered(), 3);
        assert_eq!(report.skipped(), 1);
    }

    #[tokio::test]
    async fn test_only_overdue_open_live_tasks_are_selected() {
        let fx = fixture();
        let user = fx.user("15550100", 0);
        fx.task(user, "future", 5);
        let done = fx.task(user, "done", -5);
        let deleted = fx.task(user, "deleted", -5);

        let subtasks = SubtaskService::new(fx.store.as_ref(), fx.clock.as_ref());
        let sub = subtasks.create(done).unwrap().id.unwrap();
        subtasks.update_status(sub, SubtaskStatus::Complete).unwrap();
        TaskService::new(fx.store.as_ref(), fx.clock.as_ref()).soft_delete(deleted).unwrap();

        let gateway = Arc::new(FakeGateway::default());
        let report = fx.escalator(Arc::new(MemoryContactLedger::new()), gateway.clone()).run().await.unwrap();

        assert_eq!(report.selected, 0);
        assert!(gateway.dialled.lock().is_empty());
    }

    #[tokio::test]
    async fn test_cooldown_window() {
        let fx = fixture();
        let recent = fx.user("15550100", 0);
        let stale = fx.user("15550101", 0);
        fx.task(recent, "recent", -1);
        fx.task(stale, "stale", -1);

        let ledger = Arc::new(MemoryContactLedger::new());
        ledger.record_contact(recent, now() - TimeDelta::hours(23)).unwrap();
        ledger.record_contact(stale, now() - TimeDelta::hours(24)).unwrap();

        let gateway = Arc::new(FakeGateway::default());
        let report = fx.escalator(ledger.clone(), gateway.clone()).run().await.unwrap();

        assert_eq!(*gateway.dialled.lock(), vec!["15550101"]);
        assert!(matches!(report.candidates[0].state, CandidateState::Skipped { .. }));
        assert_eq!(ledger.last_contact(stale).unwrap(), Some(now()));
        assert_eq!(ledger.last_contact(recent).unwrap(), Some(now() - TimeDelta::hours(23)));
    }

    #[tokio::test]
    async fn test_unanswered_call_is_retried_next_run() {
        let fx = fixture();
        let user = fx.user("15550100", 0);
        fx.task(user, "call me", -3);

        let ledger = Arc::new(MemoryContactLedger::new());
        let gateway = Arc::new(FakeGateway {
            unanswered: HashSet::from(["15550100".to_string()]),
            ..FakeGateway::default()
        });

        let first = fx.escalator(ledger.clone(), gateway.clone()).run().await.unwrap();
        assert_eq!(first.called(), 1);
        assert_eq!(first.answered(), 0);
        assert_eq!(ledger.last_contact(user).unwrap(), None);

        fx.clock.advance(TimeDelta::hours(1));
        fx.escalator(ledger, gateway.clone()).run().await.unwrap();
        assert_eq!(gateway.dialled.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_answered_user_is_left_alone_across_runs() {
        let fx = fixture();
        let user = fx.user("15550100", 0);
        fx.task(user, "call once", -3);
        let gateway = Arc::new(FakeGateway::default());

        fx.escalator(fx.store.clone(), gateway.clone()).run().await.unwrap();
        fx.clock.advance(TimeDelta::hours(1));
        let second = fx.escalator(fx.store.clone(), gateway.clone()).run().await.unwrap();
        assert_eq!(second.skipped(), 1);

        fx.clock.advance(TimeDelta::hours(23));
        let third = fx.escalator(fx.store.clone(), gateway.clone()).run().await.unwrap();
        assert_eq!(third.answered(), 1);
        assert_eq!(gateway.dialled.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_call_does_not_stop_the_run() {
        let fx = fixture();
        let broken = fx.user("15550100", 0);
        let fine = fx.user("15550101", 1);
        fx.task(broken, "broken", -2);
        fx.task(fine, "fine", -2);

        let ledger = Arc::new(MemoryContactLedger::new());
        let gateway = Arc::new(FakeGateway {
            unreachable: HashSet::from(["15550100".to_string()]),
            ..FakeGateway::default()
        });
        let report = fx.escalator(ledger.clone(), gateway.clone()).run().await.unwrap();

        assert!(matches!(report.candidates[0].state, CandidateState::Failed(_)));
        assert_eq!(report.failed(), 1);
        assert_eq!(report.answered(), 1);
        assert_eq!(ledger.last_contact(broken).unwrap(), None);
        assert_eq!(ledger.last_contact(fine).unwrap(), Some(now()));
    }

    #[tokio::test]
    async fn test_slow_outcome_poll_times_out() {
        let fx = fixture();
        let user = fx.user("15550100", 0);
        fx.task(user, "slow", -2);

        let ledger = Arc::new(MemoryContactLedger::new());
        let gateway = Arc::new(FakeGateway {
            poll_delay: Some(Duration::from_secs(5)),
            ..FakeGateway::default()
        });
        let escalator = Escalator::new(
            fx.store.clone(),
            ledger.clone(),
            gateway,
            fx.clock.clone(),
            EscalationSettings {
                pacing: Duration::ZERO,
                poll_timeout: Duration::from_millis(50),
                ..EscalationSettings::default()
            },
        );

        let report = escalator.run().await.unwrap();
        assert!(matches!(report.candidates[0].state, CandidateState::Failed(_)));
        assert_eq!(ledger.last_contact(user).unwrap(), None);
        assert!(fx.store.find_user(user).unwrap().is_some());
    }
}
