#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use duecall::db::store::SqliteStore;
    use duecall::libs::contacts::ContactLedger;
    use duecall::libs::error::Error;
    use duecall::libs::store::RecordStore;
    use duecall::libs::subtask::Subtask;
    use duecall::libs::task::{Task, TaskFilter, TaskStatus};
    use duecall::libs::user::{PriorityClass, User};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct StoreTestContext {
        temp_dir: TempDir,
        store: SqliteStore,
    }

    impl TestContext for StoreTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let store = SqliteStore::open(temp_dir.path().join("duecall.db")).unwrap();
            StoreTestContext { temp_dir, store }
        }
    }

    impl StoreTestContext {
        fn user(&self, phone: &str, class: i64) -> i64 {
            let user = User::new(phone, PriorityClass::try_from(class).unwrap()).unwrap();
            self.store.save_user(&user).unwrap()
        }

        fn task(&self, user_id: i64, title: &str, due_hours: i64) -> i64 {
            let due = Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap() + TimeDelta::hours(due_hours);
            self.store.save_task(&Task::new(user_id, title, "details", due).unwrap()).unwrap()
        }
    }

    #[test_context(StoreTestContext)]
    #[test]
    fn test_user_lookup_by_phone(ctx: &mut StoreTestContext) {
        let id = ctx.user("+1 555 0100", 1);
        let found = ctx.store.find_user_by_phone("15550100").unwrap().unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.priority_class.value(), 1);
        assert!(ctx.store.find_user_by_phone("15550199").unwrap().is_none());
        assert!(ctx.store.find_user(id + 1).unwrap().is_none());
    }

    #[test_context(StoreTestContext)]
    #[test]
    fn test_users_listed_by_class(ctx: &mut StoreTestContext) {
        ctx.user("15550102", 2);
        ctx.user("15550100", 0);
        ctx.user("15550101", 1);
        let classes: Vec<u8> = ctx.store.list_users().unwrap().iter().map(|u| u.priority_class.value()).collect();
        assert_eq!(classes, vec![0, 1, 2]);
    }

    #[test_context(StoreTestContext)]
    #[test]
    fn test_overdue_selection(ctx: &mut StoreTestContext) {
        let user = ctx.user("15550100", 0);
        let later = ctx.task(user, "later overdue", -1);
        let earlier = ctx.task(user, "earlier overdue", -5);
        ctx.task(user, "future", 5);

        let done = ctx.task(user, "done", -3);
        let mut task = ctx.store.find_task(done).unwrap().unwrap();
        task.status = TaskStatus::Done;
        ctx.store.save_task(&task).unwrap();

        let deleted = ctx.task(user, "deleted", -4);
        let mut task = ctx.store.find_task(deleted).unwrap().unwrap();
        task.soft_delete(Utc::now());
        ctx.store.save_task(&task).unwrap();

        let now = Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap();
        let overdue: Vec<_> = ctx.store.find_live_tasks(&TaskFilter::Overdue(now)).unwrap().into_iter().filter_map(|t| t.id).collect();
        assert_eq!(overdue, vec![earlier, later]);

        assert_eq!(ctx.store.find_live_tasks(&TaskFilter::Active).unwrap().len(), 3);
        assert_eq!(ctx.store.find_live_tasks(&TaskFilter::All).unwrap().len(), 4);
    }

    #[test_context(StoreTestContext)]
    #[test]
    fn test_deleted_task_cannot_be_restored(ctx: &mut StoreTestContext) {
        let user = ctx.user("15550100", 0);
        let id = ctx.task(user, "gone", 1);
        let mut task = ctx.store.find_task(id).unwrap().unwrap();
        task.soft_delete(Utc::now());
        ctx.store.save_task(&task).unwrap();

        task.deleted_at = None;
        assert!(matches!(ctx.store.save_task(&task), Err(Error::InvalidInput(_))));
        assert!(ctx.store.find_task(id).unwrap().unwrap().deleted_at.is_some());

        task.id = Some(999);
        assert!(matches!(ctx.store.save_task(&task), Err(Error::NotFound(_, 999))));
    }

    #[test_context(StoreTestContext)]
    #[test]
    fn test_subtasks_by_user_are_live_only(ctx: &mut StoreTestContext) {
        let alice = ctx.user("15550100", 0);
        let bob = ctx.user("15550101", 0);
        let alice_task = ctx.task(alice, "alice", 1);
        let bob_task = ctx.task(bob, "bob", 1);

        ctx.store.save_subtask(&Subtask::new(alice_task)).unwrap();
        let removed = ctx.store.save_subtask(&Subtask::new(alice_task)).unwrap();
        ctx.store.save_subtask(&Subtask::new(bob_task)).unwrap();

        let mut subtask = ctx.store.find_subtask(removed).unwrap().unwrap();
        subtask.deleted_at = Some(Utc::now());
        ctx.store.save_subtask(&subtask).unwrap();

        assert_eq!(ctx.store.find_live_subtasks_by_user(alice).unwrap().len(), 1);
        assert_eq!(ctx.store.find_live_subtasks_by_task(bob_task).unwrap().len(), 1);
    }

    #[test_context(StoreTestContext)]
    #[test]
    fn test_subtask_needs_existing_task(ctx: &mut StoreTestContext) {
        assert!(matches!(ctx.store.save_subtask(&Subtask::new(77)), Err(Error::StoreFailure(_))));
    }

    #[test_context(StoreTestContext)]
    #[test]
    fn test_contact_ledger_persists(ctx: &mut StoreTestContext) {
        let user = ctx.user("15550100", 0);
        let first = Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap();
        assert_eq!(ctx.store.last_contact(user).unwrap(), None);

        ctx.store.record_contact(user, first).unwrap();
        ctx.store.record_contact(user, first + TimeDelta::hours(2)).unwrap();
        assert_eq!(ctx.store.last_contact(user).unwrap(), Some(first + TimeDelta::hours(2)));

        // A fresh handle on the same file sees the entry
        let reopened = SqliteStore::open(ctx.temp_dir.path().join("duecall.db")).unwrap();
        assert_eq!(reopened.last_contact(user).unwrap(), Some(first + TimeDelta::hours(2)));
    }
}
