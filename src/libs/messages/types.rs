#[derive(Debug, Clone)]
pub enum Message {
    // === USER MESSAGES ===
    UserRegistered(i64, String), // id, dial string
    UsersHeader,
    NoUsersFound,

    // === TASK MESSAGES ===
    TaskCreated(i64),
    TaskUpdated(i64),
    TaskDeleted(i64),
    TasksHeader,
    TasksNotFound,
    TaskStatusChanged(i64, String, String), // task id, old, new

    // === SUBTASK MESSAGES ===
    SubtaskCreated(i64, i64), // subtask id, task id
    SubtaskUpdated(i64),
    SubtaskDeleted(i64),
    SubtasksHeader,
    NoSubtasksFound,
    SubtaskFilterRequired,

    // === PRIORITY MESSAGES ===
    PriorityUpdated(i64, u8, u8), // task id, old, new
    TaskOverdue(i64, String),     // task id, due date
    PriorityUpdateFailed(i64, String),
    PriorityRunSummary(usize, usize, usize, usize, usize), // scanned, updated, unchanged, overdue, failed

    // === ESCALATION MESSAGES ===
    EscalationRunStarted(usize),
    NoOverdueTasks,
    CandidateDropped(i64, String),        // task id, reason
    CandidateSkipped(i64, u8, String),    // user id, class, last contact
    CallPlaced(i64, u8, String),          // user id, class, task title
    CallQueued(String, String),           // call sid, provider status
    CallFailed(i64, String),              // task id, error
    CallAnswered(i64, u8),                // user id, class
    CallNotAnswered(i64, u8, String),     // user id, class, status
    CallResolved(String),                 // call handle
    ContactRecordFailed(i64, String),     // user id, error
    DryRunCall(String, String),           // phone, message
    GatewayNotConfigured,
    DryRunLedgerInMemory,
    EscalationRunSummary(usize, usize, usize, usize, usize), // selected, called, answered, skipped, failed

    // === JOB MESSAGES ===
    JobRegistered(String, String), // name, cadence
    JobScheduled(String, String),  // name, next run
    JobStarted(String),
    JobCompleted(String),
    JobFailed(String, String),
    JobSkippedInFlight(String),
    JobHeldElsewhere(String),
    LeaseLost(String),
    LeaseRenewFailed(String, String),   // job name, error
    LeaseReleaseFailed(String, String), // job name, error

    // === DAEMON MESSAGES ===
    DaemonStarted(u32),
    DaemonStopped,
    StalePidFile(String),
    ReceivedSigterm,
    ReceivedSigint,
    ReceivedCtrlC,
    SignalHandlerFailed(String),

    // === CONFIG MESSAGES ===
    ConfigSaved,
    ConfigModuleGateway,
    ConfigModuleScheduler,
    LedgerDatabase,
    LedgerMemory,
    HourOutOfRange,
    MinuteOutOfRange,

    // === PROMPTS ===
    PromptSelectModules,
    PromptAccountSid,
    PromptAuthToken,
    PromptFromNumber,
    PromptGatewayApiUrl,
    PromptContactLedger,
    PromptCooldownHours,
    PromptPacingSecs,
    PromptPollTimeoutSecs,
    PromptPriorityHour,
    PromptPriorityMinute,
    PromptEscalationMinute,

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    DatabaseVersion(u32),
    DatabaseUpToDate,
    DatabaseNeedsUpdate,
    MigrationHistory,
    NothingToRollback,
    RollingBack(u32, u32),
    RollbackCompleted(u32),
}
