//! Foreground job daemon behind `duecall serve`.
//!
//! Starts the trigger loop of every scheduled job and keeps them running until
//! SIGTERM or SIGINT (Ctrl-C on Windows). A pid file in the data directory
//! marks the running daemon and is removed on shutdown.

use crate::libs::data_storage::DataStorage;
use crate::libs::jobs::ScheduledJob;
use crate::libs::messages::Message;
use crate::{msg_error, msg_info, msg_warning};
use anyhow::Result;
use std::sync::Arc;

pub const PID_FILE: &str = "duecall-serve.pid";

/// Runs `jobs` on their cadences until a shutdown signal arrives.
pub async fn run_with_signal_handling(jobs: Vec<Arc<ScheduledJob>>) -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if pid_path.exists() {
        let previous = std::fs::read_to_string(&pid_path).unwrap_or_default();
        msg_warning!(Message::StalePidFile(previous.trim().to_string()));
    }
    std::fs::write(&pid_path, std::process::id().to_string())?;

    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            msg_info!(Message::JobRegistered(job.name().to_string(), job.cadence().to_string()));
            job.spawn()
        })
        .collect();

    msg_info!(Message::DaemonStarted(std::process::id()));
    wait_for_shutdown().await;

    // Aborting a trigger loop also aborts its run in progress, releasing guard and lease.
    for handle in handles {
        handle.abort();
    }

    if pid_path.exists() {
        let _ = std::fs::remove_file(&pid_path);
    }
    msg_info!(Message::DaemonStopped);

    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            msg_error!(Message::SignalHandlerFailed(e.to_string()));
            return ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            msg_info!(Message::ReceivedSigterm);
        }
        _ = sigint.recv() => {
            msg_info!(Message::ReceivedSigint);
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() {
    ctrl_c().await
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => msg_info!(Message::ReceivedCtrlC),
        Err(e) => {
            msg_error!(Message::SignalHandlerFailed(e.to_string()));
            std::future::pending::<()>().await
        }
    }
}
