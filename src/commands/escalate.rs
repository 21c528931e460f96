use crate::{
    libs::{config::Config, engine::Engine, jobs::ESCALATION_JOB, messages::Message, view::View},
    msg_info, msg_success, msg_warning,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct EscalateArgs {
    /// Log the calls instead of placing them
    #[arg(long)]
    dry_run: bool,
}

pub async fn cmd(args: EscalateArgs) -> Result<()> {
    let config = Config::read()?;
    let engine = Engine::from_config(&config, args.dry_run)?;

    let Some(lease) = engine.run_lease().acquire(ESCALATION_JOB)? else {
        msg_warning!(Message::JobHeldElsewhere(ESCALATION_JOB.to_string()));
        return Ok(());
    };

    let report = lease.hold(engine.escalator().run()).await?;
    if report.selected == 0 {
        msg_info!(Message::NoOverdueTasks);
        return Ok(());
    }

    View::escalation_report(&report);
    msg_success!(Message::EscalationRunSummary(
        report.selected,
        report.called(),
        report.answered(),
        report.skipped(),
        report.failed()
    ));

    Ok(())
}
