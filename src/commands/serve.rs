use crate::libs::{config::Config, daemon, engine::Engine};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let config = Config::read()?;
    let engine = Engine::from_config(&config, false)?;

    daemon::run_with_signal_handling(engine.scheduled_jobs()).await
}
