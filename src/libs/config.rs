//! Configuration for the call gateway and the job scheduler.
//!
//! Stored as pretty JSON in `config.json` inside the platform data directory.
//! A missing file means defaults: no gateway (dry-run calls) and the standard
//! cadences. Gateway credentials can also come from the environment or a
//! `.env` file:
//!
//! - `TWILIO_ACCOUNT_SID`
//! - `TWILIO_AUTH_TOKEN`
//! - `TWILIO_FROM_NUMBER`
//!
//! Environment values win over the file.
//!
//! ```rust,no_run
//! use duecall::libs::config::Config;
//!
//! let config = Config::read()?;
//! let scheduler = config.scheduler.unwrap_or_default();
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::api::twilio::{GatewayConfig, DEFAULT_API_URL};
use crate::libs::contacts::LedgerKind;
use crate::libs::escalation::{EscalationSettings, DEFAULT_COOLDOWN_HOURS, DEFAULT_PACING_SECS, DEFAULT_POLL_TIMEOUT_SECS};
use crate::libs::jobs::Cadence;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use chrono::TimeDelta;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const ENV_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const ENV_FROM_NUMBER: &str = "TWILIO_FROM_NUMBER";

/// A section offered by the interactive setup.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Timing of the two periodic jobs and of the escalation loop.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Hours an answered user is left alone.
    pub cooldown_hours: i64,
    /// Seconds between placing a call and polling its outcome.
    pub pacing_secs: u64,
    pub poll_timeout_secs: u64,
    pub contact_ledger: LedgerKind,
    /// Local time of the daily priority recalculation.
    pub priority_hour: u32,
    pub priority_minute: u32,
    /// Minute past each hour the escalation job fires.
    pub escalation_minute: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            cooldown_hours: DEFAULT_COOLDOWN_HOURS,
            pacing_secs: DEFAULT_PACING_SECS,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            contact_ledger: LedgerKind::default(),
            priority_hour: 0,
            priority_minute: 0,
            escalation_minute: 0,
        }
    }
}

impl SchedulerConfig {
    pub fn escalation_settings(&self) -> EscalationSettings {
        EscalationSettings {
            cooldown: TimeDelta::hours(self.cooldown_hours.max(0)),
            pacing: Duration::from_secs(self.pacing_secs),
            poll_timeout: Duration::from_secs(self.poll_timeout_secs.max(1)),
        }
    }

    pub fn priority_cadence(&self) -> Cadence {
        Cadence::Daily {
            hour: self.priority_hour,
            minute: self.priority_minute,
        }
    }

    pub fn escalation_cadence(&self) -> Cadence {
        Cadence::Hourly {
            minute: self.escalation_minute,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerConfig>,
}

impl Config {
    /// Loads `config.json` from the data directory, then applies `.env` and
    /// environment overrides.
    pub fn read() -> Result<Config> {
        dotenv::dotenv().ok();

        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let mut config = Self::read_from(&config_file_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads a config file as is. A missing file yields the default config.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(config_file_path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Overlays gateway credentials found through `lookup`.
    ///
    /// A gateway section is created when all three credentials are present
    /// and none was configured.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let account_sid = lookup(ENV_ACCOUNT_SID).filter(|v| !v.is_empty());
        let auth_token = lookup(ENV_AUTH_TOKEN).filter(|v| !v.is_empty());
        let from_number = lookup(ENV_FROM_NUMBER).filter(|v| !v.is_empty());

        match self.gateway.as_mut() {
            Some(gateway) => {
                if let Some(v) = account_sid {
                    gateway.account_sid = v;
                }
                if let Some(v) = auth_token {
                    gateway.auth_token = v;
                }
                if let Some(v) = from_number {
                    gateway.from_number = v;
                }
            }
            None => {
                if let (Some(account_sid), Some(auth_token), Some(from_number)) = (account_sid, auth_token, from_number) {
                    self.gateway = Some(GatewayConfig {
                        account_sid,
                        auth_token,
                        from_number,
                        api_url: DEFAULT_API_URL.to_string(),
                    });
                }
            }
        }
    }

    /// Interactive setup wizard. Existing values are offered as defaults.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            GatewayConfig::module(),
            ConfigModule {
                key: "scheduler".to_string(),
                name: Message::ConfigModuleScheduler.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "gateway" => config.gateway = Some(GatewayConfig::init(&config.gateway)?),
                "scheduler" => config.scheduler = Some(Self::init_scheduler(&config.scheduler)?),
                _ => {}
            }
        }

        Ok(config)
    }

    fn init_scheduler(current: &Option<SchedulerConfig>) -> Result<SchedulerConfig> {
        let default = current.clone().unwrap_or_default();
        msg_print!(Message::ConfigModuleScheduler);

        let ledgers = [LedgerKind::Database, LedgerKind::Memory];
        let ledger_names = [Message::LedgerDatabase.to_string(), Message::LedgerMemory.to_string()];
        let ledger_index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptContactLedger.to_string())
            .items(&ledger_names)
            .default(ledgers.iter().position(|k| *k == default.contact_ledger).unwrap_or(0))
            .interact()?;

        Ok(SchedulerConfig {
            cooldown_hours: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptCooldownHours.to_string())
                .default(default.cooldown_hours)
                .interact_text()?,
            pacing_secs: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptPacingSecs.to_string())
                .default(default.pacing_secs)
                .interact_text()?,
            poll_timeout_secs: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptPollTimeoutSecs.to_string())
                .default(default.poll_timeout_secs)
                .interact_text()?,
            contact_ledger: ledgers[ledger_index],
            priority_hour: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptPriorityHour.to_string())
                .default(default.priority_hour)
                .validate_with(|v: &u32| if *v < 24 { Ok(()) } else { Err(Message::HourOutOfRange.to_string()) })
                .interact_text()?,
            priority_minute: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptPriorityMinute.to_string())
                .default(default.priority_minute)
                .validate_with(|v: &u32| if *v < 60 { Ok(()) } else { Err(Message::MinuteOutOfRange.to_string()) })
                .interact_text()?,
            escalation_minute: Input::with_theme(&ColorfulTheme::default())
                .with_prompt(Message::PromptEscalationMinute.to_string())
                .default(default.escalation_minute)
                .validate_with(|v: &u32| if *v < 60 { Ok(()) } else { Err(Message::MinuteOutOfRange.to_string()) })
                .interact_text()?,
        })
    }
}
