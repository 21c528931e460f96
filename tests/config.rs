#[cfg(test)]
mod tests {
    use duecall::api::GatewayConfig;
    use duecall::libs::config::{Config, SchedulerConfig, ENV_ACCOUNT_SID, ENV_AUTH_TOKEN, ENV_FROM_NUMBER};
    use duecall::libs::contacts::LedgerKind;
    use duecall::libs::jobs::Cadence;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        _temp_dir: TempDir,
        config_path: PathBuf,
        gateway: GatewayConfig,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let config_path = temp_dir.path().join("config.json");
            ConfigTestContext {
                _temp_dir: temp_dir,
                config_path,
                gateway: GatewayConfig {
                    account_sid: "AC123".to_string(),
                    auth_token: "secret".to_string(),
                    from_number: "+15550000".to_string(),
                    api_url: "https://api.twilio.com".to_string(),
                },
            }
        }
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_is_default(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.config_path).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.gateway.is_none());
        assert!(config.scheduler.is_none());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read(ctx: &mut ConfigTestContext) {
        let config = Config {
            gateway: Some(ctx.gateway.clone()),
            scheduler: Some(SchedulerConfig {
                cooldown_hours: 12,
                contact_ledger: LedgerKind::Memory,
                ..SchedulerConfig::default()
            }),
        };
        config.save_to(&ctx.config_path).unwrap();

        assert_eq!(Config::read_from(&ctx.config_path).unwrap(), config);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_scheduler_uses_defaults(ctx: &mut ConfigTestContext) {
        std::fs::write(&ctx.config_path, r#"{ "scheduler": { "escalation_minute": 30, "contact_ledger": "memory" } }"#).unwrap();

        let scheduler = Config::read_from(&ctx.config_path).unwrap().scheduler.unwrap();
        assert_eq!(scheduler.escalation_cadence(), Cadence::Hourly { minute: 30 });
        assert_eq!(scheduler.priority_cadence(), Cadence::Daily { hour: 0, minute: 0 });
        assert_eq!(scheduler.contact_ledger, LedgerKind::Memory);

        let settings = scheduler.escalation_settings();
        assert_eq!(settings.cooldown, chrono::TimeDelta::hours(24));
        assert_eq!(settings.pacing, Duration::from_secs(20));
        assert_eq!(settings.poll_timeout, Duration::from_secs(30));
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_gateway_api_url_defaults(ctx: &mut ConfigTestContext) {
        std::fs::write(
            &ctx.config_path,
            r#"{ "gateway": { "account_sid": "AC1", "auth_token": "t", "from_number": "+1555" } }"#,
        )
        .unwrap();

        let gateway = Config::read_from(&ctx.config_path).unwrap().gateway.unwrap();
        assert_eq!(gateway.api_url, "https://api.twilio.com");
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_env_overrides_file_values(ctx: &mut ConfigTestContext) {
        let mut config = Config {
            gateway: Some(ctx.gateway.clone()),
            scheduler: None,
        };
        let vars = env(&[(ENV_AUTH_TOKEN, "rotated"), (ENV_FROM_NUMBER, "")]);
        config.apply_overrides(|key| vars.get(key).cloned());

        let gateway = config.gateway.unwrap();
        assert_eq!(gateway.auth_token, "rotated");
        assert_eq!(gateway.account_sid, "AC123");
        assert_eq!(gateway.from_number, "+15550000");
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_env_alone_configures_gateway(_ctx: &mut ConfigTestContext) {
        let mut partial = Config::default();
        let vars = env(&[(ENV_ACCOUNT_SID, "AC9"), (ENV_AUTH_TOKEN, "tok")]);
        partial.apply_overrides(|key| vars.get(key).cloned());
        assert!(partial.gateway.is_none());

        let mut full = Config::default();
        let vars = env(&[(ENV_ACCOUNT_SID, "AC9"), (ENV_AUTH_TOKEN, "tok"), (ENV_FROM_NUMBER, "+15551234")]);
        full.apply_overrides(|key| vars.get(key).cloned());
        let gateway = full.gateway.unwrap();
        assert_eq!(gateway.account_sid, "AC9");
        assert_eq!(gateway.from_number, "+15551234");
    }
}
