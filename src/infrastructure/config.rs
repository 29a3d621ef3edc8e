use crate::domain::cycle_state::CycleThresholds;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub platform: PlatformSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub cycle: CycleThresholds,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlatformSettings {
    pub base_url: String,
    pub token: String,
    pub power_entity: String,
    pub display_entity: String,
    pub notify_service: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScheduleSettings {
    pub telemetry_interval_secs: u64,
    pub display_interval_secs: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            telemetry_interval_secs: 30,
            display_interval_secs: 1,
        }
    }
}

impl ScheduleSettings {
    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_secs(self.telemetry_interval_secs.max(1))
    }

    pub fn display_interval(&self) -> Duration {
        Duration::from_secs(self.display_interval_secs.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpSettings {
    pub bind: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Load `config/laundry.*`, overridden by `LAUNDRY__SECTION__KEY` environment variables.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/laundry").required(false))
        .add_source(
            config::Environment::with_prefix("LAUNDRY")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
