// Ports to the home-automation platform
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("request to platform failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("platform responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Source of the appliance's power readings.
#[async_trait]
pub trait PowerSensor: Send + Sync {
    /// Current draw in watts; `None` when the sensor is unavailable.
    async fn read_power_watts(&self) -> Result<Option<f64>, PlatformError>;
}

/// Text field on the platform showing the appliance status.
#[async_trait]
pub trait DisplaySurface: Send + Sync {
    async fn set_display_text(&self, text: &str) -> Result<(), PlatformError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> Result<(), PlatformError>;
}
