// Home Assistant REST adapter for the platform ports
use crate::application::platform::{DisplaySurface, Notifier, PlatformError, PowerSensor};
use crate::infrastructure::config::PlatformSettings;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HomeAssistantClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    power_entity: String,
    display_entity: String,
    notify_service: String,
}

#[derive(Debug, Deserialize)]
struct EntityState {
    state: String,
}

impl HomeAssistantClient {
    pub fn new(settings: &PlatformSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            power_entity: settings.power_entity.clone(),
            display_entity: settings.display_entity.clone(),
            notify_service: settings.notify_service.clone(),
        })
    }

    fn state_url(&self, entity_id: &str) -> String {
        format!("{}/api/states/{}", self.base_url, urlencoding::encode(entity_id))
    }

    fn notify_url(&self) -> String {
        format!(
            "{}/api/services/notify/{}",
            self.base_url,
            urlencoding::encode(&self.notify_service)
        )
    }

    async fn post_json(&self, url: &str, body: serde_json::Value) -> Result<(), PlatformError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(PlatformError::Status { status, body })
}

/// Interpret an entity state string as watts; unavailable or non-numeric states are absent.
fn parse_power_state(state: &str) -> Option<f64> {
    match state.trim() {
        "unavailable" | "unknown" | "" => None,
        value => value.parse::<f64>().ok(),
    }
}

#[async_trait]
impl PowerSensor for HomeAssistantClient {
    async fn read_power_watts(&self) -> Result<Option<f64>, PlatformError> {
        let response = self
            .client
            .get(self.state_url(&self.power_entity))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let entity = check_status(response).await?.json::<EntityState>().await?;
        let watts = parse_power_state(&entity.state);
        if watts.is_none() {
            tracing::debug!("{} reported non-numeric state {:?}", self.power_entity, entity.state);
        }

        Ok(watts)
    }
}

#[async_trait]
impl DisplaySurface for HomeAssistantClient {
    async fn set_display_text(&self, text: &str) -> Result<(), PlatformError> {
        let url = self.state_url(&self.display_entity);
        self.post_json(&url, json!({ "state": text })).await
    }
}

#[async_trait]
impl Notifier for HomeAssistantClient {
    async fn notify(&self, title: &str, body: &str) -> Result<(), PlatformError> {
        let url = self.notify_url();
        self.post_json(&url, json!({ "title": title, "message": body }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PlatformSettings {
        PlatformSettings {
            base_url: "http://homeassistant.local:8123/".to_string(),
            token: "secret".to_string(),
            power_entity: "sensor.washer_power".to_string(),
            display_entity: "sensor.laundry status".to_string(),
            notify_service: "mobile_app_phone".to_string(),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_parse_power_state() {
        assert_eq!(parse_power_state("1532.7"), Some(1532.7));
        assert_eq!(parse_power_state(" 0 "), Some(0.0));
        assert_eq!(parse_power_state("-0.5"), Some(-0.5));
        assert_eq!(parse_power_state("unavailable"), None);
        assert_eq!(parse_power_state("unknown"), None);
        assert_eq!(parse_power_state("on"), None);
    }

    #[test]
    fn test_urls() {
        let client = HomeAssistantClient::new(&settings()).unwrap();

        assert_eq!(
            client.state_url("sensor.washer_power"),
            "http://homeassistant.local:8123/api/states/sensor.washer_power"
        );
        assert_eq!(
            client.state_url(&client.display_entity),
            "http://homeassistant.local:8123/api/states/sensor.laundry%20status"
        );
        assert_eq!(
            client.notify_url(),
            "http://homeassistant.local:8123/api/services/notify/mobile_app_phone"
        );
    }
}
