// Appliance cycle monitor - Smooths power telemetry and drives the cycle state machine
use crate::application::platform::{DisplaySurface, Notifier, PowerSensor};
use crate::domain::cycle_state::{transition, CycleEffect, CycleState, CycleThresholds, TransitionInput};
use crate::domain::display::display_text;
use crate::domain::notification::Notification;
use crate::domain::rolling_buffer::RollingBuffer;
use crate::domain::telemetry::validate_sample;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Invalid reads tolerated in a row before the counter is reset with an error log.
pub const MAX_CONSECUTIVE_INVALID_READS: u32 = 10;

/// Point-in-time view of the monitor, served by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub state: CycleState,
    pub started_at: Option<DateTime<Utc>>,
    pub mean_watts: Option<f64>,
    pub buffered_samples: usize,
    pub consecutive_invalid_reads: u32,
    pub display_text: Option<String>,
}

impl Default for MonitorSnapshot {
    fn default() -> Self {
        Self {
            state: CycleState::Uninitialized,
            started_at: None,
            mean_watts: None,
            buffered_samples: 0,
            consecutive_invalid_reads: 0,
            display_text: None,
        }
    }
}

pub struct ApplianceCycleMonitor {
    sensor: Arc<dyn PowerSensor>,
    display: Arc<dyn DisplaySurface>,
    notifier: Arc<dyn Notifier>,
    thresholds: CycleThresholds,
    buffer: RollingBuffer,
    state: CycleState,
    started_at: Option<DateTime<Utc>>,
    consecutive_invalid_reads: u32,
    last_display_text: Option<String>,
}

impl ApplianceCycleMonitor {
    pub fn new(
        sensor: Arc<dyn PowerSensor>,
        display: Arc<dyn DisplaySurface>,
        notifier: Arc<dyn Notifier>,
        thresholds: CycleThresholds,
    ) -> Self {
        Self {
            sensor,
            display,
            notifier,
            thresholds,
            buffer: RollingBuffer::default(),
            state: CycleState::Uninitialized,
            started_at: None,
            consecutive_invalid_reads: 0,
            last_display_text: None,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            state: self.state,
            started_at: self.started_at,
            mean_watts: self.buffer.mean(),
            buffered_samples: self.buffer.len(),
            consecutive_invalid_reads: self.consecutive_invalid_reads,
            display_text: self.last_display_text.clone(),
        }
    }

    /// Poll the power sensor once and feed the smoothed reading into the state machine.
    pub async fn on_telemetry_sample(&mut self, now: DateTime<Utc>) {
        let raw = match self.sensor.read_power_watts().await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!("Failed to read power sensor: {}", e);
                None
            }
        };

        let Some(watts) = validate_sample(raw) else {
            self.record_invalid_read(raw);
            return;
        };

        self.consecutive_invalid_reads = 0;
        self.buffer.push(watts);

        let Some(mean) = self.buffer.mean() else {
            return;
        };
        tracing::debug!(
            "Power sample {:.1}W, mean {:.1}W over {} samples",
            watts,
            mean,
            self.buffer.len()
        );

        self.apply_mean(mean, now).await;
    }

    /// Recompute the status text and push it if it changed since the last successful write.
    pub async fn on_display_tick(&mut self, now: DateTime<Utc>) {
        let text = display_text(self.state, self.started_at, now, &self.thresholds);
        if self.last_display_text.as_deref() == Some(text.as_str()) {
            return;
        }

        match self.display.set_display_text(&text).await {
            Ok(()) => {
                tracing::debug!("Display text set to {:?}", text);
                self.last_display_text = Some(text);
            }
            Err(e) => tracing::warn!("Failed to update display text: {}", e),
        }
    }

    fn record_invalid_read(&mut self, raw: Option<f64>) {
        self.consecutive_invalid_reads += 1;
        tracing::debug!(
            "Discarding invalid power reading {:?} ({} in a row)",
            raw,
            self.consecutive_invalid_reads
        );

        if self.consecutive_invalid_reads > MAX_CONSECUTIVE_INVALID_READS {
            tracing::error!(
                "Power sensor returned more than {} invalid readings in a row",
                MAX_CONSECUTIVE_INVALID_READS
            );
            self.consecutive_invalid_reads = 0;
        }
    }

    async fn apply_mean(&mut self, mean: f64, now: DateTime<Utc>) {
        let input = TransitionInput {
            state: self.state,
            mean,
            buffer_full: self.buffer.is_full(),
            started_at: self.started_at,
            now,
        };
        let result = transition(&input, &self.thresholds);

        self.started_at = result.started_at;
        if result.changed() {
            tracing::info!("Laundry state {} -> {} (mean {:.1}W)", result.previous, result.next, mean);
            self.state = result.next;
        }

        for effect in result.effects {
            match effect {
                CycleEffect::Notify(notification) => self.send(notification).await,
                CycleEffect::ProblemTimedOut => {
                    tracing::warn!("Laundry problem timed out, assuming the appliance is off")
                }
            }
        }
    }

    async fn send(&self, notification: Notification) {
        tracing::info!("Sending notification: {}", notification.title());
        if let Err(e) = self
            .notifier
            .notify(notification.title(), notification.body())
            .await
        {
            tracing::warn!("Failed to send notification {:?}: {}", notification, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::platform::fakes::{RecordingDisplay, RecordingNotifier, ScriptedSensor};
    use chrono::{Duration, TimeZone};

    struct Harness {
        sensor: Arc<ScriptedSensor>,
        display: Arc<RecordingDisplay>,
        notifier: Arc<RecordingNotifier>,
        monitor: ApplianceCycleMonitor,
    }

    impl Harness {
        fn new() -> Self {
            let sensor = Arc::new(ScriptedSensor::default());
            let display = Arc::new(RecordingDisplay::default());
            let notifier = Arc::new(RecordingNotifier::default());
            let monitor = ApplianceCycleMonitor::new(
                sensor.clone(),
                display.clone(),
                notifier.clone(),
                CycleThresholds::default(),
            );
            Self {
                sensor,
                display,
                notifier,
                monitor,
            }
        }

        async fn feed(&mut self, reading: Option<f64>, now: DateTime<Utc>) {
            self.sensor.push(reading);
            self.monitor.on_telemetry_sample(now).await;
        }

        async fn feed_many(&mut self, watts: f64, count: usize, now: DateTime<Utc>) {
            for _ in 0..count {
                self.feed(Some(watts), now).await;
            }
        }

        fn buffered(&self) -> Vec<f64> {
            self.monitor.buffer.samples().collect()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_buffer_keeps_latest_ten() {
        let mut h = Harness::new();
        for i in 0..14 {
            h.feed(Some(i as f64), t0()).await;
        }

        let expected: Vec<f64> = (4..14).map(|i| i as f64).collect();
        assert_eq!(h.buffered(), expected);
    }

    #[tokio::test]
    async fn test_invalid_sample_is_ignored() {
        let mut h = Harness::new();
        h.feed_many(0.0, 10, t0()).await;
        assert_eq!(h.monitor.state(), CycleState::Off);

        h.feed(Some(1.0), t0()).await;
        h.feed(None, t0()).await;
        h.feed(Some(-5.0), t0()).await;
        h.feed(Some(2.0), t0()).await;

        let buffered = h.buffered();
        assert_eq!(buffered.len(), 10);
        assert_eq!(&buffered[8..], &[1.0, 2.0]);
        assert_eq!(h.monitor.state(), CycleState::Off);
    }

    #[tokio::test]
    async fn test_invalid_counter_resets() {
        let mut h = Harness::new();
        for _ in 0..MAX_CONSECUTIVE_INVALID_READS {
            h.feed(None, t0()).await;
        }
        assert_eq!(h.monitor.consecutive_invalid_reads, MAX_CONSECUTIVE_INVALID_READS);

        h.feed(None, t0()).await;
        assert_eq!(h.monitor.consecutive_invalid_reads, 0);
        assert_eq!(h.monitor.state(), CycleState::Uninitialized);

        h.feed(None, t0()).await;
        h.feed(Some(0.0), t0()).await;
        assert_eq!(h.monitor.consecutive_invalid_reads, 0);
        assert_eq!(h.buffered(), vec![0.0]);
    }

    #[tokio::test]
    async fn test_washing_debounce() {
        let mut h = Harness::new();
        h.monitor.state = CycleState::Washing;
        h.monitor.started_at = Some(t0());
        h.feed_many(0.0, 9, t0()).await;
        assert_eq!(h.monitor.state(), CycleState::Washing);

        h.feed(Some(0.0), t0() + Duration::seconds(239)).await;
        assert_eq!(h.monitor.state(), CycleState::Washing);
        assert!(h.notifier.titles().is_empty());

        h.feed(Some(0.0), t0() + Duration::minutes(4)).await;
        assert_eq!(h.monitor.state(), CycleState::Problem);
        assert_eq!(h.notifier.titles(), vec!["Laundry Problem"]);
    }

    #[tokio::test]
    async fn test_display_writes_once_per_change() {
        let mut h = Harness::new();
        h.monitor.on_display_tick(t0()).await;
        h.monitor.on_display_tick(t0()).await;
        assert_eq!(h.display.writes(), vec!["Unknown"]);

        h.monitor.state = CycleState::Washing;
        h.monitor.started_at = Some(t0());
        h.monitor.on_display_tick(t0()).await;
        h.monitor.on_display_tick(t0()).await;
        h.monitor.on_display_tick(t0() + Duration::seconds(1)).await;
        assert_eq!(
            h.display.writes(),
            vec!["Unknown", "Washing: 5h 30m 00s", "Washing: 5h 29m 59s"]
        );
    }

    #[tokio::test]
    async fn test_failed_display_write_is_retried() {
        let mut h = Harness::new();
        h.display.set_failing(true);
        h.monitor.on_display_tick(t0()).await;
        assert!(h.display.writes().is_empty());
        assert_eq!(h.monitor.snapshot().display_text, None);

        h.display.set_failing(false);
        h.monitor.on_display_tick(t0()).await;
        assert_eq!(h.display.writes(), vec!["Unknown"]);
    }

    #[tokio::test]
    async fn test_finished_notification_fires_once() {
        let mut h = Harness::new();
        h.monitor.state = CycleState::Drying;
        h.monitor.started_at = Some(t0());
        h.feed_many(10.0, 9, t0()).await;
        assert_eq!(h.monitor.state(), CycleState::StayFresh);

        h.feed_many(10.0, 5, t0() + Duration::minutes(10)).await;
        assert_eq!(h.monitor.state(), CycleState::StayFresh);
        assert_eq!(h.notifier.titles(), vec!["Laundry Finished"]);
    }

    #[tokio::test]
    async fn test_problem_times_out_to_off() {
        let mut h = Harness::new();
        h.monitor.state = CycleState::Problem;
        h.monitor.started_at = Some(t0() - Duration::hours(25));

        h.feed(Some(0.5), t0()).await;
        assert_eq!(h.monitor.state(), CycleState::Off);
        assert_eq!(h.notifier.titles(), vec!["Laundry Problem Resolved"]);
    }

    #[tokio::test]
    async fn test_full_cycle() {
        let mut h = Harness::new();
        let mut now = t0();

        h.feed_many(0.0, 9, now).await;
        assert_eq!(h.monitor.state(), CycleState::Uninitialized);
        h.feed(Some(0.0), now).await;
        assert_eq!(h.monitor.state(), CycleState::Off);
        assert_eq!(h.monitor.started_at, None);

        now += Duration::seconds(30);
        h.feed(Some(50.0), now).await;
        assert_eq!(h.monitor.state(), CycleState::Washing);
        assert_eq!(h.monitor.started_at, Some(now));

        now += Duration::minutes(5);
        h.feed_many(1500.0, 10, now).await;
        assert_eq!(h.monitor.state(), CycleState::Drying);

        now += Duration::hours(2);
        h.feed_many(10.0, 10, now).await;
        assert_eq!(h.monitor.state(), CycleState::StayFresh);
        assert_eq!(h.notifier.titles(), vec!["Laundry Finished"]);

        h.monitor.on_display_tick(now).await;
        assert_eq!(h.display.writes(), vec!["Finished!"]);

        now += Duration::hours(1);
        h.feed_many(1.0, 10, now).await;
        assert_eq!(h.monitor.state(), CycleState::Off);
        assert_eq!(h.monitor.started_at, None);
        assert_eq!(h.notifier.titles(), vec!["Laundry Finished"]);

        h.monitor.on_display_tick(now).await;
        assert_eq!(h.display.writes(), vec!["Finished!", "Unknown"]);
    }
}
