// Monitor runner - Serializes both periodic callbacks on a single task
use crate::application::cycle_monitor::{ApplianceCycleMonitor, MonitorSnapshot};
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

pub struct MonitorRunner {
    monitor: ApplianceCycleMonitor,
    telemetry_interval: Duration,
    display_interval: Duration,
    snapshots: watch::Sender<MonitorSnapshot>,
}

impl MonitorRunner {
    pub fn new(
        monitor: ApplianceCycleMonitor,
        telemetry_interval: Duration,
        display_interval: Duration,
    ) -> (Self, watch::Receiver<MonitorSnapshot>) {
        let (snapshots, rx) = watch::channel(monitor.snapshot());
        let runner = Self {
            monitor,
            telemetry_interval,
            display_interval,
            snapshots,
        };
        (runner, rx)
    }

    /// Drive the monitor until `shutdown` resolves.
    ///
    /// Owning the monitor here means a telemetry poll and a display tick never overlap.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut telemetry = interval(self.telemetry_interval);
        telemetry.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut display = interval(self.display_interval);
        display.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Monitoring laundry: telemetry every {:?}, display every {:?}",
            self.telemetry_interval,
            self.display_interval
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = telemetry.tick() => {
                    self.monitor.on_telemetry_sample(Utc::now()).await;
                }
                _ = display.tick() => {
                    self.monitor.on_display_tick(Utc::now()).await;
                }
                _ = &mut shutdown => {
                    tracing::info!("Stopping laundry monitor in state {}", self.monitor.state());
                    break;
                }
            }

            self.snapshots.send_replace(self.monitor.snapshot());
        }
    }
}
