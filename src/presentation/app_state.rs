// Application state for HTTP handlers
use crate::application::cycle_monitor::MonitorSnapshot;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: watch::Receiver<MonitorSnapshot>,
}
