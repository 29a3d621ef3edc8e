// HTTP request handlers
use crate::application::cycle_monitor::MonitorSnapshot;
use crate::presentation::app_state::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest view of the laundry cycle as published by the monitor
pub async fn cycle_status(State(state): State<Arc<AppState>>) -> Json<MonitorSnapshot> {
    Json(state.snapshots.borrow().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle_state::CycleState;
    use tokio::sync::watch;

    #[tokio::test]
    async fn test_cycle_status_reads_latest_snapshot() {
        let (tx, rx) = watch::channel(MonitorSnapshot::default());
        let state = Arc::new(AppState { snapshots: rx });

        tx.send_replace(MonitorSnapshot {
            state: CycleState::Drying,
            buffered_samples: 10,
            mean_watts: Some(1480.0),
            ..MonitorSnapshot::default()
        });

        let Json(snapshot) = cycle_status(State(state)).await;
        assert_eq!(snapshot.state, CycleState::Drying);
        assert_eq!(snapshot.mean_watts, Some(1480.0));

        let body = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(body["state"], "Drying");
        assert_eq!(body["buffered_samples"], 10);
    }
}
