// Display text derived from the cycle state and countdown
use super::cycle_state::{CycleState, CycleThresholds};
use chrono::{DateTime, Duration, Utc};

pub const UNKNOWN: &str = "Unknown";
pub const FINISHED: &str = "Finished!";
pub const PROBLEM: &str = "PROBLEM - Check Laundry!!";

/// Time left until the predicted end of the cycle, negative once overrun.
pub fn remaining(
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    thresholds: &CycleThresholds,
) -> Option<Duration> {
    started_at.map(|started| started + thresholds.estimated_cycle() - now)
}

pub fn display_text(
    state: CycleState,
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    thresholds: &CycleThresholds,
) -> String {
    let window = thresholds.display_window();
    let remaining = match remaining(started_at, now, thresholds) {
        Some(left) if left.abs() <= window => left,
        _ => return UNKNOWN.to_string(),
    };

    match state {
        CycleState::Uninitialized => UNKNOWN.to_string(),
        CycleState::Problem => PROBLEM.to_string(),
        CycleState::StayFresh | CycleState::Off => FINISHED.to_string(),
        CycleState::Washing => format!("Washing: {}", format_countdown(remaining)),
        CycleState::Drying => format!("Drying: {}", format_countdown(remaining)),
    }
}

/// Format as `{H}h {MM}m {SS}s`, with a leading `-` when negative.
fn format_countdown(remaining: Duration) -> String {
    let total = remaining.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    format!("{}{}h {:02}m {:02}s", sign, hours, minutes, seconds)
}
