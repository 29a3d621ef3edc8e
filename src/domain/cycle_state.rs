// Laundry cycle state machine
use super::notification::Notification;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CycleState {
    Uninitialized,
    Off,
    Washing,
    Drying,
    StayFresh,
    Problem,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "Uninitialized",
            Self::Off => "Off",
            Self::Washing => "Washing",
            Self::Drying => "Drying",
            Self::StayFresh => "StayFresh",
            Self::Problem => "Problem",
        };
        f.write_str(name)
    }
}

/// Power thresholds and timing windows driving the state machine.
///
/// Defaults are calibrated for the washer/dryer combo; `ACTIVE` separates
/// wash agitation from the heater running during the dry phase.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CycleThresholds {
    pub off_watts: f64,
    pub stay_fresh_watts: f64,
    pub active_watts: f64,
    pub wash_debounce_secs: i64,
    pub problem_timeout_secs: i64,
    pub estimated_cycle_secs: i64,
    pub display_window_minutes: i64,
}

impl Default for CycleThresholds {
    fn default() -> Self {
        Self {
            off_watts: 3.0,
            stay_fresh_watts: 20.0,
            active_watts: 1200.0,
            wash_debounce_secs: 4 * 60,
            problem_timeout_secs: 24 * 60 * 60,
            estimated_cycle_secs: 5 * 60 * 60 + 30 * 60,
            display_window_minutes: 1200,
        }
    }
}

impl CycleThresholds {
    pub fn wash_debounce(&self) -> Duration {
        Duration::seconds(self.wash_debounce_secs)
    }

    pub fn problem_timeout(&self) -> Duration {
        Duration::seconds(self.problem_timeout_secs)
    }

    pub fn estimated_cycle(&self) -> Duration {
        Duration::seconds(self.estimated_cycle_secs)
    }

    pub fn display_window(&self) -> Duration {
        Duration::minutes(self.display_window_minutes)
    }
}

/// Everything the transition function looks at for one smoothed sample.
#[derive(Debug, Clone, Copy)]
pub struct TransitionInput {
    pub state: CycleState,
    pub mean: f64,
    pub buffer_full: bool,
    /// `None` stands for "no cycle running" (never reached by the clock).
    pub started_at: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEffect {
    Notify(Notification),
    ProblemTimedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub previous: CycleState,
    pub next: CycleState,
    pub started_at: Option<DateTime<Utc>>,
    pub effects: Vec<CycleEffect>,
}

impl Transition {
    fn stay(input: &TransitionInput) -> Self {
        Self {
            previous: input.state,
            next: input.state,
            started_at: input.started_at,
            effects: Vec::new(),
        }
    }

    fn enter(input: &TransitionInput, next: CycleState, started_at: Option<DateTime<Utc>>) -> Self {
        let effects = Notification::for_transition(input.state, next)
            .map(CycleEffect::Notify)
            .into_iter()
            .collect();

        Self {
            previous: input.state,
            next,
            started_at,
            effects,
        }
    }

    fn with_effect(mut self, effect: CycleEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn changed(&self) -> bool {
        self.previous != self.next
    }
}

/// Apply one smoothed sample to the current state.
///
/// Guards are checked top to bottom within each state; the first match wins.
pub fn transition(input: &TransitionInput, thresholds: &CycleThresholds) -> Transition {
    let mean = input.mean;
    let now = input.now;
    let keep = input.started_at;

    match input.state {
        CycleState::Uninitialized => {
            if !input.buffer_full {
                Transition::stay(input)
            } else if mean <= thresholds.off_watts {
                Transition::enter(input, CycleState::Off, keep)
            } else if mean <= thresholds.stay_fresh_watts {
                Transition::enter(input, CycleState::StayFresh, Some(now))
            } else if mean <= thresholds.active_watts {
                Transition::enter(input, CycleState::Washing, Some(now))
            } else {
                Transition::enter(input, CycleState::Drying, Some(now))
            }
        }
        CycleState::Off => {
            if mean > thresholds.off_watts {
                Transition::enter(input, CycleState::Washing, Some(now))
            } else {
                Transition::stay(input)
            }
        }
        CycleState::Washing => {
            let debouncing = keep.is_some_and(|started| now < started + thresholds.wash_debounce());
            if debouncing {
                Transition::stay(input)
            } else if mean >= thresholds.active_watts {
                Transition::enter(input, CycleState::Drying, keep)
            } else if mean < thresholds.off_watts {
                Transition::enter(input, CycleState::Problem, keep)
            } else {
                Transition::stay(input)
            }
        }
        CycleState::Drying => {
            if mean < thresholds.stay_fresh_watts {
                Transition::enter(input, CycleState::StayFresh, keep)
            } else {
                Transition::stay(input)
            }
        }
        CycleState::StayFresh => {
            if mean < thresholds.off_watts {
                Transition::enter(input, CycleState::Off, None)
            } else {
                Transition::stay(input)
            }
        }
        CycleState::Problem => {
            let timed_out = keep.is_some_and(|started| now > started + thresholds.problem_timeout());
            if mean > thresholds.off_watts {
                Transition::enter(input, CycleState::Washing, keep)
            } else if timed_out {
                Transition::enter(input, CycleState::Off, keep).with_effect(CycleEffect::ProblemTimedOut)
            } else {
                Transition::stay(input)
            }
        }
    }
}
