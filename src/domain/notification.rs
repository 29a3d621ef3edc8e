// Notifications raised on cycle transitions
use super::cycle_state::CycleState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    LaundryFinished,
    ProblemDetected,
    ProblemResolved,
}

impl Notification {
    /// The notification owed for entering `next` from `previous`, if any.
    pub fn for_transition(previous: CycleState, next: CycleState) -> Option<Self> {
        match (previous, next) {
            (CycleState::Drying, CycleState::StayFresh) => Some(Self::LaundryFinished),
            (CycleState::Drying, CycleState::Off) => Some(Self::LaundryFinished),
            (CycleState::Problem, CycleState::Off) => Some(Self::ProblemResolved),
            (CycleState::Problem, CycleState::Problem) => None,
            (_, CycleState::Problem) => Some(Self::ProblemDetected),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::LaundryFinished => "Laundry Finished",
            Self::ProblemDetected => "Laundry Problem",
            Self::ProblemResolved => "Laundry Problem Resolved",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Self::LaundryFinished => "The laundry is done and ready to be unloaded.",
            Self::ProblemDetected => "The washer stopped drawing power mid-cycle. Check the laundry!",
            Self::ProblemResolved => "The laundry problem has cleared.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_transition() {
        assert_eq!(
            Notification::for_transition(CycleState::Drying, CycleState::StayFresh),
            Some(Notification::LaundryFinished)
        );
        assert_eq!(
            Notification::for_transition(CycleState::Problem, CycleState::Off),
            Some(Notification::ProblemResolved)
        );
        assert_eq!(
            Notification::for_transition(CycleState::Washing, CycleState::Problem),
            Some(Notification::ProblemDetected)
        );

        assert_eq!(Notification::for_transition(CycleState::StayFresh, CycleState::Off), None);
        assert_eq!(Notification::for_transition(CycleState::Off, CycleState::Washing), None);
        assert_eq!(Notification::for_transition(CycleState::Problem, CycleState::Washing), None);
        assert_eq!(Notification::for_transition(CycleState::Problem, CycleState::Problem), None);
    }
}
