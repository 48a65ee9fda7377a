//! Up/down tracking
//!
//! A host starts out assumed up, so a host that is already down when the
//! process starts reports a transition on its first failed check.

/// Classification of the last completed check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Up,
    Down,
}

impl std::fmt::Display for HostState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostState::Up => write!(f, "Up"),
            HostState::Down => write!(f, "Down"),
        }
    }
}

/// Change between two consecutive checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Up → Down
    WentDown,
    /// Down → Up
    CameUp,
}

/// Remembers whether the previous check was up
#[derive(Debug, Clone)]
pub struct StateTracker {
    previously_up: bool,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self {
            previously_up: true,
        }
    }
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of a completed check and report any transition
    pub fn record(&mut self, up: bool) -> Option<Transition> {
        let transition = match (self.previously_up, up) {
            (true, false) => Some(Transition::WentDown),
            (false, true) => Some(Transition::CameUp),
            _ => None,
        };
        self.previously_up = up;
        transition
    }

    pub fn state(&self) -> HostState {
        if self.previously_up {
            HostState::Up
        } else {
            HostState::Down
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_up() {
        assert_eq!(StateTracker::new().state(), HostState::Up);
    }

    #[test]
    fn test_first_failure_is_a_transition() {
        let mut tracker = StateTracker::new();

        assert_eq!(tracker.record(false), Some(Transition::WentDown));
        assert_eq!(tracker.state(), HostState::Down);
    }

    #[test]
    fn test_same_state_repeats_are_silent() {
        let mut tracker = StateTracker::new();

        assert_eq!(tracker.record(true), None);
        assert_eq!(tracker.record(true), None);
        tracker.record(false);
        assert_eq!(tracker.record(false), None);
    }

    #[test]
    fn test_sequence_yields_two_transitions() {
        let mut tracker = StateTracker::new();

        let transitions: Vec<Transition> = [true, true, false, false, true]
            .into_iter()
            .filter_map(|up| tracker.record(up))
            .collect();

        assert_eq!(transitions, vec![Transition::WentDown, Transition::CameUp]);
        assert_eq!(tracker.state(), HostState::Up);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(HostState::Up.to_string(), "Up");
        assert_eq!(HostState::Down.to_string(), "Down");
    }
}
