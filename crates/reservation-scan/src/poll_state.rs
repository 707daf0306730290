/// What the previous poll observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollState {
    /// No poll has completed yet in this session
    #[default]
    Unknown,
    /// The last poll returned at least one scheduled day
    Available,
    /// The last poll returned no scheduled days
    Unavailable,
}

/// Change observed between two consecutive polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First poll of the session found availability
    FirstAvailability,
    /// First poll of the session found nothing
    FirstPollNone,
    /// Nothing before, something now
    Appeared,
    /// Something before, something now
    Continues,
    /// Something before, nothing now
    Disappeared,
    /// Nothing before, nothing now
    NoChange,
}

impl Transition {
    /// Whether the current poll found availability.
    ///
    /// True for the first-availability, appeared and continues transitions;
    /// those are the ones handed to the notifier.
    pub fn has_availability(self) -> bool {
        matches!(
            self,
            Transition::FirstAvailability | Transition::Appeared | Transition::Continues
        )
    }
}

/// Compute the next state and the transition for a poll result.
///
/// `current` is whether the poll returned any scheduled day. The returned
/// state always reflects `current`, whether or not a notification follows.
pub fn transition(prior: PollState, current: bool) -> (PollState, Transition) {
    let next = if current {
        PollState::Available
    } else {
        PollState::Unavailable
    };

    let transition = match (prior, current) {
        (PollState::Unknown, true) => Transition::FirstAvailability,
        (PollState::Unknown, false) => Transition::FirstPollNone,
        (PollState::Unavailable, true) => Transition::Appeared,
        (PollState::Available, true) => Transition::Continues,
        (PollState::Available, false) => Transition::Disappeared,
        (PollState::Unavailable, false) => Transition::NoChange,
    };

    (next, transition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        let cases = [
            (PollState::Unknown, true, PollState::Available, Transition::FirstAvailability),
            (PollState::Unknown, false, PollState::Unavailable, Transition::FirstPollNone),
            (PollState::Unavailable, true, PollState::Available, Transition::Appeared),
            (PollState::Available, true, PollState::Available, Transition::Continues),
            (PollState::Available, false, PollState::Unavailable, Transition::Disappeared),
            (PollState::Unavailable, false, PollState::Unavailable, Transition::NoChange),
        ];

        for (prior, current, expected_state, expected_transition) in cases {
            assert_eq!(
                transition(prior, current),
                (expected_state, expected_transition),
                "prior={:?} current={}",
                prior,
                current
            );
        }
    }

    #[test]
    fn test_only_current_availability_is_forwarded() {
        assert!(Transition::FirstAvailability.has_availability());
        assert!(Transition::Appeared.has_availability());
        assert!(Transition::Continues.has_availability());

        assert!(!Transition::FirstPollNone.has_availability());
        assert!(!Transition::Disappeared.has_availability());
        assert!(!Transition::NoChange.has_availability());
    }

    #[test]
    fn test_unknown_only_at_session_start() {
        let mut state = PollState::default();
        assert_eq!(state, PollState::Unknown);

        for current in [false, true, true, false] {
            let (next, _) = transition(state, current);
            assert_ne!(next, PollState::Unknown);
            state = next;
        }
    }
}
