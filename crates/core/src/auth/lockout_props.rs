//! Property-based tests for the lockout state machine.

use proptest::prelude::*;

use super::lockout::{LockoutEvent, LockoutPolicy, LockoutState};

fn event() -> impl Strategy<Value = LockoutEvent> {
    prop_oneof![
        3 => Just(LockoutEvent::Failure),
        2 => Just(LockoutEvent::Success),
        1 => Just(LockoutEvent::Unlock),
        1 => Just(LockoutEvent::Block),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The counter never exceeds the threshold, and reaching it always means blocked.
    #[test]
    fn prop_counter_saturates_and_implies_block(
        threshold in 1u8..10,
        events in prop::collection::vec(event(), 0..40),
    ) {
        let policy = LockoutPolicy::new(threshold);
        let mut state = LockoutState::default();

        for e in events {
            state = policy.apply(state, e).current;
            prop_assert!(state.failed_attempts <= threshold);
            prop_assert_eq!(state.failed_attempts == threshold, state.blocked);
        }
    }

    /// While blocked, login outcomes change nothing.
    #[test]
    fn prop_blocked_state_absorbs_logins(
        logins in prop::collection::vec(prop_oneof![Just(LockoutEvent::Failure), Just(LockoutEvent::Success)], 1..20),
    ) {
        let policy = LockoutPolicy::default();
        let blocked = policy.apply(LockoutState::default(), LockoutEvent::Block).current;

        let mut state = blocked;
        for e in logins {
            state = policy.apply(state, e).current;
        }
        prop_assert_eq!(state, blocked);
    }

    /// Unlock resets from any reachable state.
    #[test]
    fn prop_unlock_always_resets(events in prop::collection::vec(event(), 0..20)) {
        let policy = LockoutPolicy::default();
        let state = events
            .into_iter()
            .fold(LockoutState::default(), |s, e| policy.apply(s, e).current);

        prop_assert_eq!(policy.apply(state, LockoutEvent::Unlock).current, LockoutState::default());
    }

    /// Exactly `threshold` consecutive failures from a clean state block the user,
    /// and one fewer does not.
    #[test]
    fn prop_threshold_failures_block(threshold in 1u8..10) {
        let policy = LockoutPolicy::new(threshold);
        let mut state = LockoutState::default();

        for _ in 1..threshold {
            state = policy.apply(state, LockoutEvent::Failure).current;
        }
        prop_assert!(!state.blocked);

        let transition = policy.apply(state, LockoutEvent::Failure);
        prop_assert!(transition.became_blocked());
    }
}
