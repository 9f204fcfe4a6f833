//! Account lockout state machine.
//!
//! Two states, `Active` and `Blocked`, driven by login outcomes and admin
//! actions. The attempt counter and the block flag only ever change
//! together, through [`LockoutPolicy::apply`].

use remesa_shared::config::LockoutConfig;
use serde::{Deserialize, Serialize};

/// Externally visible lock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStatus {
    /// Logins are evaluated.
    Active,
    /// Every login is rejected.
    Blocked,
}

/// Something that happened to a user's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutEvent {
    /// A login presented a wrong password.
    Failure,
    /// A login presented the right password.
    Success,
    /// An administrator lifted the block.
    Unlock,
    /// An administrator imposed a block.
    Block,
}

/// Persisted lockout fields of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockoutState {
    /// Consecutive failed logins.
    pub failed_attempts: u8,
    /// Whether the user is blocked.
    pub blocked: bool,
}

impl LockoutState {
    /// Builds state from stored columns, clamping an out-of-range counter.
    #[must_use]
    pub fn from_stored(failed_attempts: i32, blocked: bool) -> Self {
        Self {
            failed_attempts: u8::try_from(failed_attempts.max(0)).unwrap_or(u8::MAX),
            blocked,
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> LockStatus {
        if self.blocked {
            LockStatus::Blocked
        } else {
            LockStatus::Active
        }
    }

    /// Returns true if logins are rejected.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// Result of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutTransition {
    /// State before the event.
    pub previous: LockoutState,
    /// State after the event.
    pub current: LockoutState,
}

impl LockoutTransition {
    /// Returns true if this event moved the user from active to blocked.
    #[must_use]
    pub const fn became_blocked(&self) -> bool {
        !self.previous.blocked && self.current.blocked
    }

    /// Returns true if this event lifted a block.
    #[must_use]
    pub const fn became_active(&self) -> bool {
        self.previous.blocked && !self.current.blocked
    }

    /// Returns true if the state changed at all.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Threshold-driven lockout rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_failed_attempts: u8,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

impl From<&LockoutConfig> for LockoutPolicy {
    fn from(config: &LockoutConfig) -> Self {
        Self::new(config.max_failed_attempts)
    }
}

impl LockoutPolicy {
    /// Creates a policy blocking after `max_failed_attempts` failures (at least one).
    #[must_use]
    pub fn new(max_failed_attempts: u8) -> Self {
        Self {
            max_failed_attempts: max_failed_attempts.max(1),
        }
    }

    /// The failure count that blocks a user, also the saturation value.
    #[must_use]
    pub const fn max_failed_attempts(&self) -> u8 {
        self.max_failed_attempts
    }

    /// Applies one event.
    ///
    /// - `Failure` while active increments the counter, saturating at the
    ///   threshold, and blocks on reaching it. While blocked it is a no-op.
    /// - `Success` while active resets the counter. While blocked it is a no-op.
    /// - `Unlock` always yields active with a zero counter.
    /// - `Block` always yields blocked with the counter at the threshold.
    #[must_use]
    pub fn apply(&self, state: LockoutState, event: LockoutEvent) -> LockoutTransition {
        let max = self.max_failed_attempts;
        let current = match event {
            LockoutEvent::Failure if !state.blocked => {
                let failed_attempts = state.failed_attempts.saturating_add(1).min(max);
                LockoutState {
                    failed_attempts,
                    blocked: failed_attempts >= max,
                }
            }
            LockoutEvent::Success if !state.blocked => LockoutState::default(),
            LockoutEvent::Failure | LockoutEvent::Success => state,
            LockoutEvent::Unlock => LockoutState::default(),
            LockoutEvent::Block => LockoutState {
                failed_attempts: max,
                blocked: true,
            },
        };

        LockoutTransition {
            previous: state,
            current,
        }
    }
}
