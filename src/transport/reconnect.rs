//! Reconnection backoff state.
//!
//! Holds the attempt counter and computes linear-backoff delays
//! (`delay = base × attempt`) up to a fixed ceiling. The state is a
//! plain value that can be inspected and reset deterministically; the
//! supervising task in the wallet client drives it.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// ReconnectPhase
// ============================================================================

/// Where the supervisor currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPhase {
    /// No reconnection pending.
    #[default]
    Idle,
    /// A delay timer is armed for the next attempt.
    Scheduled,
    /// A connect attempt is running.
    Attempting,
}

// ============================================================================
// ReconnectState
// ============================================================================

/// Attempt counter and backoff schedule for automatic reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectState {
    /// Fixed delay unit multiplied by the attempt number.
    base_delay: Duration,
    /// Attempts after which reconnection is abandoned.
    max_attempts: u32,
    /// Attempts made since the last successful open.
    attempts: u32,
    /// Current supervisor phase.
    phase: ReconnectPhase,
}

impl ReconnectState {
    /// Creates a fresh state with the given policy.
    #[must_use]
    pub const fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
            attempts: 0,
            phase: ReconnectPhase::Idle,
        }
    }

    /// Schedules the next attempt, returning its delay.
    ///
    /// Returns `None` once the ceiling is reached; the connection then
    /// stays down until a caller explicitly reconnects.
    pub fn schedule(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            self.phase = ReconnectPhase::Idle;
            return None;
        }
        self.attempts += 1;
        self.phase = ReconnectPhase::Scheduled;
        Some(self.base_delay * self.attempts)
    }

    /// Marks the scheduled attempt as running.
    pub fn begin_attempt(&mut self) {
        self.phase = ReconnectPhase::Attempting;
    }

    /// Resets the counter after a successful open or a manual close.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.phase = ReconnectPhase::Idle;
    }

    /// Abandons scheduled and future attempts until the next reset.
    ///
    /// Exhausts the attempt budget and leaves phase `Idle`, so a
    /// supervisor already sleeping toward an armed attempt finds it
    /// disarmed when it wakes, and later `schedule()` calls yield
    /// nothing.
    pub fn cancel(&mut self) {
        self.attempts = self.max_attempts;
        self.phase = ReconnectPhase::Idle;
    }

    /// Returns the attempts made since the last successful open.
    #[inline]
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the current supervisor phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> ReconnectPhase {
        self.phase
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_increase_linearly() {
        let mut state = ReconnectState::new(Duration::from_secs(1), 5);

        let delays: Vec<_> = std::iter::from_fn(|| state.schedule()).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
                Duration::from_secs(4),
                Duration::from_secs(5),
            ]
        );
    }

    #[test]
    fn test_ceiling_stops_scheduling() {
        let mut state = ReconnectState::new(Duration::from_millis(10), 2);
        assert!(state.schedule().is_some());
        assert!(state.schedule().is_some());
        assert!(state.schedule().is_none());
        assert!(state.schedule().is_none());
        assert_eq!(state.phase(), ReconnectPhase::Idle);
    }

    #[test]
    fn test_reset_restores_full_budget() {
        let mut state = ReconnectState::new(Duration::from_secs(1), 3);
        state.schedule();
        state.schedule();
        assert_eq!(state.attempts(), 2);

        state.reset();
        assert_eq!(state.attempts(), 0);
        assert_eq!(state.phase(), ReconnectPhase::Idle);
        assert_eq!(state.schedule(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_cancel_exhausts_budget_until_reset() {
        let mut state = ReconnectState::new(Duration::from_secs(1), 3);
        state.schedule();
        state.cancel();

        assert!(state.schedule().is_none());
        state.reset();
        assert!(state.schedule().is_some());
    }

    #[test]
    fn test_cancel_disarms_scheduled_attempt() {
        let mut state = ReconnectState::new(Duration::from_secs(1), 3);
        state.schedule();
        assert_eq!(state.phase(), ReconnectPhase::Scheduled);

        state.cancel();
        assert_eq!(state.phase(), ReconnectPhase::Idle);
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = ReconnectState::new(Duration::from_secs(1), 3);
        assert_eq!(state.phase(), ReconnectPhase::Idle);

        state.schedule();
        assert_eq!(state.phase(), ReconnectPhase::Scheduled);

        state.begin_attempt();
        assert_eq!(state.phase(), ReconnectPhase::Attempting);

        state.reset();
        assert_eq!(state.phase(), ReconnectPhase::Idle);
    }
}
