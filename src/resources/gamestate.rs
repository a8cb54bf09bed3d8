//! Per-session course state.
//!
//! Three values drive the course: the applied club force (clamped once per
//! step), the last known trigger status (written only by the event sink) and
//! the win latch, which never goes back to false within a session.

use bevy_ecs::prelude::Resource;

const DEFAULT_FORCE_LIMIT: f32 = 8.0;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameState {
    applied_force: f32,
    force_limit: f32,
    trigger_active: bool,
    has_won: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DEFAULT_FORCE_LIMIT)
    }
}

impl GameState {
    /// Create a state whose applied force is bounded by `±force_limit`.
    /// A limit that is not finite falls back to the default of 8.
    pub fn new(force_limit: f32) -> Self {
        let force_limit = if force_limit.is_finite() {
            force_limit.abs()
        } else {
            DEFAULT_FORCE_LIMIT
        };
        GameState {
            applied_force: 0.0,
            force_limit,
            trigger_active: false,
            has_won: false,
        }
    }

    pub fn applied_force(&self) -> f32 {
        self.applied_force
    }

    /// Set the raw force from input. It is brought back into range by the
    /// next [`clamp_applied_force`](Self::clamp_applied_force).
    pub fn set_applied_force(&mut self, force: f32) {
        self.applied_force = force;
    }

    pub fn force_limit(&self) -> f32 {
        self.force_limit
    }

    /// Clamp the applied force to `[-limit, limit]` and return it. A NaN
    /// force resets to zero.
    pub fn clamp_applied_force(&mut self) -> f32 {
        if self.applied_force.is_nan() {
            self.applied_force = 0.0;
        }
        self.applied_force = self.applied_force.clamp(-self.force_limit, self.force_limit);
        self.applied_force
    }

    pub fn trigger_active(&self) -> bool {
        self.trigger_active
    }

    /// Record the latest trigger status. Only the simulation event sink calls
    /// this.
    pub fn set_trigger_active(&mut self, active: bool) {
        self.trigger_active = active;
    }

    pub fn has_won(&self) -> bool {
        self.has_won
    }

    /// Latch the win. Returns true only on the call that flips it.
    pub fn latch_win(&mut self) -> bool {
        let newly = !self.has_won;
        self.has_won = true;
        newly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_table() {
        let cases = [
            (-100.0, -8.0),
            (-8.0, -8.0),
            (-7.999, -7.999),
            (0.0, 0.0),
            (7.999, 7.999),
            (8.0, 8.0),
            (100.0, 8.0),
        ];
        let mut state = GameState::default();
        for (input, expected) in cases {
            state.set_applied_force(input);
            assert_eq!(state.clamp_applied_force(), expected, "input {}", input);
            assert_eq!(state.applied_force(), expected);
        }
    }

    #[test]
    fn test_negative_limit_is_normalised() {
        let mut state = GameState::new(-2.0);
        state.set_applied_force(5.0);
        assert_eq!(state.clamp_applied_force(), 2.0);
    }

    #[test]
    fn test_non_finite_inputs_never_escape_the_range() {
        let mut state = GameState::new(f32::NAN);
        assert_eq!(state.force_limit(), DEFAULT_FORCE_LIMIT);
        state.set_applied_force(f32::NAN);
        assert_eq!(state.clamp_applied_force(), 0.0);
        state.set_applied_force(f32::NEG_INFINITY);
        assert_eq!(state.clamp_applied_force(), -DEFAULT_FORCE_LIMIT);

        let state = GameState::new(f32::INFINITY);
        assert_eq!(state.force_limit(), DEFAULT_FORCE_LIMIT);
    }

    #[test]
    fn test_win_latches_once() {
        let mut state = GameState::default();
        assert!(!state.has_won());
        assert!(state.latch_win());
        assert!(!state.latch_win());
        state.set_trigger_active(false);
        assert!(state.has_won());
    }
}
