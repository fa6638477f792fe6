//! Speed ramp
//!
//! Speed grows linearly with survival time and has no ceiling. This is the
//! only writer of the speed-derived physics constants.

use super::physics::derive_constants;
use super::state::SimulationState;
use crate::config::Tuning;

/// Grow speed by `dt` seconds' worth and re-derive gravity and jump impulse
pub fn advance(state: &mut SimulationState, dt: f32, tuning: &Tuning) {
    state.speed += tuning.speed_growth_rate * dt;

    let constants = derive_constants(state.speed, state.reference_speed, tuning);
    state.gravity = constants.gravity;
    state.jump_impulse = constants.jump_impulse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_grows_linearly() {
        let tuning = Tuning::default();
        let mut state = SimulationState::new(300.0, &tuning);
        for _ in 0..60 {
            advance(&mut state, 1.0 / 60.0, &tuning);
        }
        assert!((state.speed - 307.0).abs() < 0.01);
    }

    #[test]
    fn test_constants_follow_speed() {
        let tuning = Tuning::default();
        let mut state = SimulationState::new(300.0, &tuning);
        advance(&mut state, 10.0, &tuning);

        let expected = derive_constants(370.0, 300.0, &tuning);
        assert_eq!(state.gravity, expected.gravity);
        assert_eq!(state.jump_impulse, expected.jump_impulse);
        assert!(state.gravity > 1440.0);
    }

    #[test]
    fn test_zero_dt_keeps_speed() {
        let tuning = Tuning::default();
        let mut state = SimulationState::new(300.0, &tuning);
        let before = state;
        advance(&mut state, 0.0, &tuning);
        assert_eq!(state, before);
    }
}
