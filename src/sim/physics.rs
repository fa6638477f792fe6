//! Vertical physics for the runner
//!
//! Gravity and jump impulse scale with horizontal speed so that descents get
//! snappier as the run speeds up while peak jump height stays roughly constant
//! (height ∝ impulse² / gravity).

use super::state::Player;
use crate::config::Tuning;

/// Gravity bounds as multiples of base gravity
const MIN_GRAVITY_SCALE: f32 = 0.9;
const MAX_GRAVITY_SCALE: f32 = 2.5;
/// Jump impulse bounds as multiples of base impulse
const MIN_JUMP_SCALE: f32 = 0.9;
const MAX_JUMP_SCALE: f32 = 1.6;

/// Speed-derived physics constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConstants {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Initial vertical velocity of a jump (px/s, negative is up)
    pub jump_impulse: f32,
}

/// Compute gravity and jump impulse for a speed. Pure in its inputs.
pub fn derive_constants(speed: f32, reference_speed: f32, tuning: &Tuning) -> PhysicsConstants {
    let base_gravity = tuning.base_gravity;
    let speed_factor = speed / reference_speed;

    let gravity = (base_gravity * speed_factor * tuning.speed_gravity_factor).clamp(
        base_gravity * MIN_GRAVITY_SCALE,
        base_gravity * MAX_GRAVITY_SCALE,
    );
    let jump_scale = (gravity / base_gravity)
        .sqrt()
        .clamp(MIN_JUMP_SCALE, MAX_JUMP_SCALE);

    PhysicsConstants {
        gravity,
        jump_impulse: tuning.base_jump_impulse * jump_scale,
    }
}

/// Advance the player by `dt` seconds. `dt` must already be clamped.
///
/// Returns true if a jump started this step.
pub fn integrate(
    player: &mut Player,
    dt: f32,
    constants: PhysicsConstants,
    ground_y: f32,
    jump_requested: bool,
) -> bool {
    let jumped = jump_requested && player.grounded;
    if jumped {
        player.vel_y = constants.jump_impulse;
        player.grounded = false;
    }

    player.pos.y += player.vel_y * dt;

    // Resting exactly on the ground counts as landed
    if player.pos.y + player.size.y >= ground_y {
        player.pos.y = ground_y - player.size.y;
        player.vel_y = 0.0;
        player.grounded = true;
    } else {
        player.vel_y += constants.gravity * dt;
        player.grounded = false;
    }

    jumped
}
