//! Obstacle spawning and scrolling
//!
//! The gap between the trailing obstacle and the spawn edge must cover both a
//! reaction window (shrinking with speed, floored) and most of a jump's air
//! time. Past that minimum a spawn is a per-tick coin flip scaled by `dt`, and
//! past the maximum it is forced.

use glam::Vec2;
use rand::Rng;

use super::state::{Obstacle, SimulationState, Viewport};
use crate::config::Tuning;

/// Frame rate the spawn chance is quoted at
const SPAWN_CHANCE_REFERENCE_HZ: f32 = 60.0;

/// Gap bounds for the current speed (px)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnThresholds {
    pub min_gap: f32,
    pub max_gap: f32,
}

/// Compute the gap bounds from speed and the current jump physics
pub fn thresholds(state: &SimulationState, tuning: &Tuning) -> SpawnThresholds {
    // Symmetric ascent/descent; good enough for spacing
    let flight_time_up = state.jump_impulse.abs() / state.gravity;
    let total_air_time = flight_time_up * 2.0;

    let speed_factor = state.speed_factor();
    let reaction_window = (tuning.reaction_window
        - tuning.reaction_window_decay * (speed_factor - 1.0))
        .max(tuning.reaction_window_floor);

    let min_gap = state.speed * reaction_window.max(total_air_time * tuning.air_time_weight);
    SpawnThresholds {
        min_gap,
        max_gap: min_gap + tuning.max_gap_extra,
    }
}

/// Distance from the trailing obstacle to the spawn edge
pub fn trailing_gap(obstacles: &[Obstacle], viewport: Viewport) -> Option<f32> {
    obstacles.last().map(|last| viewport.width - last.pos.x)
}

/// Decide whether an obstacle appears this tick
pub fn should_spawn<R: Rng>(
    obstacles: &[Obstacle],
    thresholds: SpawnThresholds,
    viewport: Viewport,
    dt: f32,
    spawn_chance: f32,
    rng: &mut R,
) -> bool {
    let Some(gap) = trailing_gap(obstacles, viewport) else {
        // Empty track: bootstrap the run
        return true;
    };

    if gap <= thresholds.min_gap {
        return false;
    }
    if gap > thresholds.max_gap {
        return true;
    }
    rng.random::<f32>() < spawn_chance * dt * SPAWN_CHANCE_REFERENCE_HZ
}

/// An obstacle standing on the ground at the right edge
pub fn make_obstacle(
    id: u32,
    viewport: Viewport,
    ground_y: f32,
    spawned_at: f32,
    tuning: &Tuning,
) -> Obstacle {
    Obstacle {
        id,
        pos: Vec2::new(viewport.width, ground_y - tuning.obstacle_height),
        size: Vec2::new(tuning.obstacle_width, tuning.obstacle_height),
        spawned_at,
    }
}

/// Move every obstacle left by `speed * dt` and drop the ones fully past the
/// left edge. Returns how many were retired.
pub fn scroll(obstacles: &mut Vec<Obstacle>, speed: f32, dt: f32) -> usize {
    let before = obstacles.len();
    for obstacle in obstacles.iter_mut() {
        obstacle.pos.x -= speed * dt;
    }
    obstacles.retain(|o| o.right() >= 0.0);
    before - obstacles.len()
}
