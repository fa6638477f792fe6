//! Game state and core simulation types
//!
//! One owned [`World`] aggregate holds everything a run mutates, and is passed
//! explicitly to every simulation step.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::TimeSource;
use super::physics::{PhysicsConstants, derive_constants};
use super::run::Countdown;
use crate::config::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Menus; no run in progress
    Idle,
    /// Active gameplay, the only phase in which ticks execute
    Running,
    /// Frozen by the player
    Paused,
    /// Resume countdown in progress
    CountingDown,
    /// Run ended by a collision
    GameOver,
}

/// Drawable area in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner; x is placed by layout, y by physics
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity (px/s, negative is up)
    pub vel_y: f32,
    pub grounded: bool,
}

impl Player {
    pub fn new(size: Vec2) -> Self {
        Self {
            pos: Vec2::ZERO,
            size,
            vel_y: 0.0,
            grounded: false,
        }
    }

    /// Stand on the ground at the layout column for this viewport
    pub fn place(&mut self, viewport: Viewport, ground_y: f32, x_fraction: f32) {
        self.pos = Vec2::new(viewport.width * x_fraction, ground_y - self.size.y);
        self.vel_y = 0.0;
        self.grounded = true;
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// An obstacle scrolling toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Run time (s) at which it appeared
    pub spawned_at: f32,
}

impl Obstacle {
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }
}

/// Scalar state of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Horizontal speed (px/s), never below `reference_speed` during a run
    pub speed: f32,
    /// Unmultiplied base speed; the unit for every speed factor
    pub reference_speed: f32,
    pub score: f32,
    /// Derived from `speed` every tick
    pub gravity: f32,
    /// Derived from `speed` every tick
    pub jump_impulse: f32,
    /// Seconds of simulated running
    pub elapsed: f32,
}

impl SimulationState {
    /// Wide viewports start above `tuning.base_speed` and so start with a
    /// speed factor above 1
    pub fn new(start_speed: f32, tuning: &Tuning) -> Self {
        let constants = derive_constants(start_speed, tuning.base_speed, tuning);
        Self {
            speed: start_speed,
            reference_speed: tuning.base_speed,
            score: 0.0,
            gravity: constants.gravity,
            jump_impulse: constants.jump_impulse,
            elapsed: 0.0,
        }
    }

    pub fn constants(&self) -> PhysicsConstants {
        PhysicsConstants {
            gravity: self.gravity,
            jump_impulse: self.jump_impulse,
        }
    }

    /// Current speed relative to the base speed
    pub fn speed_factor(&self) -> f32 {
        self.speed / self.reference_speed
    }

    /// True if nothing has gone non-finite or out of range
    pub fn is_sane(&self) -> bool {
        self.speed.is_finite()
            && self.speed >= self.reference_speed
            && self.score.is_finite()
            && self.score >= 0.0
            && self.gravity.is_finite()
            && self.gravity > 0.0
            && self.jump_impulse.is_finite()
    }
}

/// Outcome of a finished run, handed to persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Truncated score
    pub final_score: u64,
    /// Best score known when the run started
    pub previous_best: u64,
}

impl RunSummary {
    pub fn is_new_best(&self) -> bool {
        self.final_score > self.previous_best
    }
}

/// Things that happened during a tick, for audio/HUD observers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jumped,
    ObstacleSpawned { id: u32 },
    /// Score crossed into the n-th milestone band
    Milestone(u32),
    /// Live score passed the cached best for the first time this run
    NewBest(u64),
    GameOver(RunSummary),
}

/// Complete simulation aggregate
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    pub phase: RunPhase,
    pub sim: SimulationState,
    pub player: Player,
    /// Ordered by spawn time, oldest first
    pub obstacles: Vec<Obstacle>,
    pub viewport: Viewport,
    pub clock: TimeSource,
    /// Present only while counting down
    pub countdown: Option<Countdown>,
    /// Best score known for the current player
    pub best_score: u64,
    /// Summary of the last finished run
    pub last_run: Option<RunSummary>,
    pub(crate) rng: Pcg32,
    pub(crate) last_milestone: u32,
    pub(crate) passed_best: bool,
    next_id: u32,
}

impl World {
    /// Create an idle world; `seed` drives obstacle spawning
    pub fn new(tuning: Tuning, viewport: Viewport, seed: u64) -> Self {
        let base_speed = tuning.base_speed_for(viewport);
        let sim = SimulationState::new(base_speed, &tuning);
        let mut player = Player::new(Vec2::new(tuning.player_width, tuning.player_height));
        let ground_y = viewport.height - tuning.ground_height;
        player.place(viewport, ground_y, tuning.player_x_fraction);
        let clock = TimeSource::new(tuning.max_delta_time);

        Self {
            tuning,
            phase: RunPhase::Idle,
            sim,
            player,
            obstacles: Vec::new(),
            viewport,
            clock,
            countdown: None,
            best_score: 0,
            last_run: None,
            rng: Pcg32::seed_from_u64(seed),
            last_milestone: 0,
            passed_best: false,
            next_id: 1,
        }
    }

    /// Top of the ground strip
    pub fn ground_y(&self) -> f32 {
        self.viewport.height - self.tuning.ground_height
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put every run-scoped value back to its starting constant
    pub(crate) fn reset_run(&mut self) {
        let base_speed = self.tuning.base_speed_for(self.viewport);
        self.sim = SimulationState::new(base_speed, &self.tuning);
        self.obstacles.clear();
        let ground_y = self.ground_y();
        self.player
            .place(self.viewport, ground_y, self.tuning.player_x_fraction);
        self.clock.reset();
        self.countdown = None;
        self.last_run = None;
        self.last_milestone = 0;
        self.passed_best = false;
    }

    /// Adopt a new viewport: re-lay the player column and re-seat everything on
    /// the new ground line
    pub fn resize(&mut self, viewport: Viewport) {
        let old_ground = self.ground_y();
        self.viewport = viewport;
        let ground_y = self.ground_y();

        self.player.pos.x = viewport.width * self.tuning.player_x_fraction;
        if self.player.grounded || self.player.bottom() > ground_y {
            self.player.pos.y = ground_y - self.player.size.y;
        } else {
            self.player.pos.y += ground_y - old_ground;
        }

        for obstacle in &mut self.obstacles {
            obstacle.pos.y = ground_y - obstacle.size.y;
        }
        log::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(Tuning::default(), Viewport::new(800.0, 600.0), 7)
    }

    #[test]
    fn test_new_world_is_idle_and_grounded() {
        let w = world();
        assert_eq!(w.phase, RunPhase::Idle);
        assert!(w.player.grounded);
        assert_eq!(w.player.bottom(), 550.0);
        assert_eq!(w.player.pos.x, 160.0);
        assert_eq!(w.sim.speed, 300.0);
        assert_eq!(w.sim.gravity, 1200.0 * 1.2);
    }

    #[test]
    fn test_wide_screen_starts_with_heavier_physics() {
        let mut w = World::new(Tuning::default(), Viewport::new(1280.0, 720.0), 1);
        assert!(w.start().success);
        assert!((w.sim.speed - 540.0).abs() < 1e-3);
        assert_eq!(w.sim.reference_speed, 300.0);
        assert!((w.sim.speed_factor() - 1.8).abs() < 1e-5);
        assert!((w.sim.gravity - 2592.0).abs() < 1e-2);
        let expected_jump = -650.0 * (2592.0f32 / 1200.0).sqrt();
        assert!((w.sim.jump_impulse - expected_jump).abs() < 1e-2);

        // Reaction window 1.8 - 0.4 * 0.8 = 1.48 s outweighs the weighted air time
        let t = crate::sim::spawn::thresholds(&w.sim, &w.tuning);
        assert!((t.min_gap - 799.2).abs() < 0.1, "min gap {}", t.min_gap);
    }

    #[test]
    fn test_resize_reseats_player_and_obstacles() {
        let mut w = world();
        let id = w.next_entity_id();
        w.obstacles.push(Obstacle {
            id,
            pos: Vec2::new(500.0, 450.0),
            size: Vec2::new(30.0, 100.0),
            spawned_at: 0.0,
        });

        w.resize(Viewport::new(1000.0, 900.0));
        assert_eq!(w.player.pos.x, 200.0);
        assert_eq!(w.player.bottom(), 850.0);
        assert_eq!(w.obstacles[0].pos.y, 750.0);
        assert_eq!(w.obstacles[0].pos.x, 500.0);
    }

    #[test]
    fn test_resize_keeps_airborne_height_above_ground() {
        let mut w = world();
        w.player.grounded = false;
        w.player.pos.y = 300.0; // 250 above ground
        w.resize(Viewport::new(800.0, 700.0));
        assert_eq!(w.player.pos.y, 400.0);
        assert!(!w.player.grounded);
    }

    #[test]
    fn test_summary_new_best() {
        let s = RunSummary {
            final_score: 500,
            previous_best: 300,
        };
        assert!(s.is_new_best());
        let s = RunSummary {
            final_score: 200,
            previous_best: 300,
        };
        assert!(!s.is_new_best());
    }
}
