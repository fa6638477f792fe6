//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Delta time comes in from outside, already sampled
//! - Seeded RNG only
//! - No rendering, audio or storage dependencies

pub mod clock;
pub mod collision;
pub mod difficulty;
pub mod physics;
pub mod run;
pub mod score;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::TimeSource;
pub use collision::{aabb_overlap, any_collision};
pub use physics::{PhysicsConstants, derive_constants, integrate};
pub use run::{Countdown, CountdownDisplay, RunAction, TransitionResult};
pub use spawn::SpawnThresholds;
pub use state::{
    GameEvent, Obstacle, Player, RunPhase, RunSummary, SimulationState, Viewport, World,
};
pub use tick::{SkipReason, TickInput, TickOutcome, frame, tick};
