//! Rural Runner - an endless runner for the browser
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, difficulty, spawning, collisions, run phases)
//! - `config`: Data-driven game balance
//! - `render`: Pure draw lists plus a Canvas2D executor on wasm
//! - `audio`: Music selection and procedural sound effects
//! - `profile`: Player accounts and high-score persistence
//! - `highscores`: Global leaderboard view
//! - `settings`: Player preferences
//! - `platform`: Fullscreen and orientation handling in the browser

pub mod audio;
pub mod config;
pub mod highscores;
pub mod platform;
pub mod profile;
pub mod render;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, Tuning};
pub use highscores::{Leaderboard, LeaderboardEntry};
pub use profile::{AuthError, HighScoreWrite, MemoryStore, ProfileStore, Session, StoreError, UserProfile};
pub use settings::Settings;
