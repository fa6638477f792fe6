//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`], so alternative balances are a
//! JSON override away instead of a fork of the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::Viewport;

/// Errors raised while loading a tuning override
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed tuning document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value `{field}` must be positive and finite (got {value})")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Gameplay constants, in pixels and seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Horizontal speed at run start on small screens (px/s)
    pub base_speed: f32,
    /// Speed multiplier applied on laptop-sized viewports
    pub wide_screen_speed_multiplier: f32,
    /// Minimum viewport width counted as wide
    pub wide_screen_min_width: f32,
    /// Minimum viewport height counted as wide
    pub wide_screen_min_height: f32,
    /// Speed gained per second of survival (px/s²)
    pub speed_growth_rate: f32,

    /// Gravity at reference speed (px/s²)
    pub base_gravity: f32,
    /// Jump impulse at reference speed (px/s, negative is up)
    pub base_jump_impulse: f32,
    /// How strongly speed feeds into gravity
    pub speed_gravity_factor: f32,

    /// Height of the ground strip at the bottom of the viewport
    pub ground_height: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Player x as a fraction of viewport width
    pub player_x_fraction: f32,
    pub obstacle_width: f32,
    pub obstacle_height: f32,

    /// Points per second survived
    pub score_rate: f32,
    /// Points between cosmetic milestones
    pub milestone_interval: f32,

    /// Spawn chance per 1/60 s once past the minimum gap
    pub spawn_chance: f32,
    /// Extra distance past the minimum gap before a spawn is forced
    pub max_gap_extra: f32,
    /// Reaction window at reference speed (s)
    pub reaction_window: f32,
    /// Reaction window lost per unit of speed factor above 1 (s)
    pub reaction_window_decay: f32,
    /// Reaction window floor (s)
    pub reaction_window_floor: f32,
    /// Share of the estimated air time the gap must cover
    pub air_time_weight: f32,

    /// Largest delta time fed to a tick (s)
    pub max_delta_time: f32,
    /// First number shown by the resume countdown
    pub countdown_from: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 300.0,
            wide_screen_speed_multiplier: 1.8,
            wide_screen_min_width: 1024.0,
            wide_screen_min_height: 600.0,
            speed_growth_rate: 7.0,

            base_gravity: 1200.0,
            base_jump_impulse: -650.0,
            speed_gravity_factor: 1.2,

            ground_height: 50.0,
            player_width: 120.0,
            player_height: 150.0,
            player_x_fraction: 0.2,
            obstacle_width: 30.0,
            obstacle_height: 100.0,

            score_rate: 10.0,
            milestone_interval: 400.0,

            spawn_chance: 0.02,
            max_gap_extra: 500.0,
            reaction_window: 1.8,
            reaction_window_decay: 0.4,
            reaction_window_floor: 1.2,
            air_time_weight: 0.8,

            max_delta_time: 1.0 / 30.0,
            countdown_from: 3,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would make the simulation meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("base_speed", self.base_speed),
            ("wide_screen_speed_multiplier", self.wide_screen_speed_multiplier),
            ("base_gravity", self.base_gravity),
            ("speed_gravity_factor", self.speed_gravity_factor),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("obstacle_width", self.obstacle_width),
            ("obstacle_height", self.obstacle_height),
            ("score_rate", self.score_rate),
            ("milestone_interval", self.milestone_interval),
            ("reaction_window_floor", self.reaction_window_floor),
            ("max_delta_time", self.max_delta_time),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        let non_negative = [
            ("speed_growth_rate", self.speed_growth_rate),
            ("ground_height", self.ground_height),
            ("spawn_chance", self.spawn_chance),
            ("max_gap_extra", self.max_gap_extra),
            ("reaction_window", self.reaction_window),
            ("reaction_window_decay", self.reaction_window_decay),
            ("air_time_weight", self.air_time_weight),
            ("player_x_fraction", self.player_x_fraction),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }

        // Jumps go up, which is negative y
        if !self.base_jump_impulse.is_finite() || self.base_jump_impulse >= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "base_jump_impulse",
                value: self.base_jump_impulse,
            });
        }

        Ok(())
    }

    /// Starting speed for a run on the given viewport
    pub fn base_speed_for(&self, viewport: Viewport) -> f32 {
        if viewport.width >= self.wide_screen_min_width
            && viewport.height >= self.wide_screen_min_height
        {
            self.base_speed * self.wide_screen_speed_multiplier
        } else {
            self.base_speed
        }
    }
}
