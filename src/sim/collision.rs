//! Collision detection
//!
//! Everything in the runner is an axis-aligned box; touching edges do not
//! count as a hit.

use glam::Vec2;

use super::state::{Obstacle, Player};

/// Check overlap between two boxes given by top-left corner and size
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

/// First obstacle the player overlaps, if any
pub fn first_hit<'a>(player: &Player, obstacles: &'a [Obstacle]) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .find(|o| aabb_overlap(player.pos, player.size, o.pos, o.size))
}

/// Check whether the player overlaps any obstacle
pub fn any_collision(player: &Player, obstacles: &[Obstacle]) -> bool {
    first_hit(player, obstacles).is_some()
}
