//! Global leaderboard
//!
//! A read-only view over the profile store's top scores.

use crate::profile::{ProfileStore, UserProfile};

/// Number of entries shown on the leaderboard
pub const LEADERBOARD_SIZE: usize = 50;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// 1-indexed
    pub rank: usize,
    pub user_id: String,
    pub display_name: String,
    pub score: u64,
}

impl LeaderboardEntry {
    /// Row text, e.g. `1. Ada (farmer1)`
    pub fn label(&self) -> String {
        format!("{}. {} ({})", self.rank, self.display_name, self.user_id)
    }
}

/// What the leaderboard panel should show
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Leaderboard {
    #[default]
    Loading,
    Ready(Vec<LeaderboardEntry>),
    /// Store reachable but nobody has played yet
    Empty,
    /// Read failed; the user can retry
    Failed(String),
}

impl Leaderboard {
    /// Build from profiles already ordered by descending score
    pub fn from_ranked(profiles: Vec<UserProfile>) -> Self {
        if profiles.is_empty() {
            return Leaderboard::Empty;
        }
        let entries = profiles
            .into_iter()
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i + 1,
                user_id: p.id,
                display_name: p.display_name,
                score: p.high_score,
            })
            .collect();
        Leaderboard::Ready(entries)
    }

    /// Read the top scores from the store
    pub fn fetch<S: ProfileStore>(store: &S) -> Self {
        match store.list_top_scores(LEADERBOARD_SIZE) {
            Ok(profiles) => {
                log::info!("Loaded {} leaderboard entries", profiles.len());
                Self::from_ranked(profiles)
            }
            Err(e) => {
                log::error!("Error loading leaderboard: {e}");
                Leaderboard::Failed(e.to_string())
            }
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        match self {
            Leaderboard::Ready(entries) => entries,
            _ => &[],
        }
    }

    /// Position of a user on the board, if listed
    pub fn rank_of(&self, user_id: &str) -> Option<usize> {
        self.entries()
            .iter()
            .find(|e| e.user_id == user_id)
            .map(|e| e.rank)
    }
}
