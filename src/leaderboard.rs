//! Territory standings
//!
//! Leaderboard rows built from a snapshot, plus the player's personal best
//! which survives round resets.

use serde::{Deserialize, Serialize};

use crate::sim::state::{AgentId, WorldSnapshot};

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: AgentId,
    pub name: String,
    pub color: String,
    /// Display percentage (victory threshold shows as 100)
    pub percentage: f32,
    pub is_player: bool,
    pub kill_count: u32,
    pub alive: bool,
}

/// Scale an owned fraction so the victory threshold reads as 100%
pub fn display_percentage(area_fraction: f32, victory_fraction: f32) -> f32 {
    if !(victory_fraction > 0.0 && area_fraction.is_finite()) {
        return 0.0;
    }
    (area_fraction / victory_fraction * 100.0).clamp(0.0, 100.0)
}

/// Rows sorted by percentage, highest first. Ties keep id order.
pub fn build_leaderboard(snapshot: &WorldSnapshot, victory_fraction: f32) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<LeaderboardEntry> = snapshot
        .agents
        .iter()
        .map(|a| LeaderboardEntry {
            id: a.id,
            name: a.name.clone(),
            color: a.color.clone(),
            percentage: display_percentage(a.area_fraction, victory_fraction),
            is_player: a.id == AgentId::Player,
            kill_count: a.kill_count,
            alive: a.alive,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.id.cmp(&b.id))
    });
    rows
}

/// Best display percentage across rounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalBest {
    best: f32,
    rounds: u32,
}

impl PersonalBest {
    pub fn best(&self) -> f32 {
        self.best
    }

    /// Rounds recorded so far
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Record a finished round. Returns true on a new record.
    pub fn update(&mut self, percentage: f32) -> bool {
        self.rounds += 1;
        if percentage.is_finite() && percentage > self.best {
            log::info!("New personal best: {:.1}%", percentage);
            self.best = percentage;
            return true;
        }
        false
    }
}
