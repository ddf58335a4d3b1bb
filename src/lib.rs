//! Territory Arena - simulation core for a circular-arena conquest game
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (motion, collisions, territory merges)
//! - `settings`: Data-driven arena tuning
//! - `leaderboard`: Territory standings and personal best

pub mod leaderboard;
pub mod settings;
pub mod sim;

pub use leaderboard::{LeaderboardEntry, PersonalBest};
pub use settings::{ArenaSettings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Arena dimensions
    pub const MAP_RADIUS: f32 = 50.0;
    /// Agent footprint (edge length of the agent's cube)
    pub const AGENT_SIZE: f32 = 1.0;

    /// Movement speeds (units per second)
    pub const PLAYER_SPEED: f32 = 8.0;
    pub const BOT_SPEED: f32 = 6.0;

    /// Seconds needed to turn through 45 degrees
    pub const ROTATION_TIME: f32 = 0.2;
    /// Desired directions shorter than this keep the previous target
    pub const INPUT_DEADZONE: f32 = 0.1;
    /// Time constant for aligning the heading with the arena wall
    pub const EDGE_BLEND_TIME: f32 = 0.1;

    /// Seconds between trail samples while outside territory
    pub const TRAIL_SAMPLE_INTERVAL: f32 = 0.1;
    /// Movement below this squared distance is not a move
    pub const MOVE_EPSILON_SQ: f32 = 0.0001;

    /// Seed territory
    pub const SEED_TERRITORY_RADIUS: f32 = 5.0;
    pub const SEED_TERRITORY_SEGMENTS: usize = 128;

    /// Merge post-processing
    pub const SIMPLIFY_THRESHOLD: f32 = 0.1;
    pub const SMOOTH_ITERATIONS: usize = 2;

    /// Fraction of the disc an agent must own to win (shown as 100%)
    pub const VICTORY_FRACTION: f32 = 0.97;

    /// Bots
    pub const BOT_COUNT: usize = 5;
    pub const BOT_SPAWN_RADIUS: f32 = 30.0;
    pub const BOT_DECISION_INTERVAL: f32 = 0.2;
    pub const BOT_TURN_CHANCE: f64 = 0.02;
    pub const BOT_EDGE_LOOKAHEAD: f32 = 0.5;
    pub const BOT_EDGE_LIMIT: f32 = 48.0;

    /// Longest frame delta fed into a single tick
    pub const MAX_TICK_DT: f32 = 0.1;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed turn from `from` to `to` along the shorter arc, in (-π, π]
#[inline]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    -normalize_angle(from - to)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit heading for an angle measured from +x
#[inline]
pub fn heading_from_angle(theta: f32) -> Vec2 {
    polar_to_cartesian(1.0, theta)
}

/// Angle of a direction vector measured from +x
#[inline]
pub fn angle_of(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}
