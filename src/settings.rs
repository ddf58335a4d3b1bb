//! Arena tuning
//!
//! Every gameplay constant can be overridden from JSON; missing fields fall
//! back to the defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::bot::BotParams;
use crate::sim::merge::MergeParams;
use crate::sim::motion::MotionParams;
use crate::sim::state::AgentKind;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Arena tuning (serialized as JSON)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    // === Arena ===
    /// Disc radius
    pub map_radius: f32,
    /// Agent footprint; half of it is kept off the wall
    pub agent_size: f32,

    // === Motion ===
    pub player_speed: f32,
    pub bot_speed: f32,
    /// Seconds per 45° of turn
    pub rotation_time: f32,
    pub input_deadzone: f32,
    pub edge_blend_time: f32,

    // === Territory ===
    pub trail_sample_interval: f32,
    pub seed_territory_radius: f32,
    pub seed_territory_segments: usize,
    /// Decimation distance for merged territories
    pub simplify_threshold: f32,
    pub smooth_iterations: usize,
    /// Owned fraction of the disc that wins the round
    pub victory_fraction: f32,

    // === Bots ===
    pub bot_count: usize,
    pub bot_spawn_radius: f32,
    pub bot_decision_interval: f32,
    pub bot_turn_chance: f64,
    pub bot_edge_lookahead: f32,
    pub bot_edge_limit: f32,

    // === Timing ===
    /// Longer frame deltas are clamped to this
    pub max_tick_dt: f32,

    // === Colors ===
    pub player_color: String,
    pub palette: Vec<String>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            map_radius: MAP_RADIUS,
            agent_size: AGENT_SIZE,

            player_speed: PLAYER_SPEED,
            bot_speed: BOT_SPEED,
            rotation_time: ROTATION_TIME,
            input_deadzone: INPUT_DEADZONE,
            edge_blend_time: EDGE_BLEND_TIME,

            trail_sample_interval: TRAIL_SAMPLE_INTERVAL,
            seed_territory_radius: SEED_TERRITORY_RADIUS,
            seed_territory_segments: SEED_TERRITORY_SEGMENTS,
            simplify_threshold: SIMPLIFY_THRESHOLD,
            smooth_iterations: SMOOTH_ITERATIONS,
            victory_fraction: VICTORY_FRACTION,

            bot_count: BOT_COUNT,
            bot_spawn_radius: BOT_SPAWN_RADIUS,
            bot_decision_interval: BOT_DECISION_INTERVAL,
            bot_turn_chance: BOT_TURN_CHANCE,
            bot_edge_lookahead: BOT_EDGE_LOOKAHEAD,
            bot_edge_limit: BOT_EDGE_LIMIT,

            max_tick_dt: MAX_TICK_DT,

            player_color: "#ff0000".to_string(),
            palette: [
                "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0",
                "#f032e6", "#bcf60c", "#fabebe", "#008080", "#9a6324",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl ArenaSettings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("map_radius", self.map_radius),
            ("player_speed", self.player_speed),
            ("bot_speed", self.bot_speed),
            ("rotation_time", self.rotation_time),
            ("edge_blend_time", self.edge_blend_time),
            ("trail_sample_interval", self.trail_sample_interval),
            ("seed_territory_radius", self.seed_territory_radius),
            ("bot_decision_interval", self.bot_decision_interval),
            ("max_tick_dt", self.max_tick_dt),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if !(self.agent_size >= 0.0 && self.agent_size < self.map_radius) {
            return Err(SettingsError::Invalid(format!(
                "agent_size must be in [0, map_radius), got {}",
                self.agent_size
            )));
        }
        if self.seed_territory_segments < 3 {
            return Err(SettingsError::Invalid(
                "seed_territory_segments must be at least 3".to_string(),
            ));
        }
        if !(self.victory_fraction > 0.0 && self.victory_fraction <= 1.0) {
            return Err(SettingsError::Invalid(format!(
                "victory_fraction must be in (0, 1], got {}",
                self.victory_fraction
            )));
        }
        if !(0.0..=1.0).contains(&self.bot_turn_chance) {
            return Err(SettingsError::Invalid(format!(
                "bot_turn_chance must be a probability, got {}",
                self.bot_turn_chance
            )));
        }
        if self.bot_count > 0
            && self.bot_spawn_radius + self.seed_territory_radius > self.effective_radius()
        {
            return Err(SettingsError::Invalid(
                "bot seed territories would cross the arena wall".to_string(),
            ));
        }
        Ok(())
    }

    /// Disc radius minus half the agent footprint
    pub fn effective_radius(&self) -> f32 {
        self.map_radius - self.agent_size / 2.0
    }

    /// Area of the whole disc
    pub fn arena_area(&self) -> f32 {
        std::f32::consts::PI * self.map_radius * self.map_radius
    }

    pub fn speed_for(&self, kind: AgentKind) -> f32 {
        match kind {
            AgentKind::Human => self.player_speed,
            AgentKind::Bot => self.bot_speed,
        }
    }

    pub fn motion_params(&self, speed: f32) -> MotionParams {
        MotionParams {
            speed,
            effective_radius: self.effective_radius(),
            turn_rate: std::f32::consts::FRAC_PI_4 / self.rotation_time,
            input_deadzone: self.input_deadzone,
            edge_blend_time: self.edge_blend_time,
        }
    }

    pub fn merge_params(&self) -> MergeParams {
        MergeParams {
            simplify_threshold_sq: self.simplify_threshold * self.simplify_threshold,
            smooth_iterations: self.smooth_iterations,
        }
    }

    pub fn bot_params(&self) -> BotParams {
        BotParams {
            decision_interval: self.bot_decision_interval,
            // NaN falls back to never turning at random
            turn_chance: if self.bot_turn_chance.is_nan() {
                0.0
            } else {
                self.bot_turn_chance.clamp(0.0, 1.0)
            },
            edge_lookahead: self.bot_edge_lookahead,
            edge_limit: self.bot_edge_limit,
        }
    }
}
