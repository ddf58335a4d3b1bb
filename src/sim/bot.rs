//! Reactive bot steering
//!
//! Bots re-think their direction on a fixed interval: a small random chance
//! to turn 90°, and a forced turn when the point just ahead is near the wall.
//! The chosen direction is fed through the same motion model as the player.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bot decision tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotParams {
    /// Seconds between decisions
    pub decision_interval: f32,
    /// Probability of a random turn per decision
    pub turn_chance: f64,
    /// Distance probed ahead of the bot
    pub edge_lookahead: f32,
    /// Probe radius that forces a turn
    pub edge_limit: f32,
}

/// Steering memory for one bot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotBrain {
    /// Desired direction (unit, axis-turned)
    pub direction: Vec2,
    /// Seconds accumulated toward the next decision
    pub decision_timer: f32,
}

impl BotBrain {
    pub fn new(direction: Vec2) -> Self {
        Self {
            direction: direction.normalize_or(Vec2::X),
            decision_timer: 0.0,
        }
    }

    /// Desired direction for this tick
    pub fn steer<R: Rng>(&mut self, position: Vec2, dt: f32, params: &BotParams, rng: &mut R) -> Vec2 {
        self.decision_timer += dt;
        if self.decision_timer >= params.decision_interval {
            self.decision_timer %= params.decision_interval;
            self.decide(position, params, rng);
        }
        self.direction
    }

    fn decide<R: Rng>(&mut self, position: Vec2, params: &BotParams, rng: &mut R) {
        let random_turn = rng.random_bool(params.turn_chance);
        let ahead = position + self.direction * params.edge_lookahead;
        if ahead.length() > params.edge_limit || random_turn {
            let d = self.direction;
            self.direction = if rng.random_bool(0.5) {
                Vec2::new(d.y, -d.x)
            } else {
                Vec2::new(-d.y, d.x)
            };
        }
    }
}
