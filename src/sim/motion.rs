//! Agent motion on the arena disc
//!
//! Heading eases toward the requested direction at a fixed angular rate, and
//! the arena wall deflects agents onto its tangent instead of stopping them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{angle_of, heading_from_angle, normalize_angle, shortest_arc};

/// Per-agent motion tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Units per second
    pub speed: f32,
    /// Arena radius minus half the agent footprint
    pub effective_radius: f32,
    /// Radians per second
    pub turn_rate: f32,
    /// Desired directions shorter than this keep the previous target
    pub input_deadzone: f32,
    /// Seconds to align the heading with the wall tangent
    pub edge_blend_time: f32,
}

/// Position and heading of one agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: Vec2,
    /// Smoothed unit heading
    pub heading: Vec2,
    /// Angle of `heading`
    pub angle: f32,
    /// Angle the heading is easing toward
    pub target_angle: f32,
}

impl Kinematics {
    pub fn new(position: Vec2, heading: Vec2) -> Self {
        let angle = angle_of(heading.normalize_or(Vec2::X));
        Self {
            position,
            heading: heading_from_angle(angle),
            angle,
            target_angle: angle,
        }
    }

    /// Tentative kinematics after `dt` seconds of steering toward `desired`.
    pub fn advance(&self, desired: Vec2, dt: f32, params: &MotionParams) -> Kinematics {
        let mut target_angle = self.target_angle;
        if desired.length() > params.input_deadzone {
            target_angle = angle_of(desired);
        }

        let diff = shortest_arc(self.angle, target_angle);
        let max_turn = params.turn_rate * dt;
        let mut angle = normalize_angle(self.angle + diff.clamp(-max_turn, max_turn));
        let mut heading = heading_from_angle(angle);

        let step = params.speed * dt;
        let mut position = self.position + heading * step;

        let radius = params.effective_radius;
        if position.length() > radius {
            let on_wall = position.normalize_or(heading) * radius;

            // Slide along whichever tangent keeps us moving forward
            let tangent = on_wall.perp().normalize_or(heading);
            let tangent = if heading.dot(tangent) >= 0.0 {
                tangent
            } else {
                -tangent
            };

            let blend = (dt / params.edge_blend_time).min(1.0);
            heading = heading.lerp(tangent, blend).normalize_or(tangent);
            angle = angle_of(heading);
            target_angle = angle;

            position = on_wall + heading * step;
            let dist = position.length();
            if dist > radius {
                position *= radius / dist;
            }
        }

        Kinematics {
            position,
            heading,
            angle,
            target_angle,
        }
    }
}
