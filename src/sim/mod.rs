//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep, clamped
//! - Seeded RNG only
//! - Stable iteration order (by agent ID)
//! - No rendering or platform dependencies

pub mod bot;
pub mod collision;
pub mod colors;
pub mod geometry;
pub mod merge;
pub mod motion;
pub mod state;
pub mod tick;

pub use bot::{BotBrain, BotParams};
pub use collision::{CollisionOutcome, MoveProbe, TrailView, resolve_collision};
pub use colors::ColorPool;
pub use merge::{GeoUnion, MergeError, MergeOutcome, MergeParams, PolygonUnion, merge_territory};
pub use motion::{Kinematics, MotionParams};
pub use state::{
    Agent, AgentId, AgentKind, AgentSnapshot, DeathCause, GameEvent, GamePhase, GameState,
    RoundReport, WorldSnapshot,
};
pub use tick::{Simulation, TickInput};
