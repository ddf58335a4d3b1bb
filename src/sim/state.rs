//! Game state and core simulation types
//!
//! Everything a renderer or UI needs is reachable from [`GameState`] and the
//! snapshot types; agents are only mutated by the tick.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bot::BotBrain;
use super::geometry::{circle_polygon, close_polygon, polygon_area};
use super::motion::Kinematics;

/// Stable agent identity. Orders the player first, then bots by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgentId {
    Player,
    Bot(u32),
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentId::Player => write!(f, "player"),
            AgentId::Bot(n) => write!(f, "bot-{n}"),
        }
    }
}

/// Who steers the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKind {
    Human,
    Bot,
}

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Agents placed, waiting for start
    Lobby,
    /// Active gameplay
    Playing,
    /// Ticks are ignored until unpaused
    Paused,
    /// Round ended (death or victory)
    GameOver,
}

/// Why an agent died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Crossed its own trail
    SelfIntersection,
    /// Credited to another agent
    KilledBy(AgentId),
}

/// Final numbers handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Player territory as a fraction of the disc
    pub territory_fraction: f32,
    /// Scaled percentage shown to the player (victory threshold = 100)
    pub display_percentage: f32,
    pub color: String,
    pub victory: bool,
}

/// Lifecycle events produced by a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Died { agent: AgentId, cause: DeathCause },
    Conquered { agent: AgentId, area_fraction: f32 },
    Victory { agent: AgentId },
    RoundOver { report: RoundReport },
}

/// The player or one bot
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub kind: AgentKind,
    pub name: String,
    pub color: String,
    pub motion: Kinematics,
    /// Units per second
    pub speed: f32,
    /// Open ring, implicitly closed
    pub territory: Vec<Vec2>,
    /// Points laid down outside the territory (empty when inside)
    pub trail: Vec<Vec2>,
    pub alive: bool,
    pub kill_count: u32,
    /// Inside own territory at the end of the last tick
    pub was_inside: bool,
    /// Seconds since the last trail sample
    pub trail_timer: f32,
    pub brain: Option<BotBrain>,
}

impl Agent {
    /// Fresh agent with a circular seed territory around `spawn`
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        id: AgentId,
        kind: AgentKind,
        name: impl Into<String>,
        color: impl Into<String>,
        spawn: Vec2,
        heading: Vec2,
        speed: f32,
        seed_radius: f32,
        seed_segments: usize,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            color: color.into(),
            motion: Kinematics::new(spawn, heading),
            speed,
            territory: circle_polygon(spawn, seed_radius, seed_segments),
            trail: Vec::new(),
            alive: true,
            kill_count: 0,
            was_inside: true,
            trail_timer: 0.0,
            brain: None,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.kind == AgentKind::Bot
    }

    pub fn position(&self) -> Vec2 {
        self.motion.position
    }

    pub fn territory_area(&self) -> f32 {
        polygon_area(&close_polygon(&self.territory))
    }

    /// Mark dead. Territory is kept for scoring, the trail goes.
    pub fn kill(&mut self) {
        self.alive = false;
        self.trail.clear();
        self.trail_timer = 0.0;
    }

    pub fn snapshot(&self, arena_area: f32) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
            is_bot: self.is_bot(),
            position: self.motion.position,
            heading: self.motion.heading,
            territory: self.territory.clone(),
            trail: self.trail.clone(),
            alive: self.alive,
            kill_count: self.kill_count,
            area_fraction: self.territory_area() / arena_area,
        }
    }
}

/// Read-only view of one agent after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub color: String,
    pub is_bot: bool,
    pub position: Vec2,
    pub heading: Vec2,
    pub territory: Vec<Vec2>,
    pub trail: Vec<Vec2>,
    pub alive: bool,
    pub kill_count: u32,
    pub area_fraction: f32,
}

/// Read-only view of the whole round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub agents: Vec<AgentSnapshot>,
    pub phase: GamePhase,
    pub is_game_over: bool,
    pub is_victory: bool,
    pub winner: Option<AgentId>,
    pub time_ticks: u64,
}

/// Round state (agents sorted by id for determinism)
#[derive(Debug, Clone)]
pub struct GameState {
    pub agents: Vec<Agent>,
    pub phase: GamePhase,
    pub winner: Option<AgentId>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    pub fn new(mut agents: Vec<Agent>) -> Self {
        agents.sort_by_key(|a| a.id);
        Self {
            agents,
            phase: GamePhase::Lobby,
            winner: None,
            time_ticks: 0,
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    pub fn player(&self) -> Option<&Agent> {
        self.agent(AgentId::Player)
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn bot(n: u32) -> Agent {
        Agent::spawn(
            AgentId::Bot(n),
            AgentKind::Bot,
            format!("Bot {n}"),
            "#00ff00",
            Vec2::new(30.0, 0.0),
            Vec2::Y,
            6.0,
            5.0,
            128,
        )
    }

    #[test]
    fn test_id_order_puts_player_first() {
        let mut ids = vec![AgentId::Bot(3), AgentId::Player, AgentId::Bot(1)];
        ids.sort();
        assert_eq!(ids, vec![AgentId::Player, AgentId::Bot(1), AgentId::Bot(3)]);
        assert_eq!(AgentId::Bot(3).to_string(), "bot-3");
    }

    #[test]
    fn test_spawn_seed_territory() {
        let a = bot(1);
        assert!(a.alive && a.trail.is_empty() && a.was_inside);
        assert_eq!(a.territory.len(), 128);
        assert!((a.territory_area() - PI * 25.0).abs() < 0.1);
    }

    #[test]
    fn test_kill_keeps_territory() {
        let mut a = bot(1);
        a.trail.push(Vec2::new(40.0, 0.0));
        let before = a.territory.clone();
        a.kill();
        assert!(!a.alive);
        assert!(a.trail.is_empty());
        assert_eq!(a.territory, before);
    }

    #[test]
    fn test_state_sorts_agents() {
        let state = GameState::new(vec![bot(2), bot(1)]);
        assert_eq!(state.agents[0].id, AgentId::Bot(1));
        assert_eq!(state.phase, GamePhase::Lobby);
        assert!(state.player().is_none());
        assert_eq!(state.alive_count(), 2);
    }

    #[test]
    fn test_snapshot_fraction() {
        let a = bot(1);
        let snap = a.snapshot(PI * 50.0 * 50.0);
        assert!((snap.area_fraction - 0.01).abs() < 1e-4);
        assert!(snap.is_bot);
    }
}
