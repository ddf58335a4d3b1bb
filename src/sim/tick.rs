//! Simulation tick
//!
//! One call per rendered frame. Every live agent's step is planned against the
//! previous tick's committed state, deaths and kill credits are resolved, and
//! only then are positions, trails and territories written back. That keeps
//! the outcome independent of the order agents are visited in.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::bot::BotBrain;
use super::collision::{CollisionOutcome, MoveProbe, TrailView, resolve_collision};
use super::colors::ColorPool;
use super::geometry::{closest_point_on_polygon, point_in_polygon};
use super::merge::{GeoUnion, MergeOutcome, PolygonUnion, merge_territory};
use super::motion::Kinematics;
use super::state::{
    Agent, AgentId, AgentKind, DeathCause, GameEvent, GamePhase, GameState, RoundReport,
    WorldSnapshot,
};
use crate::leaderboard::{LeaderboardEntry, PersonalBest, build_leaderboard, display_percentage};
use crate::settings::ArenaSettings;
use crate::{heading_from_angle, polar_to_cartesian};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired direction per agent, components in [-1, 1], zero = no input.
    /// The player defaults to zero; bots left out steer themselves.
    pub directions: BTreeMap<AgentId, Vec2>,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Input steering only the player
    pub fn player(direction: Vec2) -> Self {
        let mut input = Self::default();
        input.directions.insert(AgentId::Player, direction);
        input
    }

    /// Add a direction override for `id`
    pub fn with_direction(mut self, id: AgentId, direction: Vec2) -> Self {
        self.directions.insert(id, direction);
        self
    }
}

/// One agent's step, computed before anything is written back
#[derive(Debug, Clone, Copy)]
struct Plan {
    idx: usize,
    next: Kinematics,
    inside: bool,
    outcome: CollisionOutcome,
}

/// The simulation core: owns the agents and is their only writer
pub struct Simulation {
    settings: ArenaSettings,
    state: GameState,
    colors: ColorPool,
    rng: Pcg32,
    union: Box<dyn PolygonUnion>,
    player_name: String,
    personal_best: PersonalBest,
}

impl Simulation {
    /// Player at the center plus `settings.bot_count` bots.
    ///
    /// Settings are expected to have passed [`ArenaSettings::validate`];
    /// out-of-range probabilities are clamped rather than rejected.
    pub fn new(settings: ArenaSettings, seed: u64) -> Self {
        Self::with_union(settings, seed, Box::new(GeoUnion))
    }

    /// Same as [`Simulation::new`] with a custom union backend
    pub fn with_union(settings: ArenaSettings, seed: u64, union: Box<dyn PolygonUnion>) -> Self {
        let colors = ColorPool::new(settings.palette.clone(), settings.player_color.clone());
        let mut sim = Self {
            settings,
            state: GameState::new(Vec::new()),
            colors,
            rng: Pcg32::seed_from_u64(seed),
            union,
            player_name: "Player".to_string(),
            personal_best: PersonalBest::default(),
        };
        sim.state = GameState::new(sim.spawn_round());
        log::info!(
            "Round ready: {} agents, seed {}",
            sim.state.agents.len(),
            seed
        );
        sim
    }

    /// Simulation over a hand-built set of agents
    pub fn with_agents(settings: ArenaSettings, seed: u64, agents: Vec<Agent>) -> Self {
        let colors = ColorPool::new(settings.palette.clone(), settings.player_color.clone());
        Self {
            settings,
            state: GameState::new(agents),
            colors,
            rng: Pcg32::seed_from_u64(seed),
            union: Box::new(GeoUnion),
            player_name: "Player".to_string(),
            personal_best: PersonalBest::default(),
        }
    }

    fn spawn_round(&mut self) -> Vec<Agent> {
        let s = &self.settings;
        let mut agents = Vec::with_capacity(s.bot_count + 1);

        agents.push(Agent::spawn(
            AgentId::Player,
            AgentKind::Human,
            self.player_name.clone(),
            self.colors.player_color().to_string(),
            Vec2::ZERO,
            Vec2::X,
            s.speed_for(AgentKind::Human),
            s.seed_territory_radius,
            s.seed_territory_segments,
        ));

        let phase = self.rng.random_range(0.0..std::f32::consts::TAU);
        for i in 0..s.bot_count {
            let theta = phase + i as f32 / s.bot_count as f32 * std::f32::consts::TAU;
            let spawn = polar_to_cartesian(s.bot_spawn_radius, theta);
            // Start off circling the arena
            let heading = heading_from_angle(theta + std::f32::consts::FRAC_PI_2);
            let id = i as u32 + 1;
            let color = self.colors.assign(&mut self.rng);
            let mut bot = Agent::spawn(
                AgentId::Bot(id),
                AgentKind::Bot,
                format!("Bot {id}"),
                color,
                spawn,
                heading,
                s.speed_for(AgentKind::Bot),
                s.seed_territory_radius,
                s.seed_territory_segments,
            );
            bot.brain = Some(BotBrain::new(heading));
            agents.push(bot);
        }
        agents
    }

    pub fn settings(&self) -> &ArenaSettings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.state.agent(id)
    }

    pub fn personal_best(&self) -> f32 {
        self.personal_best.best()
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
        let name = self.player_name.clone();
        if let Some(player) = self.state.agent_mut(AgentId::Player) {
            player.name = name;
        }
    }

    /// Takes effect on the player immediately and on bots at the next reset
    pub fn set_player_color(&mut self, color: impl Into<String>) {
        self.colors.set_player_color(color);
        let color = self.colors.player_color().to_string();
        if let Some(player) = self.state.agent_mut(AgentId::Player) {
            player.color = color;
        }
    }

    /// Leave the lobby
    pub fn start(&mut self) {
        if self.state.phase == GamePhase::Lobby {
            self.state.phase = GamePhase::Playing;
            log::info!("Round started");
        }
    }

    /// Discard the round (trails, territories, colors) and respawn everyone
    pub fn reset(&mut self) {
        self.colors.reset();
        let agents = self.spawn_round();
        self.state = GameState::new(agents);
        log::info!("Round reset");
    }

    /// Share of the disc owned by `id`
    pub fn area_fraction(&self, id: AgentId) -> f32 {
        self.state
            .agent(id)
            .map(|a| a.territory_area() / self.settings.arena_area())
            .unwrap_or(0.0)
    }

    /// Numbers for the persistence layer
    pub fn round_report(&self) -> RoundReport {
        let fraction = self.area_fraction(AgentId::Player);
        RoundReport {
            territory_fraction: fraction,
            display_percentage: display_percentage(fraction, self.settings.victory_fraction),
            color: self.colors.player_color().to_string(),
            victory: self.state.winner == Some(AgentId::Player),
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let arena_area = self.settings.arena_area();
        WorldSnapshot {
            agents: self.state.agents.iter().map(|a| a.snapshot(arena_area)).collect(),
            phase: self.state.phase,
            is_game_over: self.state.is_game_over(),
            is_victory: self.state.winner.is_some(),
            winner: self.state.winner,
            time_ticks: self.state.time_ticks,
        }
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        build_leaderboard(&self.snapshot(), self.settings.victory_fraction)
    }

    /// Advance the round by `dt` seconds
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> Vec<GameEvent> {
        if input.pause {
            match self.state.phase {
                GamePhase::Playing => {
                    self.state.phase = GamePhase::Paused;
                    return Vec::new();
                }
                GamePhase::Paused => self.state.phase = GamePhase::Playing,
                _ => {}
            }
        }

        if self.state.phase != GamePhase::Playing {
            return Vec::new();
        }
        if !(dt.is_finite() && dt > 0.0) {
            log::debug!("Ignoring tick with dt {dt}");
            return Vec::new();
        }
        let dt = dt.min(self.settings.max_tick_dt);
        self.state.time_ticks += 1;

        let desired = self.steer(dt, input);
        let plans = self.plan(dt, &desired);

        let mut events = Vec::new();
        let halted = self.resolve_deaths(&plans, &mut events);

        let mut victor = None;
        for plan in &plans {
            if halted[plan.idx] || !self.state.agents[plan.idx].alive {
                continue;
            }
            if let Some(fraction) = self.commit(plan, dt, &mut events) {
                if fraction >= self.settings.victory_fraction {
                    victor = Some(self.state.agents[plan.idx].id);
                    break;
                }
            }
        }

        self.check_round_end(victor, &mut events);
        events
    }

    /// Desired direction for every live agent, in agent order
    fn steer(&mut self, dt: f32, input: &TickInput) -> Vec<Vec2> {
        let bot_params = self.settings.bot_params();
        let rng = &mut self.rng;
        self.state
            .agents
            .iter_mut()
            .map(|agent| {
                if let Some(&dir) = input.directions.get(&agent.id) {
                    return dir;
                }
                let position = agent.motion.position;
                match agent.brain.as_mut() {
                    Some(brain) if agent.alive => brain.steer(position, dt, &bot_params, rng),
                    _ => Vec2::ZERO,
                }
            })
            .collect()
    }

    /// Tentative steps and collision outcomes from the committed state
    fn plan(&self, dt: f32, desired: &[Vec2]) -> Vec<Plan> {
        let agents = &self.state.agents;
        agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.alive)
            .map(|(idx, agent)| {
                let params = self.settings.motion_params(agent.speed);
                let next = agent.motion.advance(desired[idx], dt, &params);
                let inside = point_in_polygon(next.position, &agent.territory);

                let others: Vec<TrailView<'_>> = agents
                    .iter()
                    .filter(|o| o.alive && o.id != agent.id)
                    .map(|o| TrailView {
                        owner: o.id,
                        trail: &o.trail,
                    })
                    .collect();
                let probe = MoveProbe {
                    id: agent.id,
                    from: agent.motion.position,
                    to: next.position,
                    inside_own: inside,
                    own_trail: &agent.trail,
                };

                Plan {
                    idx,
                    next,
                    inside,
                    outcome: resolve_collision(&probe, &others),
                }
            })
            .collect()
    }

    /// Apply deaths and kill credits in agent order.
    ///
    /// Returns, per agent index, whether the agent's step is cancelled.
    fn resolve_deaths(&mut self, plans: &[Plan], events: &mut Vec<GameEvent>) -> Vec<bool> {
        let mut halted = vec![false; self.state.agents.len()];
        let mut deaths: Vec<(usize, DeathCause)> = Vec::new();
        let mut credits: Vec<usize> = Vec::new();
        let already_dead =
            |deaths: &[(usize, DeathCause)], idx: usize| deaths.iter().any(|(d, _)| *d == idx);

        for plan in plans {
            let mover = self.state.agents[plan.idx].id;
            match plan.outcome {
                CollisionOutcome::Clear => continue,
                CollisionOutcome::SelfHit => {
                    if !already_dead(&deaths, plan.idx) {
                        deaths.push((plan.idx, DeathCause::SelfIntersection));
                    }
                }
                CollisionOutcome::Crash { into } => {
                    if !already_dead(&deaths, plan.idx) {
                        deaths.push((plan.idx, DeathCause::KilledBy(into)));
                        credits.extend(self.index_of(into));
                    }
                }
                CollisionOutcome::Kill { victim } => {
                    if let Some(vidx) = self.index_of(victim) {
                        if !already_dead(&deaths, vidx) {
                            deaths.push((vidx, DeathCause::KilledBy(mover)));
                            credits.push(plan.idx);
                        }
                    }
                }
            }
            halted[plan.idx] = true;
        }

        for idx in credits {
            self.state.agents[idx].kill_count += 1;
        }
        for (idx, cause) in deaths {
            let agent = &mut self.state.agents[idx];
            agent.kill();
            log::debug!("{} died: {:?}", agent.id, cause);
            events.push(GameEvent::Died {
                agent: agent.id,
                cause,
            });
        }
        halted
    }

    fn index_of(&self, id: AgentId) -> Option<usize> {
        self.state.agents.iter().position(|a| a.id == id)
    }

    /// Write back one step: position, trail sampling and merging on return.
    ///
    /// Returns the new area fraction when a merge was committed.
    fn commit(&mut self, plan: &Plan, dt: f32, events: &mut Vec<GameEvent>) -> Option<f32> {
        let sample_interval = self.settings.trail_sample_interval;
        let merge_params = self.settings.merge_params();
        let arena_area = self.settings.arena_area();

        let agent = &mut self.state.agents[plan.idx];
        let previous = agent.motion.position;
        agent.motion = plan.next;
        let position = agent.motion.position;

        let exited = agent.was_inside && !plan.inside;
        let entered = !agent.was_inside && plan.inside;
        agent.was_inside = plan.inside;

        if exited {
            // Anchor the trail on the boundary we just left
            let anchor = closest_point_on_polygon(previous, &agent.territory);
            agent.trail.clear();
            agent.trail.push(anchor);
            agent.trail.push(position);
            agent.trail_timer = 0.0;
            return None;
        }

        if !plan.inside {
            agent.trail_timer += dt;
            if agent.trail_timer >= sample_interval {
                agent.trail.push(position);
                agent.trail_timer = 0.0;
            }
            return None;
        }

        if !entered {
            return None;
        }

        agent.trail.push(position);
        let outcome = merge_territory(
            &agent.territory,
            &agent.trail,
            self.union.as_ref(),
            &merge_params,
        );
        agent.trail.clear();
        agent.trail_timer = 0.0;

        match outcome {
            MergeOutcome::Committed {
                territory,
                old_area,
                new_area,
            } => {
                agent.territory = territory;
                let fraction = new_area / arena_area;
                log::debug!(
                    "{} conquered {:.1} -> {:.1} ({:.1}%)",
                    agent.id,
                    old_area,
                    new_area,
                    fraction * 100.0
                );
                events.push(GameEvent::Conquered {
                    agent: agent.id,
                    area_fraction: fraction,
                });
                Some(fraction)
            }
            MergeOutcome::NoGain {
                old_area,
                candidate_area,
            } => {
                log::debug!(
                    "{} merge rejected: {:.2} -> {:.2}",
                    agent.id,
                    old_area,
                    candidate_area
                );
                None
            }
            MergeOutcome::Failed(err) => {
                log::warn!("{} merge abandoned: {}", agent.id, err);
                None
            }
            MergeOutcome::TrailTooShort => None,
        }
    }

    fn check_round_end(&mut self, victor: Option<AgentId>, events: &mut Vec<GameEvent>) {
        let player_dead = self.state.player().is_some_and(|p| !p.alive);
        let everyone_dead = self.state.alive_count() == 0;

        if let Some(winner) = victor {
            log::info!("{} wins the round", winner);
            self.state.winner = Some(winner);
            events.push(GameEvent::Victory { agent: winner });
        } else if !(player_dead || everyone_dead) {
            return;
        }

        self.state.phase = GamePhase::GameOver;
        let report = self.round_report();
        self.personal_best.update(report.display_percentage);
        log::info!(
            "Round over: player holds {:.1}% (victory: {})",
            report.display_percentage,
            report.victory
        );
        events.push(GameEvent::RoundOver { report });
    }
}
