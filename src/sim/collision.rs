//! Trail collision rules
//!
//! The tricky part of the arena: who dies when a moving agent's step crosses
//! a trail depends on where the mover stands. Inside its own territory the
//! mover is safe and cuts the other trail; outside, crossing any trail
//! (its own included) is fatal for the mover.

use glam::Vec2;

use super::geometry::segments_intersect;
use super::state::AgentId;
use crate::consts::MOVE_EPSILON_SQ;

/// A mover's step for this tick, taken from the previous tick's state
#[derive(Debug, Clone, Copy)]
pub struct MoveProbe<'a> {
    pub id: AgentId,
    pub from: Vec2,
    pub to: Vec2,
    /// Whether `to` lies inside the mover's own territory
    pub inside_own: bool,
    pub own_trail: &'a [Vec2],
}

/// Another live agent's trail
#[derive(Debug, Clone, Copy)]
pub struct TrailView<'a> {
    pub owner: AgentId,
    pub trail: &'a [Vec2],
}

/// What a step runs into. At most one outcome per mover per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    Clear,
    /// Crossed its own trail while outside its territory
    SelfHit,
    /// Crossed `into`'s trail while outside its territory: the mover dies
    Crash { into: AgentId },
    /// Cut `victim`'s trail from inside its own territory
    Kill { victim: AgentId },
}

impl CollisionOutcome {
    pub fn is_clear(&self) -> bool {
        matches!(self, CollisionOutcome::Clear)
    }
}

/// Index of the first segment of `trail` crossed by `from-to`.
///
/// `skip_tail` segments at the end of the trail are ignored.
fn first_crossing(from: Vec2, to: Vec2, trail: &[Vec2], skip_tail: usize) -> Option<usize> {
    let segments = trail.len().saturating_sub(1).saturating_sub(skip_tail);
    (0..segments).find(|&i| segments_intersect(from, to, trail[i], trail[i + 1]))
}

/// Resolve the mover's step against its own trail and every other live trail.
///
/// `others` must exclude the mover and dead agents; it is scanned in order
/// and the first hit wins.
pub fn resolve_collision(probe: &MoveProbe<'_>, others: &[TrailView<'_>]) -> CollisionOutcome {
    if probe.from.distance_squared(probe.to) <= MOVE_EPSILON_SQ {
        return CollisionOutcome::Clear;
    }

    // The newest segment joins the mover and is never a crossing
    if !probe.inside_own
        && probe.own_trail.len() >= 3
        && first_crossing(probe.from, probe.to, probe.own_trail, 1).is_some()
    {
        return CollisionOutcome::SelfHit;
    }

    for other in others {
        debug_assert_ne!(other.owner, probe.id);
        if other.trail.len() < 2 {
            continue;
        }
        if first_crossing(probe.from, probe.to, other.trail, 0).is_some() {
            return if probe.inside_own {
                CollisionOutcome::Kill {
                    victim: other.owner,
                }
            } else {
                CollisionOutcome::Crash { into: other.owner }
            };
        }
    }

    CollisionOutcome::Clear
}
