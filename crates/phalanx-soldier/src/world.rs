//! The world surface soldiers query and mutate, and the in-process
//! [`Arena`] that implements it.

use std::collections::HashMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Ball, BallId, SoldierId};

// ---------------------------------------------------------------------------
// Faction / Role
// ---------------------------------------------------------------------------

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Blue,
    Red,
}

impl Faction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Blue => Self::Red,
            Self::Red => Self::Blue,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blue => write!(f, "blue"),
            Self::Red => write!(f, "red"),
        }
    }
}

/// What a faction is doing this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Attacker,
    Defender,
}

/// A reported catch: `catcher` reached `caught` while it held the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catch {
    pub catcher: SoldierId,
    pub caught: SoldierId,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Everything a soldier's states read or request beyond the soldier
/// itself.
///
/// Passed explicitly into every tick. "Opposing" is always from the
/// attacking side's point of view: the goal and fence attackers head for.
pub trait World {
    /// The ball in play, if one has been placed.
    fn ball(&self) -> Option<&Ball>;

    fn ball_mut(&mut self) -> Option<&mut Ball>;

    /// The goal point attackers carry the ball to.
    fn opposing_goal(&self) -> Vec3;

    /// A point on the back line attackers without the ball walk toward.
    fn opposing_fence(&self) -> Vec3;

    fn attacker_faction(&self) -> Faction;

    fn role_of(&self, faction: Faction) -> Role {
        if faction == self.attacker_faction() {
            Role::Attacker
        } else {
            Role::Defender
        }
    }

    /// Records a soldier as occupying a slot of `faction`.
    fn register_soldier(&mut self, id: SoldierId, faction: Faction);

    fn unregister_soldier(&mut self, id: SoldierId);

    /// Records an attacker as active (on the move).
    fn register_attacker(&mut self, id: SoldierId);

    fn unregister_attacker(&mut self, id: SoldierId);

    /// Publishes where a soldier is after its tick.
    fn report_position(&mut self, id: SoldierId, position: Vec3);

    /// Last published position of a soldier.
    fn position_of(&self, id: SoldierId) -> Option<Vec3>;

    /// Asks the world to deliver a catch to `caught`.
    fn report_catch(&mut self, catcher: SoldierId, caught: SoldierId);
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Reference points of one faction's half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideLayout {
    /// The goal defended by this faction.
    pub gate: Vec3,
    /// A point on this faction's back line.
    pub fence: Vec3,
}

/// Static arena geometry and the opening role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaLayout {
    /// Faction attacking in the first round.
    pub attacker: Faction,
    pub blue: SideLayout,
    pub red: SideLayout,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self {
            attacker: Faction::Blue,
            blue: SideLayout {
                gate: Vec3::new(0.0, 0.0, -10.0),
                fence: Vec3::new(0.0, 0.0, -10.0),
            },
            red: SideLayout {
                gate: Vec3::new(0.0, 0.0, 10.0),
                fence: Vec3::new(0.0, 0.0, 10.0),
            },
        }
    }
}

impl ArenaLayout {
    pub fn side(&self, faction: Faction) -> &SideLayout {
        match faction {
            Faction::Blue => &self.blue,
            Faction::Red => &self.red,
        }
    }
}

/// In-process world: the ball, the layout, and the soldier registries.
#[derive(Debug)]
pub struct Arena {
    layout: ArenaLayout,
    attacker: Faction,
    ball: Option<Ball>,
    next_ball: u32,
    soldiers: HashMap<SoldierId, Faction>,
    /// Active attackers, in registration order.
    attackers: Vec<SoldierId>,
    positions: HashMap<SoldierId, Vec3>,
    catches: Vec<Catch>,
}

impl Arena {
    pub fn new(layout: ArenaLayout) -> Self {
        Self {
            attacker: layout.attacker,
            layout,
            ball: None,
            next_ball: 1,
            soldiers: HashMap::new(),
            attackers: Vec::new(),
            positions: HashMap::new(),
            catches: Vec::new(),
        }
    }

    pub fn layout(&self) -> &ArenaLayout {
        &self.layout
    }

    /// Places a fresh, loose ball at `position`, replacing any ball in play.
    pub fn place_ball(&mut self, position: Vec3) -> BallId {
        let id = BallId(self.next_ball);
        self.next_ball += 1;
        self.ball = Some(Ball::new(id, position));
        debug!(ball = %id, ?position, "ball placed");
        id
    }

    /// Takes the ball out of play.
    pub fn remove_ball(&mut self) -> Option<Ball> {
        self.ball.take()
    }

    /// Hands the attack to the other faction.
    pub fn swap_roles(&mut self) -> Faction {
        self.attacker = self.attacker.opposite();
        self.attackers.clear();
        info!(attacker = %self.attacker, "roles swapped");
        self.attacker
    }

    /// Catches reported since the last call, oldest first.
    pub fn take_catches(&mut self) -> Vec<Catch> {
        std::mem::take(&mut self.catches)
    }

    pub fn faction_of(&self, id: SoldierId) -> Option<Faction> {
        self.soldiers.get(&id).copied()
    }

    pub fn is_registered(&self, id: SoldierId) -> bool {
        self.soldiers.contains_key(&id)
    }

    pub fn soldier_count(&self) -> usize {
        self.soldiers.len()
    }

    pub fn active_attackers(&self) -> &[SoldierId] {
        &self.attackers
    }

    fn defending(&self) -> &SideLayout {
        self.layout.side(self.attacker.opposite())
    }
}

impl World for Arena {
    fn ball(&self) -> Option<&Ball> {
        self.ball.as_ref()
    }

    fn ball_mut(&mut self) -> Option<&mut Ball> {
        self.ball.as_mut()
    }

    fn opposing_goal(&self) -> Vec3 {
        self.defending().gate
    }

    fn opposing_fence(&self) -> Vec3 {
        self.defending().fence
    }

    fn attacker_faction(&self) -> Faction {
        self.attacker
    }

    fn register_soldier(&mut self, id: SoldierId, faction: Faction) {
        self.soldiers.insert(id, faction);
    }

    fn unregister_soldier(&mut self, id: SoldierId) {
        self.soldiers.remove(&id);
        self.positions.remove(&id);
        self.attackers.retain(|a| *a != id);
    }

    fn register_attacker(&mut self, id: SoldierId) {
        if !self.attackers.contains(&id) {
            self.attackers.push(id);
        }
    }

    fn unregister_attacker(&mut self, id: SoldierId) {
        self.attackers.retain(|a| *a != id);
    }

    fn report_position(&mut self, id: SoldierId, position: Vec3) {
        self.positions.insert(id, position);
    }

    fn position_of(&self, id: SoldierId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    fn report_catch(&mut self, catcher: SoldierId, caught: SoldierId) {
        self.catches.push(Catch { catcher, caught });
    }
}

#[cfg(test)]
mod tests {
    use phalanx_pool::InstanceId;

    use super::*;

    fn sid(index: u32) -> SoldierId {
        InstanceId {
            index,
            generation: 0,
        }
    }

    #[test]
    fn test_opposing_points_follow_attacker() {
        let mut arena = Arena::new(ArenaLayout::default());
        assert_eq!(arena.attacker_faction(), Faction::Blue);
        assert_eq!(arena.opposing_goal(), Vec3::new(0.0, 0.0, 10.0));

        arena.swap_roles();
        assert_eq!(arena.attacker_faction(), Faction::Red);
        assert_eq!(arena.opposing_goal(), Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(arena.opposing_fence(), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_role_of() {
        let arena = Arena::new(ArenaLayout::default());
        assert_eq!(arena.role_of(Faction::Blue), Role::Attacker);
        assert_eq!(arena.role_of(Faction::Red), Role::Defender);
    }

    #[test]
    fn test_place_ball_issues_new_ids() {
        let mut arena = Arena::new(ArenaLayout::default());
        assert!(arena.ball().is_none());
        let first = arena.place_ball(Vec3::ZERO);
        let second = arena.place_ball(Vec3::ONE);
        assert_ne!(first, second);
        assert_eq!(arena.ball().unwrap().id(), second);
        assert!(arena.remove_ball().is_some());
        assert!(arena.ball().is_none());
    }

    #[test]
    fn test_register_attacker_is_idempotent() {
        let mut arena = Arena::new(ArenaLayout::default());
        arena.register_attacker(sid(1));
        arena.register_attacker(sid(1));
        assert_eq!(arena.active_attackers(), &[sid(1)]);
        arena.unregister_attacker(sid(1));
        assert!(arena.active_attackers().is_empty());
    }

    #[test]
    fn test_unregister_soldier_clears_everything() {
        let mut arena = Arena::new(ArenaLayout::default());
        arena.register_soldier(sid(1), Faction::Blue);
        arena.register_attacker(sid(1));
        arena.report_position(sid(1), Vec3::ONE);

        arena.unregister_soldier(sid(1));
        assert!(!arena.is_registered(sid(1)));
        assert!(arena.position_of(sid(1)).is_none());
        assert!(arena.active_attackers().is_empty());
    }

    #[test]
    fn test_take_catches_drains() {
        let mut arena = Arena::new(ArenaLayout::default());
        arena.report_catch(sid(2), sid(1));
        assert_eq!(
            arena.take_catches(),
            vec![Catch {
                catcher: sid(2),
                caught: sid(1)
            }]
        );
        assert!(arena.take_catches().is_empty());
    }
}
