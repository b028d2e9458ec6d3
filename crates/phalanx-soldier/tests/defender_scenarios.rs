//! Defender behavior against a live attacker.

use glam::Vec3;
use phalanx_pool::{KillOutcome, Pool, PoolConfig, SpawnPose};
use phalanx_soldier::{
    Arena, ArenaLayout, AttackerState, Brain, Catch, DefenderState, Faction, Soldier, SoldierId,
    SoldierPrototype, World,
};

const DT: f32 = 0.1;

struct Field {
    pool: Pool<Soldier, SoldierPrototype>,
    arena: Arena,
}

impl Field {
    fn new() -> Self {
        Self {
            pool: Pool::new(PoolConfig::fixed(4), SoldierPrototype::default()),
            arena: Arena::new(ArenaLayout::default()),
        }
    }

    fn enlist(&mut self, faction: Faction, at: Vec3) -> SoldierId {
        let id = self.pool.spawn(SpawnPose::at(at)).unwrap();
        let soldier = self.pool.get_mut(id).unwrap();
        soldier.assign_to_side(faction, &mut self.arena);
        soldier.activate(&mut self.arena);
        id
    }

    fn tick(&mut self, id: SoldierId) {
        self.pool.get_mut(id).unwrap().tick(&mut self.arena, DT);
    }

    /// Ticks both soldiers, then hands any reported catches to the caught.
    fn round(&mut self, first: SoldierId, second: SoldierId) -> Vec<Catch> {
        self.tick(first);
        self.tick(second);
        let catches = self.arena.take_catches();
        for catch in &catches {
            if let Some(caught) = self.pool.get_mut(catch.caught) {
                caught.notify_caught(&mut self.arena);
            }
        }
        catches
    }

    fn defender_state(&self, id: SoldierId) -> Option<DefenderState> {
        self.pool.get(id)?.brain().and_then(Brain::defender_state)
    }

    fn attacker_state(&self, id: SoldierId) -> Option<AttackerState> {
        self.pool.get(id)?.brain().and_then(Brain::attacker_state)
    }
}

#[test]
fn test_standby_chase_catch_inactivate() {
    let mut field = Field::new();
    let defender = field.enlist(Faction::Red, Vec3::new(0.0, 0.0, 4.0));
    let attacker = field.enlist(Faction::Blue, Vec3::ZERO);
    field.arena.place_ball(Vec3::ZERO);

    field.round(attacker, defender);
    assert_eq!(field.defender_state(defender), Some(DefenderState::Standby));

    // Attacker picks the ball up, then starts carrying it toward +Z, right
    // into the defender's detection range.
    let mut caught = Vec::new();
    let mut chased = false;
    for _ in 0..100 {
        caught = field.round(attacker, defender);
        chased |= field.defender_state(defender) == Some(DefenderState::Chase);
        if !caught.is_empty() {
            break;
        }
    }

    assert!(chased);
    assert_eq!(
        caught,
        vec![Catch {
            catcher: defender,
            caught: attacker
        }]
    );
    assert_eq!(
        field.defender_state(defender),
        Some(DefenderState::Inactivate)
    );
    assert_eq!(field.attacker_state(attacker), Some(AttackerState::Caught));
    assert!(!field.arena.ball().unwrap().is_attached());
}

#[test]
fn test_defender_reactivates_and_walks_home() {
    let mut field = Field::new();
    let home = Vec3::new(0.0, 0.0, 4.0);
    let defender = field.enlist(Faction::Red, home);
    let soldier = field.pool.get_mut(defender).unwrap();
    assert!(soldier.notify_chase(&mut field.arena));

    // No carrier to chase: back home, then standby.
    field.tick(defender);
    assert_eq!(
        field.defender_state(defender),
        Some(DefenderState::ReturnHome)
    );
    field.tick(defender);
    assert_eq!(field.defender_state(defender), Some(DefenderState::Standby));

    field
        .pool
        .get_mut(defender)
        .unwrap()
        .bench(&mut field.arena, false);
    assert_eq!(
        field.defender_state(defender),
        Some(DefenderState::Inactivate)
    );

    // Default timer is four seconds.
    for _ in 0..39 {
        field.tick(defender);
    }
    assert_eq!(
        field.defender_state(defender),
        Some(DefenderState::Inactivate)
    );
    for _ in 0..2 {
        field.tick(defender);
    }
    assert_ne!(
        field.defender_state(defender),
        Some(DefenderState::Inactivate)
    );
    assert_eq!(field.arena.position_of(defender), Some(home));
}

#[test]
fn test_killed_soldier_is_forgotten_and_recycled() {
    let mut field = Field::new();
    let defender = field.enlist(Faction::Red, Vec3::ZERO);
    field
        .pool
        .get_mut(defender)
        .unwrap()
        .bench(&mut field.arena, true);
    assert!(!field.arena.is_registered(defender));

    assert_eq!(field.pool.kill(defender), KillOutcome::Recycled);
    assert!(field.defender_state(defender).is_none());

    let again = field.pool.spawn(SpawnPose::at(Vec3::ONE)).unwrap();
    assert_eq!(again, defender);
    let soldier = field.pool.get(again).unwrap();
    assert!(soldier.brain().is_none());
    assert_eq!(soldier.faction(), None);
    assert_eq!(soldier.id(), Some(again));
}
