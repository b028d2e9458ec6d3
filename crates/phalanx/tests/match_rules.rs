//! Match-level scenarios: spawning, catching, scoring, fence benching.

use phalanx::prelude::*;
use phalanx::soldier::{AttackerState, Brain, DefenderState};

const DT: f32 = 0.1;

/// Ticks until `done` returns true for an event, or panics after `limit`.
fn tick_until(
    game: &mut Match,
    limit: usize,
    mut done: impl FnMut(&MatchEvent) -> bool,
) -> MatchEvent {
    for _ in 0..limit {
        if let Some(event) = game.tick(DT).into_iter().find(|event| done(event)) {
            return event;
        }
    }
    panic!("no matching event within {limit} ticks");
}

fn attacker_state(game: &Match, id: SoldierId) -> Option<AttackerState> {
    game.soldier(id)?.brain().and_then(Brain::attacker_state)
}

#[test]
fn test_spawned_soldiers_get_roles_by_faction() {
    let mut game = Match::new(MatchConfig::default());
    let blue = game.spawn(Faction::Blue, Vec3::new(1.0, 0.0, -3.0)).unwrap();
    let red = game.spawn(Faction::Red, Vec3::new(1.0, 0.0, 3.0)).unwrap();

    assert_eq!(game.soldier(blue).unwrap().role(), Some(Role::Attacker));
    assert_eq!(game.soldier(red).unwrap().role(), Some(Role::Defender));
    assert_eq!(game.last_spawned(), Some(red));
    let order: Vec<_> = game.soldiers().map(|(id, _)| id).collect();
    assert_eq!(order, vec![blue, red]);
}

#[test]
fn test_activated_attacker_walks_toward_fence() {
    let mut game = Match::new(MatchConfig::default());
    let id = game.spawn(Faction::Blue, Vec3::new(1.0, 0.0, -3.0)).unwrap();

    // Inactive soldiers stay put.
    game.tick(DT);
    assert_eq!(attacker_state(&game, id), Some(AttackerState::Inactivate));

    assert!(game.activate(id));
    game.tick(DT);
    assert_eq!(attacker_state(&game, id), Some(AttackerState::MoveStraight));
    for _ in 0..10 {
        game.tick(DT);
    }
    let position = game.soldier(id).unwrap().position();
    assert!((position.z - -1.5).abs() < 1e-3, "z = {}", position.z);
    assert!((position.x - 1.0).abs() < 1e-5, "x = {}", position.x);
}

#[test]
fn test_capacity_exhaustion() {
    let config = MatchConfig {
        pool: PoolConfig::fixed(2),
        ..MatchConfig::default()
    };
    let mut game = Match::new(config);
    assert!(game.spawn(Faction::Blue, Vec3::new(0.0, 0.0, -2.0)).is_some());
    assert!(game.spawn(Faction::Blue, Vec3::new(1.0, 0.0, -2.0)).is_some());
    assert!(game.spawn(Faction::Blue, Vec3::new(2.0, 0.0, -2.0)).is_none());
    assert_eq!(game.pool_stats().exhausted, 1);
}

#[test]
fn test_carrier_scores_at_gate() {
    let mut game = Match::new(MatchConfig::default());
    let id = game.spawn(Faction::Blue, Vec3::new(0.0, 0.0, -1.0)).unwrap();
    game.place_ball(Vec3::new(0.0, 0.0, -1.0));
    game.activate(id);

    let event = tick_until(&mut game, 200, |event| {
        matches!(event, MatchEvent::Goal { .. })
    });
    assert_eq!(
        event,
        MatchEvent::Goal {
            scorer: id,
            faction: Faction::Blue
        }
    );
    assert_eq!(game.score(Faction::Blue), 1);
    assert_eq!(game.score(Faction::Red), 0);
    assert!(game.soldier(id).is_none());
    assert!(!game.arena().ball().unwrap().is_attached());
    assert_eq!(game.pool_stats().recycled, 1);
}

#[test]
fn test_walker_is_benched_at_fence() {
    let mut game = Match::new(MatchConfig::default());
    let id = game.spawn(Faction::Blue, Vec3::new(0.0, 0.0, -1.0)).unwrap();
    game.activate(id);

    let event = tick_until(&mut game, 200, |event| {
        matches!(event, MatchEvent::Benched { .. })
    });
    assert_eq!(event, MatchEvent::Benched { soldier: id });
    assert!(game.soldier(id).is_none());
    assert!(!game.arena().is_registered(id));
}

#[test]
fn test_defender_catches_carrier() {
    let mut game = Match::new(MatchConfig::default());
    let attacker = game.spawn(Faction::Blue, Vec3::new(0.0, 0.0, -1.0)).unwrap();
    let defender = game.spawn(Faction::Red, Vec3::new(0.0, 0.0, 1.5)).unwrap();
    game.place_ball(Vec3::new(0.0, 0.0, -1.0));
    game.activate(attacker);
    game.activate(defender);

    let event = tick_until(&mut game, 100, |event| {
        matches!(event, MatchEvent::Caught { .. })
    });
    assert_eq!(
        event,
        MatchEvent::Caught {
            catcher: defender,
            caught: attacker
        }
    );
    assert!(!game.arena().ball().unwrap().is_attached());
    assert_eq!(attacker_state(&game, attacker), Some(AttackerState::Caught));
    assert_eq!(
        game.soldier(defender)
            .unwrap()
            .brain()
            .and_then(Brain::defender_state),
        Some(DefenderState::Inactivate)
    );

    game.tick(DT);
    assert_eq!(
        attacker_state(&game, attacker),
        Some(AttackerState::Inactivate)
    );
}

#[test]
fn test_swap_roles_rebuilds_brains() {
    let mut game = Match::new(MatchConfig::default());
    let blue = game.spawn(Faction::Blue, Vec3::new(0.0, 0.0, -1.0)).unwrap();
    let red = game.spawn(Faction::Red, Vec3::new(0.0, 0.0, 1.0)).unwrap();
    game.place_ball(Vec3::ZERO);
    game.activate(blue);

    assert_eq!(game.swap_roles(), Faction::Red);
    assert_eq!(game.attacker(), Faction::Red);
    assert!(game.arena().ball().is_none());
    assert_eq!(game.soldier(blue).unwrap().role(), Some(Role::Defender));
    assert_eq!(game.soldier(red).unwrap().role(), Some(Role::Attacker));
    assert!(!game.soldier(blue).unwrap().is_active());
    assert!(game.arena().active_attackers().is_empty());
}

#[test]
fn test_manual_bench_without_kill_keeps_soldier() {
    let mut game = Match::new(MatchConfig::default());
    let id = game.spawn(Faction::Blue, Vec3::new(0.0, 0.0, -1.0)).unwrap();
    game.activate(id);
    assert_eq!(game.bench(id, false), None);
    assert!(!game.soldier(id).unwrap().is_active());
    assert!(game.notify_caught(id));
    assert!(!game.notify_chase(id));
}
