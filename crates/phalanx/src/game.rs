//! The match: one pool of soldiers, one arena, and the rules that end a
//! soldier's run.

use std::collections::HashMap;

use glam::Vec3;
use phalanx_pool::{KillOutcome, Pool, PoolStats};
use phalanx_soldier::{
    Arena, BallId, Faction, Role, Soldier, SoldierId, SoldierPrototype, World,
};
use phalanx_tick::TickScheduler;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{Field, MatchConfig, RuleConfig};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something that happened during a [`Match::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    /// A defender caught the ball carrier, who dropped the ball.
    Caught {
        catcher: SoldierId,
        caught: SoldierId,
    },
    /// A carrier reached the opposing gate. The scorer has been benched
    /// and returned to the pool.
    Goal {
        scorer: SoldierId,
        faction: Faction,
    },
    /// An attacker without the ball reached the opposing fence and has
    /// been benched and returned to the pool.
    Benched { soldier: SoldierId },
}

/// How a [`Match::run`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Ticks played.
    pub ticks: u64,
    /// The faction that scored, if the run ended on a goal.
    pub winner: Option<Faction>,
    /// Every event, in order.
    pub events: Vec<MatchEvent>,
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// Owns everything a match needs and steps it one tick at a time.
///
/// Soldiers are ticked in spawn order. A catch reported by one soldier is
/// delivered to the caught attacker before the next soldier ticks, so
/// everyone after sees the dropped ball in the same tick.
pub struct Match {
    config: MatchConfig,
    pool: Pool<Soldier, SoldierPrototype>,
    arena: Arena,
    blue_field: Field,
    red_field: Field,
    rules: RuleConfig,
    score: HashMap<Faction, u32>,
    spawning: bool,
    /// Live ids copied out of the pool for one pass, reused across ticks.
    roster: Vec<SoldierId>,
}

impl Match {
    pub fn new(config: MatchConfig) -> Self {
        let config = config.validated();
        let prototype = SoldierPrototype {
            tuning: config.soldier,
        };
        info!(
            attacker = %config.arena.attacker,
            capacity = config.pool.initial_capacity,
            "match created"
        );
        Self {
            pool: Pool::new(config.pool, prototype),
            arena: Arena::new(config.arena.layout()),
            blue_field: Field::new(Faction::Blue, &config.arena.blue.field),
            red_field: Field::new(Faction::Red, &config.arena.red.field),
            rules: config.rules,
            score: HashMap::new(),
            spawning: true,
            roster: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn field(&self, faction: Faction) -> &Field {
        match faction {
            Faction::Blue => &self.blue_field,
            Faction::Red => &self.red_field,
        }
    }

    pub fn attacker(&self) -> Faction {
        self.arena.attacker_faction()
    }

    pub fn score(&self, faction: Faction) -> u32 {
        self.score.get(&faction).copied().unwrap_or(0)
    }

    pub fn pool_stats(&self) -> &PoolStats {
        self.pool.stats()
    }

    /// Stops accepting new soldiers until [`enable_spawning`](Self::enable_spawning).
    pub fn disable_spawning(&mut self) {
        self.spawning = false;
    }

    pub fn enable_spawning(&mut self) {
        self.spawning = true;
    }

    pub fn is_spawning_enabled(&self) -> bool {
        self.spawning
    }

    // -----------------------------------------------------------------------
    // Soldiers
    // -----------------------------------------------------------------------

    /// Puts a soldier of `faction` down at a world-space `point` on its
    /// field and assigns it to the faction's side.
    ///
    /// Returns `None` if spawning is disabled, the point is off the field,
    /// or the pool is exhausted.
    pub fn spawn(&mut self, faction: Faction, point: Vec3) -> Option<SoldierId> {
        if !self.spawning {
            debug!(%faction, "spawning disabled");
            return None;
        }
        let Some(pose) = self.field(faction).spawn_pose(point) else {
            debug!(%faction, ?point, "spawn point off field");
            return None;
        };
        let id = self.pool.spawn(pose)?;
        let soldier = self.pool.get_mut(id)?;
        soldier.assign_to_side(faction, &mut self.arena);
        info!(soldier = %id, %faction, position = ?soldier.position(), "soldier spawned");
        Some(id)
    }

    /// Wakes a soldier up.
    pub fn activate(&mut self, id: SoldierId) -> bool {
        self.pool
            .get_mut(id)
            .is_some_and(|soldier| soldier.activate(&mut self.arena))
    }

    /// Tells an attacker it has been caught.
    pub fn notify_caught(&mut self, id: SoldierId) -> bool {
        self.pool
            .get_mut(id)
            .is_some_and(|soldier| soldier.notify_caught(&mut self.arena))
    }

    /// Sends a defender after the ball carrier.
    pub fn notify_chase(&mut self, id: SoldierId) -> bool {
        self.pool
            .get_mut(id)
            .is_some_and(|soldier| soldier.notify_chase(&mut self.arena))
    }

    /// Takes a soldier out of play. With `kill` it also goes back to the
    /// pool; the outcome of that is returned.
    pub fn bench(&mut self, id: SoldierId, kill: bool) -> Option<KillOutcome> {
        let Some(soldier) = self.pool.get_mut(id) else {
            warn!(soldier = %id, "bench requested for a soldier not in play");
            return None;
        };
        soldier.bench(&mut self.arena, kill);
        if !kill {
            info!(soldier = %id, "soldier benched");
            return None;
        }
        let outcome = self.pool.kill(id);
        info!(soldier = %id, ?outcome, "soldier benched and released");
        Some(outcome)
    }

    pub fn soldier(&self, id: SoldierId) -> Option<&Soldier> {
        self.pool.get(id)
    }

    /// Soldiers in play, in spawn order.
    pub fn soldiers(&self) -> impl Iterator<Item = (SoldierId, &Soldier)> + '_ {
        self.pool.iter_live()
    }

    /// The most recently spawned soldier still in play.
    pub fn last_spawned(&self) -> Option<SoldierId> {
        self.pool.retrieve_live()
    }

    // -----------------------------------------------------------------------
    // Ball and roles
    // -----------------------------------------------------------------------

    /// Places a new loose ball.
    pub fn place_ball(&mut self, point: Vec3) -> BallId {
        self.arena.place_ball(point)
    }

    /// Places a new loose ball somewhere on the attacking faction's field.
    pub fn place_ball_randomly(&mut self, rng: &mut impl Rng) -> BallId {
        let point = self.field(self.attacker()).random_point(rng);
        self.arena.place_ball(point)
    }

    /// Hands the attack to the other faction. The ball is removed and every
    /// soldier in play gets a fresh, inactive brain for its new role.
    pub fn swap_roles(&mut self) -> Faction {
        self.arena.remove_ball();
        let attacker = self.arena.swap_roles();

        self.refresh_roster();
        for &id in &self.roster {
            let Some(soldier) = self.pool.get_mut(id) else {
                continue;
            };
            if let Some(faction) = soldier.faction() {
                soldier.assign_to_side(faction, &mut self.arena);
            }
        }
        attacker
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    /// Advances the match by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Vec<MatchEvent> {
        let mut events = Vec::new();

        self.refresh_roster();
        let roster = std::mem::take(&mut self.roster);
        for &id in &roster {
            if let Some(soldier) = self.pool.get_mut(id) {
                soldier.tick(&mut self.arena, dt);
            }
            self.deliver_catches(&mut events);
        }
        self.roster = roster;

        self.apply_rules(&mut events);
        events
    }

    fn refresh_roster(&mut self) {
        self.roster.clear();
        self.roster.extend_from_slice(self.pool.live());
    }

    fn deliver_catches(&mut self, events: &mut Vec<MatchEvent>) {
        for catch in self.arena.take_catches() {
            let Some(caught) = self.pool.get_mut(catch.caught) else {
                continue;
            };
            if caught.notify_caught(&mut self.arena) {
                info!(catcher = %catch.catcher, caught = %catch.caught, "carrier caught");
                events.push(MatchEvent::Caught {
                    catcher: catch.catcher,
                    caught: catch.caught,
                });
            }
        }
    }

    /// Scores carriers at the gate and retires walkers at the fence.
    fn apply_rules(&mut self, events: &mut Vec<MatchEvent>) {
        let attacker = self.arena.attacker_faction();
        let goal = self.arena.opposing_goal();
        let fence = self.arena.opposing_fence();
        let own_fence = self.arena.layout().side(attacker).fence;
        let heading = (fence.z - own_fence.z).signum();
        let carrier = self.arena.ball().and_then(|ball| ball.holder());

        let mut scorers = Vec::new();
        let mut walkers = Vec::new();
        for (id, soldier) in self.pool.iter_live() {
            if soldier.role() != Some(Role::Attacker) || !soldier.is_active() {
                continue;
            }
            let position = soldier.position();
            if carrier == Some(id) {
                if position.distance_squared(goal) <= self.rules.goal_radius_sq {
                    scorers.push(id);
                }
            } else if (fence.z - position.z) * heading <= self.rules.fence_tolerance {
                walkers.push(id);
            }
        }

        for scorer in scorers {
            *self.score.entry(attacker).or_default() += 1;
            info!(soldier = %scorer, faction = %attacker, score = self.score(attacker), "goal");
            self.bench(scorer, true);
            events.push(MatchEvent::Goal {
                scorer,
                faction: attacker,
            });
        }
        for walker in walkers {
            self.bench(walker, true);
            events.push(MatchEvent::Benched { soldier: walker });
        }
    }

    /// Drives the match from `scheduler` until a goal is scored or
    /// `max_ticks` ticks have been played.
    ///
    /// Returns immediately if the scheduler is manual or paused, since it
    /// would never fire.
    pub async fn run(&mut self, scheduler: &mut TickScheduler, max_ticks: u64) -> RunReport {
        let mut report = RunReport {
            ticks: 0,
            winner: None,
            events: Vec::new(),
        };
        if scheduler.is_manual() || scheduler.is_paused() {
            warn!("match run needs a running scheduler");
            return report;
        }

        info!(rate_hz = scheduler.tick_rate_hz(), max_ticks, "match running");
        while report.ticks < max_ticks {
            let tick = scheduler.wait_for_tick().await;
            let events = self.tick(tick.dt_secs());
            scheduler.record_tick_end();
            report.ticks += 1;

            let winner = events.iter().find_map(|event| match event {
                MatchEvent::Goal { faction, .. } => Some(*faction),
                _ => None,
            });
            report.events.extend(events);
            if winner.is_some() {
                report.winner = winner;
                break;
            }
        }
        info!(ticks = report.ticks, winner = ?report.winner, "match run finished");
        report
    }
}
