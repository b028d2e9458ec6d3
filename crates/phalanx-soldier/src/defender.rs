//! The defender machine: stand guard at home, chase a nearby ball
//! carrier, walk back afterwards.

use phalanx_fsm::{State, StateSet, StateTable};
use tracing::debug;

use crate::{Agent, DefenderTuning, Inactivate, SoldierId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefenderState {
    Inactivate,
    Activate,
    Standby,
    Chase,
    ReturnHome,
}

#[derive(Debug)]
pub struct DefenderStates {
    inactivate: Inactivate<DefenderState>,
    activate: Activate,
    standby: Standby,
    chase: Chase,
    return_home: ReturnHome,
}

impl DefenderStates {
    pub fn new(tuning: &DefenderTuning) -> Self {
        Self {
            inactivate: Inactivate::new(DefenderState::Activate, tuning.reactivate_after),
            activate: Activate,
            standby: Standby,
            chase: Chase::default(),
            return_home: ReturnHome,
        }
    }

    /// Seconds until an inactive defender wakes up on its own.
    pub fn reactivates_in(&self) -> Option<f32> {
        self.inactivate.remaining()
    }

    /// The carrier being chased while in Chase.
    pub fn target(&self) -> Option<SoldierId> {
        self.chase.target
    }
}

impl StateSet for DefenderStates {
    type Id = DefenderState;
    const INITIAL: DefenderState = DefenderState::Inactivate;
}

impl<'a> StateTable<Agent<'a>> for DefenderStates {
    fn state_mut(&mut self, id: DefenderState) -> &mut dyn State<Agent<'a>, DefenderState> {
        match id {
            DefenderState::Inactivate => &mut self.inactivate,
            DefenderState::Activate => &mut self.activate,
            DefenderState::Standby => &mut self.standby,
            DefenderState::Chase => &mut self.chase,
            DefenderState::ReturnHome => &mut self.return_home,
        }
    }
}

fn is_home(agent: &Agent<'_>) -> bool {
    agent.squared_distance_to(agent.body.home) <= agent.tuning.defender.home_tolerance_sq
}

#[derive(Debug)]
struct Activate;

impl<'a> State<Agent<'a>, DefenderState> for Activate {
    fn update(&mut self, agent: &mut Agent<'a>) -> Option<DefenderState> {
        if is_home(agent) {
            Some(DefenderState::Standby)
        } else {
            Some(DefenderState::ReturnHome)
        }
    }
}

/// Waits at home for a carrier to come into detection range.
#[derive(Debug)]
struct Standby;

impl<'a> State<Agent<'a>, DefenderState> for Standby {
    fn enter(&mut self, agent: &mut Agent<'a>) {
        agent.body.visuals.detection = true;
    }

    fn exit(&mut self, agent: &mut Agent<'a>) {
        agent.body.visuals.detection = false;
    }

    fn update(&mut self, agent: &mut Agent<'a>) -> Option<DefenderState> {
        let holder = agent.world.ball()?.holder()?;
        let position = agent.world.position_of(holder)?;
        let range_sq = agent.tuning.defender.detection_distance_sq;
        (agent.squared_distance_to(position) <= range_sq).then_some(DefenderState::Chase)
    }
}

/// Runs down whoever held the ball on entry.
#[derive(Debug, Default)]
struct Chase {
    target: Option<SoldierId>,
}

impl<'a> State<Agent<'a>, DefenderState> for Chase {
    fn enter(&mut self, agent: &mut Agent<'a>) {
        self.target = agent.world.ball().and_then(|ball| ball.holder());
    }

    fn exit(&mut self, _agent: &mut Agent<'a>) {
        self.target = None;
    }

    fn update(&mut self, agent: &mut Agent<'a>) -> Option<DefenderState> {
        let Some(target) = self.target else {
            return Some(DefenderState::ReturnHome);
        };
        let still_holding = agent
            .world
            .ball()
            .is_some_and(|ball| ball.is_held_by(target));
        let Some(position) = agent.world.position_of(target).filter(|_| still_holding) else {
            return Some(DefenderState::ReturnHome);
        };

        if agent.squared_distance_to(position) <= agent.tuning.defender.catch_distance_sq {
            debug!(soldier = %agent.id, caught = %target, "carrier caught");
            agent.world.report_catch(agent.id, target);
            return Some(DefenderState::Inactivate);
        }
        let speed = agent.tuning.defender.chase_speed;
        agent.head_towards(position, speed);
        None
    }
}

#[derive(Debug)]
struct ReturnHome;

impl<'a> State<Agent<'a>, DefenderState> for ReturnHome {
    fn update(&mut self, agent: &mut Agent<'a>) -> Option<DefenderState> {
        if is_home(agent) {
            return Some(DefenderState::Standby);
        }
        let (home, speed) = (agent.body.home, agent.tuning.defender.normal_speed);
        agent.head_towards(home, speed);
        None
    }
}
