//! The soldier driver and its pool hooks.

use glam::Vec3;
use phalanx_fsm::StateMachine;
use phalanx_pool::{InstanceId, Poolable, Prototype, Transform};
use tracing::{debug, info};

use crate::{
    Agent, AttackerState, AttackerStates, Body, DefenderState, DefenderStates, Faction, Role,
    SoldierConfig, SoldierId, World,
};

/// A soldier's behavior: exactly one machine, picked by role.
#[derive(Debug)]
pub enum Brain {
    Attacker(StateMachine<AttackerStates>),
    Defender(StateMachine<DefenderStates>),
}

impl Brain {
    pub fn role(&self) -> Role {
        match self {
            Self::Attacker(_) => Role::Attacker,
            Self::Defender(_) => Role::Defender,
        }
    }

    pub fn attacker_state(&self) -> Option<AttackerState> {
        match self {
            Self::Attacker(machine) => Some(machine.current()),
            Self::Defender(_) => None,
        }
    }

    pub fn defender_state(&self) -> Option<DefenderState> {
        match self {
            Self::Defender(machine) => Some(machine.current()),
            Self::Attacker(_) => None,
        }
    }

    fn update(&mut self, agent: &mut Agent<'_>) {
        match self {
            Self::Attacker(machine) => {
                if let Some(next) = machine.update(agent) {
                    debug!(soldier = %agent.id, state = ?next, "attacker transition");
                }
            }
            Self::Defender(machine) => {
                if let Some(next) = machine.update(agent) {
                    debug!(soldier = %agent.id, state = ?next, "defender transition");
                }
            }
        }
    }

    fn activate(&mut self, agent: &mut Agent<'_>) -> bool {
        match self {
            Self::Attacker(machine) => machine.change_state(AttackerState::Activate, agent),
            Self::Defender(machine) => machine.change_state(DefenderState::Activate, agent),
        }
    }

    fn deactivate(&mut self, agent: &mut Agent<'_>) -> bool {
        match self {
            Self::Attacker(machine) => machine.change_state(AttackerState::Inactivate, agent),
            Self::Defender(machine) => machine.change_state(DefenderState::Inactivate, agent),
        }
    }
}

/// A pooled agent.
///
/// Identity comes from the pool on spawn; faction and brain come from
/// [`Soldier::assign_to_side`]. Until both are set the soldier ignores
/// every request.
#[derive(Debug)]
pub struct Soldier {
    id: Option<SoldierId>,
    faction: Option<Faction>,
    body: Body,
    tuning: SoldierConfig,
    brain: Option<Brain>,
}

impl Soldier {
    pub fn new(tuning: SoldierConfig) -> Self {
        Self {
            id: None,
            faction: None,
            body: Body::default(),
            tuning,
            brain: None,
        }
    }

    pub fn id(&self) -> Option<SoldierId> {
        self.id
    }

    pub fn faction(&self) -> Option<Faction> {
        self.faction
    }

    pub fn role(&self) -> Option<Role> {
        self.brain.as_ref().map(Brain::role)
    }

    pub fn brain(&self) -> Option<&Brain> {
        self.brain.as_ref()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn tuning(&self) -> &SoldierConfig {
        &self.tuning
    }

    pub fn position(&self) -> Vec3 {
        self.body.transform.position()
    }

    /// Whether the soldier is past its inactive state.
    pub fn is_active(&self) -> bool {
        match &self.brain {
            Some(Brain::Attacker(m)) => !m.is_current(AttackerState::Inactivate),
            Some(Brain::Defender(m)) => !m.is_current(DefenderState::Inactivate),
            None => false,
        }
    }

    /// Joins `faction`, taking the attacker or defender role depending on
    /// who attacks this round. The current position becomes home.
    ///
    /// A previous brain is released first, as in [`Soldier::bench`], and a
    /// fresh one starts in Inactivate.
    pub fn assign_to_side(&mut self, faction: Faction, world: &mut dyn World) {
        let Some(id) = self.id else {
            debug!("assign_to_side on a soldier outside a pool");
            return;
        };
        self.release(id, world);
        self.faction = Some(faction);
        self.body.home = self.body.transform.position();
        world.register_soldier(id, faction);
        world.report_position(id, self.body.home);

        let role = world.role_of(faction);
        let mut agent = Agent {
            id,
            body: &mut self.body,
            world,
            tuning: &self.tuning,
            dt: 0.0,
        };
        let brain = match role {
            Role::Attacker => Brain::Attacker(StateMachine::initialize(
                AttackerStates::new(&self.tuning.attacker),
                &mut agent,
            )),
            Role::Defender => Brain::Defender(StateMachine::initialize(
                DefenderStates::new(&self.tuning.defender),
                &mut agent,
            )),
        };
        self.brain = Some(brain);
        info!(soldier = %id, %faction, ?role, "soldier assigned");
    }

    /// Wakes the soldier up. Attackers also join the active attackers.
    pub fn activate(&mut self, world: &mut dyn World) -> bool {
        let (Some(id), Some(brain)) = (self.id, self.brain.as_mut()) else {
            return false;
        };
        if brain.role() == Role::Attacker {
            world.register_attacker(id);
        }
        let mut agent = Agent {
            id,
            body: &mut self.body,
            world,
            tuning: &self.tuning,
            dt: 0.0,
        };
        brain.activate(&mut agent)
    }

    /// Runs one tick of the brain, then drags a held ball along and
    /// publishes the new position.
    pub fn tick(&mut self, world: &mut dyn World, dt: f32) {
        let (Some(id), Some(brain)) = (self.id, self.brain.as_mut()) else {
            return;
        };
        let mut agent = Agent {
            id,
            body: &mut self.body,
            world: &mut *world,
            tuning: &self.tuning,
            dt,
        };
        brain.update(&mut agent);

        let position = self.body.transform.position();
        if let Some(ball) = world.ball_mut().filter(|ball| ball.is_held_by(id)) {
            ball.carry_to(position);
        }
        world.report_position(id, position);
    }

    /// A defender reached this soldier. Only attackers react.
    pub fn notify_caught(&mut self, world: &mut dyn World) -> bool {
        let (Some(id), Some(Brain::Attacker(machine))) = (self.id, self.brain.as_mut()) else {
            return false;
        };
        let mut agent = Agent {
            id,
            body: &mut self.body,
            world,
            tuning: &self.tuning,
            dt: 0.0,
        };
        machine.change_state(AttackerState::Caught, &mut agent)
    }

    /// Sends a defender after the ball carrier. Only defenders react.
    pub fn notify_chase(&mut self, world: &mut dyn World) -> bool {
        let (Some(id), Some(Brain::Defender(machine))) = (self.id, self.brain.as_mut()) else {
            return false;
        };
        let mut agent = Agent {
            id,
            body: &mut self.body,
            world,
            tuning: &self.tuning,
            dt: 0.0,
        };
        machine.change_state(DefenderState::Chase, &mut agent)
    }

    /// Takes the soldier out of play: drops the ball, leaves the active
    /// attackers, goes inactive. With `kill` the world forgets it as well,
    /// ahead of the pool taking it back.
    pub fn bench(&mut self, world: &mut dyn World, kill: bool) {
        let Some(id) = self.id else {
            return;
        };
        self.release(id, world);
        if kill {
            world.unregister_soldier(id);
        }
        debug!(soldier = %id, kill, "soldier benched");
    }

    /// Drops a held ball, leaves the active attackers and runs the current
    /// state's exit hook on the way to Inactivate.
    fn release(&mut self, id: SoldierId, world: &mut dyn World) {
        if let Some(ball) = world.ball_mut().filter(|ball| ball.is_held_by(id)) {
            ball.detach();
        }
        if let Some(brain) = self.brain.as_mut() {
            if brain.role() == Role::Attacker {
                world.unregister_attacker(id);
            }
            let mut agent = Agent {
                id,
                body: &mut self.body,
                world,
                tuning: &self.tuning,
                dt: 0.0,
            };
            brain.deactivate(&mut agent);
        }
    }
}

impl Poolable for Soldier {
    fn transform(&self) -> &Transform {
        &self.body.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.body.transform
    }

    fn on_activate(&mut self, id: InstanceId) {
        self.id = Some(id);
        self.body.visuals.reset();
    }

    fn on_deactivate(&mut self) {
        self.brain = None;
        self.faction = None;
        self.id = None;
    }
}

/// Builds soldiers with shared tuning.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoldierPrototype {
    pub tuning: SoldierConfig,
}

impl Prototype<Soldier> for SoldierPrototype {
    fn instantiate(&self) -> Soldier {
        Soldier::new(self.tuning)
    }
}
