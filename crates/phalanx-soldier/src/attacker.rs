//! The attacker machine: walk to the far fence, grab a loose ball, carry
//! it to the opposing goal.

use glam::Vec3;
use phalanx_fsm::{State, StateSet, StateTable};
use tracing::debug;

use crate::{Agent, AttackerTuning, BallId, Inactivate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackerState {
    Inactivate,
    Activate,
    MoveStraight,
    ChaseBall,
    MoveTowardsGate,
    Caught,
}

/// One object per [`AttackerState`], built once per brain.
#[derive(Debug)]
pub struct AttackerStates {
    inactivate: Inactivate<AttackerState>,
    activate: Activate,
    move_straight: MoveStraight,
    chase_ball: ChaseBall,
    move_towards_gate: MoveTowardsGate,
    caught: Caught,
}

impl AttackerStates {
    pub fn new(tuning: &AttackerTuning) -> Self {
        Self {
            inactivate: Inactivate::new(AttackerState::Activate, tuning.reactivate_after),
            activate: Activate,
            move_straight: MoveStraight::default(),
            chase_ball: ChaseBall::default(),
            move_towards_gate: MoveTowardsGate::default(),
            caught: Caught,
        }
    }

    /// Walking direction while in MoveStraight.
    pub fn walking_direction(&self) -> Option<Vec3> {
        self.move_straight.direction
    }

    /// Ball being chased while in ChaseBall.
    pub fn chased_ball(&self) -> Option<BallId> {
        self.chase_ball.ball
    }

    /// Goal being carried to while in MoveTowardsGate.
    pub fn goal(&self) -> Option<Vec3> {
        self.move_towards_gate.goal
    }
}

impl StateSet for AttackerStates {
    type Id = AttackerState;
    const INITIAL: AttackerState = AttackerState::Inactivate;
}

impl<'a> StateTable<Agent<'a>> for AttackerStates {
    fn state_mut(&mut self, id: AttackerState) -> &mut dyn State<Agent<'a>, AttackerState> {
        match id {
            AttackerState::Inactivate => &mut self.inactivate,
            AttackerState::Activate => &mut self.activate,
            AttackerState::MoveStraight => &mut self.move_straight,
            AttackerState::ChaseBall => &mut self.chase_ball,
            AttackerState::MoveTowardsGate => &mut self.move_towards_gate,
            AttackerState::Caught => &mut self.caught,
        }
    }
}

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Activate;

impl<'a> State<Agent<'a>, AttackerState> for Activate {
    fn update(&mut self, agent: &mut Agent<'a>) -> Option<AttackerState> {
        if agent.loose_ball().is_some() {
            Some(AttackerState::ChaseBall)
        } else {
            Some(AttackerState::MoveStraight)
        }
    }
}

/// Walks along ±Z toward the opposing fence until a loose ball shows up.
#[derive(Debug, Default)]
struct MoveStraight {
    direction: Option<Vec3>,
}

impl<'a> State<Agent<'a>, AttackerState> for MoveStraight {
    fn enter(&mut self, agent: &mut Agent<'a>) {
        let dz = agent.world.opposing_fence().z - agent.position().z;
        let direction = if dz > 0.0 { Vec3::Z } else { Vec3::NEG_Z };
        agent.body.transform.face(direction);
        agent.body.visuals.heading_arrow = true;
        self.direction = Some(direction);
    }

    fn exit(&mut self, agent: &mut Agent<'a>) {
        self.direction = None;
        agent.body.visuals.heading_arrow = false;
    }

    fn update(&mut self, agent: &mut Agent<'a>) -> Option<AttackerState> {
        let direction = self.direction?;
        if agent.loose_ball().is_some() {
            return Some(AttackerState::ChaseBall);
        }
        let speed = agent.tuning.attacker.normal_speed;
        agent.advance(direction, speed);
        None
    }
}

/// Runs to a loose ball and picks it up.
#[derive(Debug, Default)]
struct ChaseBall {
    ball: Option<BallId>,
}

impl<'a> State<Agent<'a>, AttackerState> for ChaseBall {
    fn enter(&mut self, agent: &mut Agent<'a>) {
        self.ball = agent.world.ball().map(|ball| ball.id());
    }

    fn exit(&mut self, _agent: &mut Agent<'a>) {
        self.ball = None;
    }

    fn update(&mut self, agent: &mut Agent<'a>) -> Option<AttackerState> {
        let Some(ball) = agent.world.ball() else {
            return Some(AttackerState::MoveStraight);
        };
        if Some(ball.id()) != self.ball {
            return Some(AttackerState::MoveStraight);
        }
        let (target, holder) = (ball.position(), ball.holder());

        match holder {
            Some(holder) if holder == agent.id => Some(AttackerState::MoveTowardsGate),
            Some(_) => Some(AttackerState::MoveStraight),
            None => {
                let capture_sq = agent.tuning.attacker.capture_distance_sq;
                if agent.squared_distance_to(target) <= capture_sq {
                    let id = agent.id;
                    if let Some(ball) = agent.world.ball_mut() {
                        ball.attach(id);
                        debug!(soldier = %id, ball = %ball.id(), "ball captured");
                    }
                } else {
                    let speed = agent.tuning.attacker.normal_speed;
                    agent.head_towards(target, speed);
                }
                None
            }
        }
    }
}

/// Carries the ball to the opposing goal. Leaves only when something
/// outside the machine intervenes.
#[derive(Debug, Default)]
struct MoveTowardsGate {
    goal: Option<Vec3>,
}

impl<'a> State<Agent<'a>, AttackerState> for MoveTowardsGate {
    fn enter(&mut self, agent: &mut Agent<'a>) {
        self.goal = Some(agent.world.opposing_goal());
        agent.body.visuals.highlight = true;
    }

    fn exit(&mut self, agent: &mut Agent<'a>) {
        self.goal = None;
        agent.body.visuals.highlight = false;
    }

    fn update(&mut self, agent: &mut Agent<'a>) -> Option<AttackerState> {
        if let Some(goal) = self.goal {
            let speed = agent.tuning.attacker.carry_speed;
            agent.head_towards(goal, speed);
        }
        None
    }
}

/// Drops the ball and goes inactive on the next tick.
#[derive(Debug)]
struct Caught;

impl<'a> State<Agent<'a>, AttackerState> for Caught {
    fn enter(&mut self, agent: &mut Agent<'a>) {
        let id = agent.id;
        if let Some(ball) = agent.world.ball_mut() {
            if ball.is_held_by(id) {
                ball.detach();
                debug!(soldier = %id, ball = %ball.id(), "ball dropped");
            }
        }
    }

    fn update(&mut self, _agent: &mut Agent<'a>) -> Option<AttackerState> {
        Some(AttackerState::Inactivate)
    }
}

#[cfg(test)]
mod tests {
    use phalanx_fsm::StateMachine;
    use phalanx_pool::InstanceId;

    use super::*;
    use crate::{Arena, ArenaLayout, Body, SoldierConfig, World};

    const ME: InstanceId = InstanceId {
        index: 1,
        generation: 0,
    };

    struct Rig {
        body: Body,
        arena: Arena,
        tuning: SoldierConfig,
    }

    impl Rig {
        fn new(at: Vec3) -> Self {
            let mut body = Body::default();
            body.transform.set_position(at);
            Self {
                body,
                arena: Arena::new(ArenaLayout::default()),
                tuning: SoldierConfig::default(),
            }
        }

        fn agent(&mut self, dt: f32) -> Agent<'_> {
            Agent {
                id: ME,
                body: &mut self.body,
                world: &mut self.arena,
                tuning: &self.tuning,
                dt,
            }
        }

        fn machine(&mut self) -> StateMachine<AttackerStates> {
            let states = AttackerStates::new(&self.tuning.attacker);
            StateMachine::initialize(states, &mut self.agent(0.1))
        }
    }

    #[test]
    fn test_starts_inactive_and_greyscale() {
        let mut rig = Rig::new(Vec3::ZERO);
        let mut machine = rig.machine();
        assert_eq!(machine.current(), AttackerState::Inactivate);
        assert!(rig.body.visuals.greyscale);
        assert_eq!(machine.update(&mut rig.agent(10.0)), None);
    }

    #[test]
    fn test_activate_without_ball_walks_toward_fence() {
        let mut rig = Rig::new(Vec3::ZERO);
        let mut machine = rig.machine();
        machine.change_state(AttackerState::Activate, &mut rig.agent(0.1));
        assert!(!rig.body.visuals.greyscale);

        assert_eq!(
            machine.update(&mut rig.agent(0.1)),
            Some(AttackerState::MoveStraight)
        );
        // Default layout: blue attacks toward red's fence at +Z.
        assert_eq!(machine.states().walking_direction(), Some(Vec3::Z));
        assert!(rig.body.visuals.heading_arrow);
    }

    #[test]
    fn test_move_straight_switches_to_loose_ball() {
        let mut rig = Rig::new(Vec3::ZERO);
        let mut machine = rig.machine();
        machine.change_state(AttackerState::MoveStraight, &mut rig.agent(0.1));

        let ball = rig.arena.place_ball(Vec3::new(3.0, 0.0, 3.0));
        let before = rig.body.transform.position();
        assert_eq!(
            machine.update(&mut rig.agent(0.1)),
            Some(AttackerState::ChaseBall)
        );
        // The switch costs the tick its step.
        assert_eq!(rig.body.transform.position(), before);
        assert_eq!(machine.states().chased_ball(), Some(ball));
        assert!(!rig.body.visuals.heading_arrow);
        assert_eq!(machine.states().walking_direction(), None);
    }

    #[test]
    fn test_chase_moves_toward_ball_on_ground_plane() {
        let mut rig = Rig::new(Vec3::ZERO);
        rig.arena.place_ball(Vec3::new(4.0, 1.0, 0.0));
        let mut machine = rig.machine();
        machine.change_state(AttackerState::ChaseBall, &mut rig.agent(0.1));

        assert_eq!(machine.update(&mut rig.agent(1.0)), None);
        assert_eq!(rig.body.transform.position(), Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_replaced_ball_goes_back_to_walking() {
        let mut rig = Rig::new(Vec3::ZERO);
        rig.arena.place_ball(Vec3::new(4.0, 0.0, 0.0));
        let mut machine = rig.machine();
        machine.change_state(AttackerState::ChaseBall, &mut rig.agent(0.1));

        rig.arena.place_ball(Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(
            machine.update(&mut rig.agent(0.1)),
            Some(AttackerState::MoveStraight)
        );
    }

    #[test]
    fn test_ball_taken_by_other_goes_back_to_walking() {
        let mut rig = Rig::new(Vec3::ZERO);
        rig.arena.place_ball(Vec3::new(4.0, 0.0, 0.0));
        let mut machine = rig.machine();
        machine.change_state(AttackerState::ChaseBall, &mut rig.agent(0.1));

        let other = InstanceId {
            index: 2,
            generation: 0,
        };
        rig.arena.ball_mut().unwrap().attach(other);
        assert_eq!(
            machine.update(&mut rig.agent(0.1)),
            Some(AttackerState::MoveStraight)
        );
    }

    #[test]
    fn test_gate_run_highlights_and_never_leaves() {
        let mut rig = Rig::new(Vec3::ZERO);
        let mut machine = rig.machine();
        machine.change_state(AttackerState::MoveTowardsGate, &mut rig.agent(0.1));
        assert!(rig.body.visuals.highlight);
        assert_eq!(machine.states().goal(), Some(Vec3::new(0.0, 0.0, 10.0)));

        for _ in 0..5 {
            assert_eq!(machine.update(&mut rig.agent(1.0)), None);
        }
        let z = rig.body.transform.position().z;
        assert!((z - 10.0).abs() < 1e-4, "stopped on the goal, got {z}");

        machine.change_state(AttackerState::Caught, &mut rig.agent(0.1));
        assert!(!rig.body.visuals.highlight);
        assert_eq!(machine.states().goal(), None);
    }

    #[test]
    fn test_timed_inactivate_wakes_up() {
        let mut rig = Rig::new(Vec3::ZERO);
        rig.tuning.attacker.reactivate_after = Some(1.0);
        let mut machine = rig.machine();
        assert_eq!(machine.update(&mut rig.agent(0.6)), None);
        assert_eq!(
            machine.update(&mut rig.agent(0.6)),
            Some(AttackerState::Activate)
        );
    }
}
