//! The resting state both roles share.

use phalanx_fsm::State;
use tracing::trace;

use crate::Agent;

/// Stands still, drawn greyscale.
///
/// With a timer it requests `wake` once the timer runs out; without one it
/// stays put until something outside the machine changes the state.
#[derive(Debug, Clone)]
pub struct Inactivate<Id> {
    wake: Id,
    reactivate_after: Option<f32>,
    remaining: Option<f32>,
}

impl<Id> Inactivate<Id> {
    pub fn new(wake: Id, reactivate_after: Option<f32>) -> Self {
        Self {
            wake,
            reactivate_after,
            remaining: None,
        }
    }

    /// Seconds left before waking, while the state is current and timed.
    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }
}

impl<'a, Id: Copy> State<Agent<'a>, Id> for Inactivate<Id> {
    fn enter(&mut self, agent: &mut Agent<'a>) {
        agent.body.visuals.greyscale = true;
        agent.body.visuals.heading_arrow = false;
        self.remaining = self.reactivate_after;
    }

    fn exit(&mut self, agent: &mut Agent<'a>) {
        agent.body.visuals.greyscale = false;
        self.remaining = None;
    }

    fn update(&mut self, agent: &mut Agent<'a>) -> Option<Id> {
        let remaining = self.remaining.as_mut()?;
        *remaining -= agent.dt;
        if *remaining > 0.0 {
            return None;
        }
        trace!(soldier = %agent.id, "reactivation timer elapsed");
        Some(self.wake)
    }
}
