//! The state machine.

use tracing::trace;

use crate::{StateSet, StateTable};

/// Owns a state set and the id of its current state.
///
/// There is no uninitialized machine: [`StateMachine::initialize`] is the
/// only constructor, and it enters the initial state before returning.
pub struct StateMachine<S: StateSet> {
    states: S,
    current: S::Id,
}

impl<S: StateSet> StateMachine<S> {
    /// Takes a fully built state set, makes [`StateSet::INITIAL`] current
    /// and enters it.
    pub fn initialize<C: ?Sized>(mut states: S, ctx: &mut C) -> Self
    where
        S: StateTable<C>,
    {
        states.state_mut(S::INITIAL).enter(ctx);
        trace!(state = ?S::INITIAL, "state machine initialized");
        Self {
            states,
            current: S::INITIAL,
        }
    }

    /// The current state's id.
    pub fn current(&self) -> S::Id {
        self.current
    }

    pub fn is_current(&self, id: S::Id) -> bool {
        self.current == id
    }

    /// The state objects, for inspection.
    pub fn states(&self) -> &S {
        &self.states
    }

    /// Moves to `next`: exits the current state, then enters `next`.
    ///
    /// Returns `false` without calling any hook when `next` is already
    /// current.
    pub fn change_state<C: ?Sized>(&mut self, next: S::Id, ctx: &mut C) -> bool
    where
        S: StateTable<C>,
    {
        if next == self.current {
            return false;
        }
        let previous = self.current;
        self.states.state_mut(previous).exit(ctx);
        self.current = next;
        self.states.state_mut(next).enter(ctx);
        trace!(from = ?previous, to = ?next, "state changed");
        true
    }

    /// Runs the current state's per-tick rule and carries out any
    /// transition it requests.
    ///
    /// Returns the id of the newly entered state, if the tick changed it.
    pub fn update<C: ?Sized>(&mut self, ctx: &mut C) -> Option<S::Id>
    where
        S: StateTable<C>,
    {
        let next = self.states.state_mut(self.current).update(ctx)?;
        self.change_state(next, ctx).then_some(next)
    }
}

impl<S> std::fmt::Debug for StateMachine<S>
where
    S: StateSet,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
