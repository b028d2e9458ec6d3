//! The state traits.

use std::fmt;

/// One behavior mode, driven against a context `C`.
///
/// `Id` is the id type of the set this state belongs to; `update` names
/// the next state by id instead of holding a reference to it.
pub trait State<C: ?Sized, Id> {
    /// Captures whatever per-activation data the state needs.
    fn enter(&mut self, _ctx: &mut C) {}

    /// Releases per-activation data so the next activation starts clean.
    fn exit(&mut self, _ctx: &mut C) {}

    /// Runs once per tick while this state is current.
    ///
    /// Returning `Some(next)` requests a transition. A state that requests
    /// a transition must not also have moved the agent this tick.
    fn update(&mut self, ctx: &mut C) -> Option<Id>;
}

/// A closed set of states, addressed by `Id`.
pub trait StateSet: Sized {
    type Id: Copy + Eq + fmt::Debug;

    /// The state a freshly initialized machine starts in.
    const INITIAL: Self::Id;
}

/// Dispatch from ids to the state objects of a set, for context `C`.
pub trait StateTable<C: ?Sized>: StateSet {
    fn state_mut(&mut self, id: Self::Id) -> &mut dyn State<C, Self::Id>;
}
