//! Finite state machines for Phalanx agents.
//!
//! A machine owns a closed set of states, built up-front, and the id of
//! the one that is current. States are driven against a caller-supplied
//! context (usually an agent plus a world handle), so the same state code
//! never reaches for globals.
//!
//! # Key types
//!
//! - [`State`]: enter/exit hooks and a per-tick rule that may request a
//!   transition
//! - [`StateSet`]: names a closed set of states and its initial state
//! - [`StateTable`]: typed dispatch from a state id to its state object
//! - [`StateMachine`]: holds the set and the current id, performs
//!   transitions
//!
//! # Transition contract
//!
//! ```text
//! change_state(next):  next == current → no-op
//!                      otherwise       → current.exit → current = next → next.enter
//! update():            current.update → Some(next) → change_state(next)
//! ```
//!
//! A transition is always complete before `update` or `change_state`
//! returns.

mod machine;
mod state;

pub use machine::StateMachine;
pub use state::{State, StateSet, StateTable};
