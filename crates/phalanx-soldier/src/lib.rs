//! Soldiers: pooled agents whose behavior is a per-role state machine.
//!
//! A [`Soldier`] lives in a [`phalanx_pool::Pool`]. When it is assigned to
//! a side it gets a [`Brain`]: the attacker machine if its faction is
//! attacking this round, the defender machine otherwise. Every tick the
//! soldier forwards to its brain, and the current state reads the
//! [`World`], moves the soldier, claims or drops the [`Ball`], or asks for
//! a transition.
//!
//! # Key types
//!
//! - [`Soldier`]: the driver, and the pool's instance type
//! - [`World`]: everything states query or request outside the soldier;
//!   [`Arena`] is the in-process implementation
//! - [`AttackerStates`] / [`DefenderStates`]: the two closed state sets
//! - [`SoldierConfig`]: movement speeds and distance thresholds per role

mod agent;
mod attacker;
mod ball;
mod config;
mod defender;
mod inactivate;
mod soldier;
mod world;

pub use agent::{Agent, Body, Visuals};
pub use attacker::{AttackerState, AttackerStates};
pub use ball::{Ball, BallId};
pub use config::{AttackerTuning, DefenderTuning, SoldierConfig};
pub use defender::{DefenderState, DefenderStates};
pub use inactivate::Inactivate;
pub use soldier::{Brain, Soldier, SoldierPrototype};
pub use world::{Arena, ArenaLayout, Catch, Faction, Role, SideLayout, World};

/// A soldier's identity is the handle its pool issued.
pub type SoldierId = phalanx_pool::InstanceId;
