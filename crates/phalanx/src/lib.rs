//! # Phalanx
//!
//! Attack-and-defend matches between two factions of pooled soldiers.
//!
//! Each round one faction attacks: its soldiers walk toward the far
//! fence, race for the ball, and carry it to the opposing gate. The other
//! faction defends: its soldiers stand guard, chase a carrier that comes
//! close, and catch it. Soldiers are recycled through a
//! [`phalanx_pool::Pool`] and driven by per-role state machines built on
//! [`phalanx_fsm`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phalanx::prelude::*;
//!
//! # async fn demo() -> Result<(), PhalanxError> {
//! let config = MatchConfig::load("match.json")?;
//! let mut game = Match::new(config);
//! let striker = game.spawn(Faction::Blue, Vec3::new(0.0, 0.0, -4.0));
//! game.spawn(Faction::Red, Vec3::new(0.0, 0.0, 4.0));
//! game.place_ball(Vec3::new(0.0, 0.0, -2.0));
//! if let Some(id) = striker {
//!     game.activate(id);
//! }
//!
//! let mut scheduler = TickScheduler::new(game.config().tick_config());
//! let report = game.run(&mut scheduler, 600).await;
//! println!("winner: {:?}", report.winner);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod field;
mod game;

pub use config::{ArenaConfig, FieldConfig, MatchConfig, RuleConfig, SideConfig};
pub use error::PhalanxError;
pub use field::Field;
pub use game::{Match, MatchEvent, RunReport};

pub use phalanx_fsm as fsm;
pub use phalanx_pool as pool;
pub use phalanx_soldier as soldier;
pub use phalanx_tick as tick;

/// Everything needed to set up and run a match.
pub mod prelude {
    pub use crate::{Match, MatchConfig, MatchEvent, PhalanxError, RunReport};
    pub use glam::Vec3;
    pub use phalanx_pool::{KillOutcome, PoolConfig};
    pub use phalanx_soldier::{Faction, Role, SoldierConfig, SoldierId, World};
    pub use phalanx_tick::{TickConfig, TickScheduler};
}
