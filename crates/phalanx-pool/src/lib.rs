//! Instance pooling for Phalanx.
//!
//! A [`Pool`] owns every instance of one prototype. Instances are either
//! *free* (parked under the pool's anchor frame, deactivated) or *live*
//! (lent to whoever spawned them). Spawning prefers a free instance over
//! creating a new one, so a warmed-up pool never allocates during a match.
//!
//! # Policies
//!
//! Two flags on [`PoolConfig`] cover the three regimes a game needs:
//!
//! | `extendable` | `reusable` | Behavior |
//! |---|---|---|
//! | `false` | any | fixed size; `spawn` returns `None` when exhausted |
//! | `true` | `true` | grows on demand, every released instance is kept |
//! | `true` | `false` | grows on demand, but never keeps more than `initial_capacity` spares |
//!
//! # Key types
//!
//! - [`Pool`]: the free/live bookkeeping
//! - [`Poolable`]: the hooks an instance type provides
//! - [`Prototype`]: how new instances are made
//! - [`Transform`] / [`Frame`]: parent-relative pose applied on spawn

mod config;
mod pool;
mod transform;

pub use config::PoolConfig;
pub use pool::{
    InstanceId, InstanceStatus, KillOutcome, Pool, PoolStats, Poolable, Prototype,
    SpawnPose,
};
pub use transform::{Frame, Transform};
