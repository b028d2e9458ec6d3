//! The pool: free/live bookkeeping for one prototype.

use std::fmt;

use glam::{Quat, Vec3};
use tracing::{debug, trace, warn};

use crate::{Frame, PoolConfig, Transform};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Handle to an instance created by a [`Pool`].
///
/// `index` names a storage slot; `generation` advances every time the
/// instance in that slot is destroyed, so a handle to a destroyed instance
/// never aliases whatever is created in the slot afterwards. Recycling an
/// instance keeps its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId {
    pub index: u32,
    pub generation: u32,
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I-{}.{}", self.index, self.generation)
    }
}

/// Where an instance currently is, as far as its pool knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceStatus {
    /// Parked in the pool, waiting to be spawned.
    Free,
    /// Spawned and on loan to a caller.
    Live,
    /// Dropped by the pool; the handle is dead.
    Destroyed,
}

/// What [`Pool::kill`] did with an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// Deactivated and returned to the free set.
    Recycled,
    /// Dropped because the free set was already at initial capacity.
    Destroyed,
    /// Not live in this pool; nothing changed.
    Foreign,
}

// ---------------------------------------------------------------------------
// Instance hooks
// ---------------------------------------------------------------------------

/// Hooks a pooled type exposes to its pool.
pub trait Poolable {
    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    /// Called after the spawn pose is applied. `id` is the handle the
    /// caller receives.
    fn on_activate(&mut self, _id: InstanceId) {}

    /// Called when the instance is parked (at creation and on recycle).
    fn on_deactivate(&mut self) {}
}

/// Creates fresh instances for a pool.
pub trait Prototype<T> {
    fn instantiate(&self) -> T;
}

impl<T, F> Prototype<T> for F
where
    F: Fn() -> T,
{
    fn instantiate(&self) -> T {
        self()
    }
}

// ---------------------------------------------------------------------------
// Spawn pose
// ---------------------------------------------------------------------------

/// Where and how a spawned instance is placed.
///
/// `position` and `rotation` are interpreted in the parent frame when the
/// matching `local_*` flag is set, and in world space otherwise. `scale`
/// is always local.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub parent: Option<Frame>,
    pub local_position: bool,
    pub local_rotation: bool,
}

impl SpawnPose {
    /// World-space position, no rotation, unit scale, no parent.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent: None,
            local_position: false,
            local_rotation: false,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_parent(mut self, parent: Frame) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Interpret `position` in the parent frame.
    pub fn local_position(mut self) -> Self {
        self.local_position = true;
        self
    }

    /// Interpret `rotation` in the parent frame.
    pub fn local_rotation(mut self) -> Self {
        self.local_rotation = true;
        self
    }

    fn apply(&self, transform: &mut Transform) {
        transform.set_parent(self.parent);
        if self.local_position {
            transform.local_position = self.position;
        } else {
            transform.set_position(self.position);
        }
        if self.local_rotation {
            transform.local_rotation = self.rotation;
        } else {
            transform.set_rotation(self.rotation);
        }
        transform.local_scale = self.scale;
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Running counters for a pool. Never reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances ever created, pre-warmed ones included.
    pub created: u64,
    /// Instances created on spawn because the free set was empty.
    pub overflow_created: u64,
    /// Kills that returned an instance to the free set.
    pub recycled: u64,
    /// Kills that dropped an instance.
    pub destroyed: u64,
    /// Spawns refused because the pool was exhausted and not extendable.
    pub exhausted: u64,
    /// Kills of instances that were not live in this pool.
    pub foreign: u64,
}

// ---------------------------------------------------------------------------
// Pool
// ---------------------------------------------------------------------------

struct Slot<T> {
    generation: u32,
    instance: Option<T>,
}

/// Owns every instance of one prototype and lends live ones out.
///
/// Key invariant: each instance the pool holds is referenced by exactly
/// one of `free` or `live`. A slot whose `instance` is `None` is vacant
/// and reused for the next overflow creation.
pub struct Pool<T, P> {
    config: PoolConfig,
    prototype: P,
    anchor: Frame,
    slots: Vec<Slot<T>>,
    /// Parked instances. Spawn pops from the end.
    free: Vec<u32>,
    /// Spawned instances, oldest first.
    live: Vec<InstanceId>,
    /// Slots whose instance was destroyed.
    vacant: Vec<u32>,
    stats: PoolStats,
}

impl<T, P> Pool<T, P>
where
    T: Poolable,
    P: Prototype<T>,
{
    /// Builds a pool anchored at the world origin.
    pub fn new(config: PoolConfig, prototype: P) -> Self {
        Self::with_anchor(config, prototype, Frame::IDENTITY)
    }

    /// Builds a pool whose free instances are parked under `anchor`, and
    /// pre-warms `initial_capacity` instances.
    pub fn with_anchor(config: PoolConfig, prototype: P, anchor: Frame) -> Self {
        let config = config.validated();
        let mut pool = Self {
            config,
            prototype,
            anchor,
            slots: Vec::with_capacity(config.initial_capacity),
            free: Vec::with_capacity(config.initial_capacity),
            live: Vec::new(),
            vacant: Vec::new(),
            stats: PoolStats::default(),
        };

        for _ in 0..config.initial_capacity {
            let id = pool.create();
            if let Some(instance) = pool.instance_mut(id) {
                park(instance, anchor);
            }
            pool.free.push(id.index);
        }

        debug!(
            capacity = config.initial_capacity,
            extendable = config.extendable,
            reusable = config.reusable,
            "pool created"
        );
        pool
    }

    /// Brings an instance to life at `pose`.
    ///
    /// Takes a free instance if there is one, otherwise creates one when
    /// the pool is extendable. Returns `None` when the pool is exhausted;
    /// the pool is left untouched in that case.
    pub fn spawn(&mut self, pose: SpawnPose) -> Option<InstanceId> {
        let id = match self.free.pop() {
            Some(index) => self.id_at(index),
            None if !self.config.extendable => {
                self.stats.exhausted += 1;
                debug!(
                    live = self.live.len(),
                    "pool exhausted, spawn refused"
                );
                return None;
            }
            None => {
                let id = self.create();
                self.stats.overflow_created += 1;
                trace!(%id, live = self.live.len(), "pool overflow, created instance");
                id
            }
        };

        let instance = self.instance_mut(id)?;
        pose.apply(instance.transform_mut());
        instance.on_activate(id);
        self.live.push(id);

        trace!(%id, live = self.live.len(), free = self.free.len(), "spawned");
        Some(id)
    }

    /// Takes a live instance back.
    ///
    /// Instances that are not live in this pool (never issued, already
    /// killed, or destroyed) are left alone and reported as
    /// [`KillOutcome::Foreign`].
    pub fn kill(&mut self, id: InstanceId) -> KillOutcome {
        let Some(position) = self.live.iter().position(|live| *live == id) else {
            self.stats.foreign += 1;
            warn!(%id, "kill requested for an instance this pool has not lent out");
            return KillOutcome::Foreign;
        };
        self.live.remove(position);

        if self.config.sheds_at(self.free.len()) {
            self.destroy(id);
            self.stats.destroyed += 1;
            trace!(%id, free = self.free.len(), "free set full, instance destroyed");
            return KillOutcome::Destroyed;
        }

        let anchor = self.anchor;
        if let Some(instance) = self.instance_mut(id) {
            park(instance, anchor);
        }
        self.free.push(id.index);
        self.stats.recycled += 1;
        trace!(%id, free = self.free.len(), "instance recycled");
        KillOutcome::Recycled
    }

    /// Whether `id` is currently lent out by this pool.
    pub fn is_responsible_for(&self, id: InstanceId) -> bool {
        self.live.contains(&id)
    }

    /// The most recently spawned instance that is still live.
    pub fn retrieve_live(&self) -> Option<InstanceId> {
        self.live.last().copied()
    }

    /// Where `id` stands. `None` means the pool never issued it.
    pub fn status(&self, id: InstanceId) -> Option<InstanceStatus> {
        let slot = self.slots.get(id.index as usize)?;
        if id.generation < slot.generation {
            return Some(InstanceStatus::Destroyed);
        }
        if id.generation > slot.generation || slot.instance.is_none() {
            return None;
        }
        if self.live.contains(&id) {
            Some(InstanceStatus::Live)
        } else {
            Some(InstanceStatus::Free)
        }
    }

    /// Borrows a live instance.
    pub fn get(&self, id: InstanceId) -> Option<&T> {
        if !self.is_responsible_for(id) {
            return None;
        }
        self.slots.get(id.index as usize)?.instance.as_ref()
    }

    /// Mutably borrows a live instance.
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut T> {
        if !self.is_responsible_for(id) {
            return None;
        }
        self.instance_mut(id)
    }

    /// Live instance handles, oldest first.
    pub fn live(&self) -> &[InstanceId] {
        &self.live
    }

    /// Live instances with their handles, oldest first.
    pub fn iter_live(&self) -> impl Iterator<Item = (InstanceId, &T)> + '_ {
        self.live.iter().filter_map(|id| {
            self.slots
                .get(id.index as usize)
                .and_then(|slot| slot.instance.as_ref())
                .map(|instance| (*id, instance))
        })
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn anchor(&self) -> &Frame {
        &self.anchor
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    fn create(&mut self) -> InstanceId {
        let instance = self.prototype.instantiate();
        self.stats.created += 1;

        if let Some(index) = self.vacant.pop() {
            let slot = &mut self.slots[index as usize];
            slot.instance = Some(instance);
            return InstanceId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            instance: Some(instance),
        });
        InstanceId {
            index,
            generation: 0,
        }
    }

    fn destroy(&mut self, id: InstanceId) {
        if let Some(slot) = self.slots.get_mut(id.index as usize) {
            slot.instance = None;
            slot.generation += 1;
            self.vacant.push(id.index);
        }
    }

    fn id_at(&self, index: u32) -> InstanceId {
        InstanceId {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn instance_mut(&mut self, id: InstanceId) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.instance.as_mut()
    }
}

/// Deactivates an instance and returns it to the neutral pose under `anchor`.
fn park<T: Poolable>(instance: &mut T, anchor: Frame) {
    instance.on_deactivate();
    let transform = instance.transform_mut();
    transform.set_parent(Some(anchor));
    transform.reset_local();
}
