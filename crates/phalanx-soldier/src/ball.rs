//! The ball: the one resource soldiers compete for.

use std::fmt;

use glam::Vec3;

use crate::SoldierId;

/// Identifies one ball placement. A ball that is removed and placed
/// again gets a new id, so states holding an old id notice the swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BallId(pub u32);

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B-{}", self.0)
    }
}

/// A ball with at most one holder.
///
/// Ownership changes are plain replacements: `attach` overwrites the
/// holder and `detach` clears it, both immediately visible to whoever
/// queries the ball next.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    id: BallId,
    position: Vec3,
    holder: Option<SoldierId>,
}

impl Ball {
    pub fn new(id: BallId, position: Vec3) -> Self {
        Self {
            id,
            position,
            holder: None,
        }
    }

    pub fn id(&self) -> BallId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_attached(&self) -> bool {
        self.holder.is_some()
    }

    pub fn holder(&self) -> Option<SoldierId> {
        self.holder
    }

    pub fn is_held_by(&self, soldier: SoldierId) -> bool {
        self.holder == Some(soldier)
    }

    pub fn squared_distance_to(&self, point: Vec3) -> f32 {
        self.position.distance_squared(point)
    }

    /// Gives the ball to `holder`. Returns the previous holder, if any.
    pub fn attach(&mut self, holder: SoldierId) -> Option<SoldierId> {
        self.holder.replace(holder)
    }

    /// Drops the ball where it is. Returns the holder it had.
    pub fn detach(&mut self) -> Option<SoldierId> {
        self.holder.take()
    }

    /// Moves the ball along with its holder.
    pub fn carry_to(&mut self, position: Vec3) {
        self.position = position;
    }
}
