//! A faction's half of the arena and the spawn poses it hands out.

use glam::{Quat, Vec3};
use phalanx_pool::{Frame, SpawnPose};
use phalanx_soldier::Faction;
use rand::Rng;

use crate::FieldConfig;

/// Where soldiers of one faction are put down.
///
/// A pointer ray hitting the ground gives a world-space point; the field
/// accepts it only if it lands inside its rectangle, and parents the
/// spawned soldier to its own frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    faction: Faction,
    frame: Frame,
    half_width: f32,
    half_depth: f32,
}

impl Field {
    pub fn new(faction: Faction, config: &FieldConfig) -> Self {
        let rotation = Quat::from_rotation_y(config.yaw_degrees.to_radians());
        Self {
            faction,
            frame: Frame::new(config.origin, rotation),
            half_width: config.half_width,
            half_depth: config.half_depth,
        }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Whether `point` lies over the field, ignoring height.
    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.frame.point_to_local(point);
        local.x.abs() <= self.half_width && local.z.abs() <= self.half_depth
    }

    /// Spawn pose for a soldier put down at `point`, or `None` if the
    /// point is off the field. Height is flattened onto the field.
    pub fn spawn_pose(&self, point: Vec3) -> Option<SpawnPose> {
        if !self.contains(point) {
            return None;
        }
        let local = self.frame.point_to_local(point).with_y(0.0);
        Some(
            SpawnPose::at(local)
                .with_parent(self.frame)
                .local_position()
                .local_rotation(),
        )
    }

    /// A uniformly random point on the field, in world space.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec3 {
        let local = Vec3::new(
            rng.random_range(-self.half_width..=self.half_width),
            0.0,
            rng.random_range(-self.half_depth..=self.half_depth),
        );
        self.frame.point_to_world(local)
    }
}
