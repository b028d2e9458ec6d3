//! Parent-relative poses.
//!
//! A [`Transform`] stores its pose relative to an optional parent
//! [`Frame`] and exposes world-space accessors on top. Nothing here
//! simulates physics; it only composes rigid frames.

use glam::{Quat, Vec3};

/// A rigid reference frame (translation + rotation) instances can be
/// parented to. Fields and pools each own one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Frame {
    /// The world frame.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// A frame translated from the world origin, with no rotation.
    pub fn at(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Converts a point in this frame to world space.
    pub fn point_to_world(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation * local
    }

    /// Converts a world-space point into this frame.
    pub fn point_to_local(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.translation)
    }

    pub fn rotation_to_world(&self, local: Quat) -> Quat {
        self.rotation * local
    }

    pub fn rotation_to_local(&self, world: Quat) -> Quat {
        self.rotation.inverse() * world
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Position, rotation and scale relative to an optional parent frame.
///
/// `forward` is +Z, matching the ground-plane convention used by the
/// soldier movement code (y is up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    parent: Option<Frame>,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            parent: None,
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// An unparented transform at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            local_position: position,
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<&Frame> {
        self.parent.as_ref()
    }

    /// Re-parents the transform, keeping its world position and rotation.
    pub fn set_parent(&mut self, parent: Option<Frame>) {
        let position = self.position();
        let rotation = self.rotation();
        self.parent = parent;
        self.set_position(position);
        self.set_rotation(rotation);
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        match &self.parent {
            Some(frame) => frame.point_to_world(self.local_position),
            None => self.local_position,
        }
    }

    pub fn set_position(&mut self, world: Vec3) {
        self.local_position = match &self.parent {
            Some(frame) => frame.point_to_local(world),
            None => world,
        };
    }

    /// World-space rotation.
    pub fn rotation(&self) -> Quat {
        match &self.parent {
            Some(frame) => frame.rotation_to_world(self.local_rotation),
            None => self.local_rotation,
        }
    }

    pub fn set_rotation(&mut self, world: Quat) {
        self.local_rotation = match &self.parent {
            Some(frame) => frame.rotation_to_local(world),
            None => world,
        };
    }

    /// World-space forward (+Z) direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    /// Turns the transform about the vertical axis so that `forward`
    /// points along `direction` projected onto the ground plane.
    ///
    /// A direction with no horizontal component leaves the rotation as is.
    pub fn face(&mut self, direction: Vec3) {
        if direction.x == 0.0 && direction.z == 0.0 {
            return;
        }
        let yaw = direction.x.atan2(direction.z);
        self.set_rotation(Quat::from_rotation_y(yaw));
    }

    /// Moves the transform by a world-space offset.
    pub fn translate(&mut self, offset: Vec3) {
        let position = self.position() + offset;
        self.set_position(position);
    }

    /// Zero position, identity rotation and unit scale in the parent frame.
    pub fn reset_local(&mut self) {
        self.local_position = Vec3::ZERO;
        self.local_rotation = Quat::IDENTITY;
        self.local_scale = Vec3::ONE;
    }
}
