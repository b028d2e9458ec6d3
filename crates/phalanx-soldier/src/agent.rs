//! The context states run against.

use glam::Vec3;
use phalanx_pool::Transform;

use crate::{Ball, SoldierConfig, SoldierId, World};

/// Presentation toggles the states flip. Rendering reads them; the core
/// only sets them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visuals {
    /// Drawn without faction colors while inactive.
    pub greyscale: bool,
    /// Detection ring around a standing defender.
    pub detection: bool,
    /// Marker on the ball carrier.
    pub highlight: bool,
    /// Arrow showing the walking direction.
    pub heading_arrow: bool,
}

impl Visuals {
    /// Everything that is not faction-driven off. Applied on every spawn.
    pub fn reset(&mut self) {
        self.detection = false;
        self.highlight = false;
        self.heading_arrow = false;
    }
}

/// The mutable part of a soldier that states work on.
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub transform: Transform,
    pub visuals: Visuals,
    /// Where the soldier stood when it was assigned to a side.
    pub home: Vec3,
}

/// Everything a state sees during one call: the soldier it drives, the
/// world, the tuning, and the tick's `dt` in seconds.
pub struct Agent<'a> {
    pub id: SoldierId,
    pub body: &'a mut Body,
    pub world: &'a mut dyn World,
    pub tuning: &'a SoldierConfig,
    pub dt: f32,
}

impl Agent<'_> {
    pub fn position(&self) -> Vec3 {
        self.body.transform.position()
    }

    /// The ball, if one is in play and nobody holds it.
    pub fn loose_ball(&self) -> Option<&Ball> {
        self.world.ball().filter(|ball| !ball.is_attached())
    }

    pub fn holds_ball(&self) -> bool {
        self.world
            .ball()
            .is_some_and(|ball| ball.is_held_by(self.id))
    }

    pub fn squared_distance_to(&self, point: Vec3) -> f32 {
        self.position().distance_squared(point)
    }

    /// Moves `speed * dt` along `direction`, which is expected to be a
    /// unit vector on the ground plane.
    pub fn advance(&mut self, direction: Vec3, speed: f32) {
        self.body.transform.translate(direction * speed * self.dt);
    }

    /// Turns toward `target` on the ground plane and moves toward it at
    /// `speed`, stopping on the target rather than passing it.
    ///
    /// Returns `false` if the target is straight above or below, in which
    /// case nothing moves.
    pub fn head_towards(&mut self, target: Vec3, speed: f32) -> bool {
        let offset = (target - self.position()).with_y(0.0);
        let Some(direction) = offset.try_normalize() else {
            return false;
        };
        self.body.transform.face(direction);
        let step = (speed * self.dt).min(offset.length());
        self.body.transform.translate(direction * step);
        true
    }
}
