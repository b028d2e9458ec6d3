//! Movement and detection tuning per role.
//!
//! Speeds are world units per second and are applied to unit directions
//! scaled by the tick's `dt`. Distances are compared squared.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tuning for soldiers on the attacking side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackerTuning {
    /// Speed while walking or chasing a loose ball.
    pub normal_speed: f32,
    /// Speed while carrying the ball to the goal.
    pub carry_speed: f32,
    /// Squared distance at which a loose ball is picked up.
    pub capture_distance_sq: f32,
    /// Seconds an inactive attacker waits before reactivating on its own.
    /// `None` keeps it inactive until activated from outside.
    pub reactivate_after: Option<f32>,
}

impl Default for AttackerTuning {
    fn default() -> Self {
        Self {
            normal_speed: 1.5,
            carry_speed: 2.25,
            capture_distance_sq: 0.25,
            reactivate_after: None,
        }
    }
}

/// Tuning for soldiers on the defending side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenderTuning {
    /// Speed while walking back home.
    pub normal_speed: f32,
    /// Speed while chasing the ball carrier.
    pub chase_speed: f32,
    /// Squared distance at which a standing defender notices the carrier.
    pub detection_distance_sq: f32,
    /// Squared distance at which a chasing defender catches the carrier.
    pub catch_distance_sq: f32,
    /// Squared distance from home that counts as being home.
    pub home_tolerance_sq: f32,
    /// Seconds an inactive defender waits before reactivating on its own.
    pub reactivate_after: Option<f32>,
}

impl Default for DefenderTuning {
    fn default() -> Self {
        Self {
            normal_speed: 1.0,
            chase_speed: 2.0,
            detection_distance_sq: 9.0,
            catch_distance_sq: 0.36,
            home_tolerance_sq: 0.0025,
            reactivate_after: Some(4.0),
        }
    }
}

/// Tuning for both roles. A soldier carries both, since its role is only
/// known once it is assigned to a side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoldierConfig {
    pub attacker: AttackerTuning,
    pub defender: DefenderTuning,
}

impl SoldierConfig {
    /// Replaces negative or non-finite values with zero (speeds,
    /// distances) or `None` (timers), warning for each.
    pub fn validated(mut self) -> Self {
        let a = &mut self.attacker;
        sanitize("attacker.normal_speed", &mut a.normal_speed);
        sanitize("attacker.carry_speed", &mut a.carry_speed);
        sanitize("attacker.capture_distance_sq", &mut a.capture_distance_sq);
        sanitize_timer("attacker.reactivate_after", &mut a.reactivate_after);

        let d = &mut self.defender;
        sanitize("defender.normal_speed", &mut d.normal_speed);
        sanitize("defender.chase_speed", &mut d.chase_speed);
        sanitize("defender.detection_distance_sq", &mut d.detection_distance_sq);
        sanitize("defender.catch_distance_sq", &mut d.catch_distance_sq);
        sanitize("defender.home_tolerance_sq", &mut d.home_tolerance_sq);
        sanitize_timer("defender.reactivate_after", &mut d.reactivate_after);
        self
    }
}

fn sanitize(field: &'static str, value: &mut f32) {
    if !value.is_finite() || *value < 0.0 {
        warn!(field, value = *value, "invalid soldier tuning, using 0");
        *value = 0.0;
    }
}

fn sanitize_timer(field: &'static str, value: &mut Option<f32>) {
    if let Some(secs) = *value {
        if !secs.is_finite() || secs < 0.0 {
            warn!(field, value = secs, "invalid reactivation timer, disabling");
            *value = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carry_is_faster_than_walking() {
        let tuning = AttackerTuning::default();
        assert!(tuning.carry_speed > tuning.normal_speed);
    }

    #[test]
    fn test_defaults_survive_validation() {
        let config = SoldierConfig::default();
        assert_eq!(config.validated(), config);
    }

    #[test]
    fn test_validated_zeroes_bad_values() {
        let mut config = SoldierConfig::default();
        config.attacker.normal_speed = -3.0;
        config.defender.catch_distance_sq = f32::NAN;
        config.defender.reactivate_after = Some(-1.0);

        let config = config.validated();
        assert_eq!(config.attacker.normal_speed, 0.0);
        assert_eq!(config.defender.catch_distance_sq, 0.0);
        assert_eq!(config.defender.reactivate_after, None);
    }
}
