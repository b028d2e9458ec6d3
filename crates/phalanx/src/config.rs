//! Match configuration, loaded once from JSON.

use std::path::Path;

use glam::Vec3;
use phalanx_pool::PoolConfig;
use phalanx_soldier::{ArenaLayout, Faction, SideLayout, SoldierConfig};
use phalanx_tick::TickConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::PhalanxError;

// ---------------------------------------------------------------------------
// FieldConfig
// ---------------------------------------------------------------------------

/// A faction's half of the arena: a rectangle on the ground plane,
/// centered on `origin` and turned `yaw_degrees` about the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub origin: Vec3,
    pub yaw_degrees: f32,
    /// Half the extent along the field's local X axis.
    pub half_width: f32,
    /// Half the extent along the field's local Z axis.
    pub half_depth: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            yaw_degrees: 0.0,
            half_width: 5.0,
            half_depth: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// ArenaConfig
// ---------------------------------------------------------------------------

/// One faction's gate, fence and field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideConfig {
    pub gate: Vec3,
    pub fence: Vec3,
    #[serde(default)]
    pub field: FieldConfig,
}

impl SideConfig {
    fn default_for(faction: Faction) -> Self {
        let sign = match faction {
            Faction::Blue => -1.0,
            Faction::Red => 1.0,
        };
        Self {
            gate: Vec3::new(0.0, 0.0, 10.0 * sign),
            fence: Vec3::new(0.0, 0.0, 10.0 * sign),
            field: FieldConfig {
                origin: Vec3::new(0.0, 0.0, 5.0 * sign),
                ..FieldConfig::default()
            },
        }
    }

    fn layout(&self) -> SideLayout {
        SideLayout {
            gate: self.gate,
            fence: self.fence,
        }
    }
}

/// Arena geometry and who attacks first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub attacker: Faction,
    pub blue: SideConfig,
    pub red: SideConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            attacker: Faction::Blue,
            blue: SideConfig::default_for(Faction::Blue),
            red: SideConfig::default_for(Faction::Red),
        }
    }
}

impl ArenaConfig {
    pub fn side(&self, faction: Faction) -> &SideConfig {
        match faction {
            Faction::Blue => &self.blue,
            Faction::Red => &self.red,
        }
    }

    /// The part of the arena the soldiers' world needs.
    pub fn layout(&self) -> ArenaLayout {
        ArenaLayout {
            attacker: self.attacker,
            blue: self.blue.layout(),
            red: self.red.layout(),
        }
    }
}

// ---------------------------------------------------------------------------
// RuleConfig
// ---------------------------------------------------------------------------

/// Thresholds the match applies after every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Squared distance from the opposing gate at which a carrier scores.
    pub goal_radius_sq: f32,
    /// How close (along Z) an attacker without the ball must get to the
    /// opposing fence to be taken off the field.
    pub fence_tolerance: f32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            goal_radius_sq: 0.25,
            fence_tolerance: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Everything a match needs. Every section may be omitted from the JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Tick rate in Hz for [`crate::Match::run`]. 0 = manual stepping.
    pub tick_rate_hz: u32,
    pub pool: PoolConfig,
    pub soldier: SoldierConfig,
    pub arena: ArenaConfig,
    pub rules: RuleConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 30,
            pool: PoolConfig::default(),
            soldier: SoldierConfig::default(),
            arena: ArenaConfig::default(),
            rules: RuleConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Parses, checks and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, PhalanxError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config.validated())
    }

    /// Reads and parses a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhalanxError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), "match config loaded");
        Ok(config)
    }

    /// Rejects arenas no match can be played on.
    pub fn check(&self) -> Result<(), PhalanxError> {
        let (blue, red) = (&self.arena.blue, &self.arena.red);
        if blue.gate == red.gate {
            return Err(PhalanxError::InvalidConfig(
                "blue and red gates are the same point".into(),
            ));
        }
        if blue.fence.z == red.fence.z {
            return Err(PhalanxError::InvalidConfig(
                "blue and red fences share a z coordinate".into(),
            ));
        }
        let points = [blue.gate, blue.fence, red.gate, red.fence];
        if points.iter().any(|p| !p.is_finite()) {
            return Err(PhalanxError::InvalidConfig(
                "gate and fence points must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Clamps out-of-range values, warning for each, instead of failing.
    pub fn validated(mut self) -> Self {
        self.tick_rate_hz = TickConfig::with_rate(self.tick_rate_hz)
            .validated()
            .tick_rate_hz;
        self.pool = self.pool.validated();
        self.soldier = self.soldier.validated();

        for (faction, side) in [
            (Faction::Blue, &mut self.arena.blue),
            (Faction::Red, &mut self.arena.red),
        ] {
            let field = &mut side.field;
            if !(field.half_width.is_finite() && field.half_width > 0.0) {
                warn!(%faction, value = field.half_width, "invalid field half_width, using 0.5");
                field.half_width = 0.5;
            }
            if !(field.half_depth.is_finite() && field.half_depth > 0.0) {
                warn!(%faction, value = field.half_depth, "invalid field half_depth, using 0.5");
                field.half_depth = 0.5;
            }
            if !field.yaw_degrees.is_finite() {
                warn!(%faction, "invalid field yaw, using 0");
                field.yaw_degrees = 0.0;
            }
        }

        let rules = &mut self.rules;
        if !(rules.goal_radius_sq.is_finite() && rules.goal_radius_sq >= 0.0) {
            warn!(value = rules.goal_radius_sq, "invalid goal_radius_sq, using default");
            rules.goal_radius_sq = RuleConfig::default().goal_radius_sq;
        }
        if !(rules.fence_tolerance.is_finite() && rules.fence_tolerance >= 0.0) {
            warn!(value = rules.fence_tolerance, "invalid fence_tolerance, using default");
            rules.fence_tolerance = RuleConfig::default().fence_tolerance;
        }
        self
    }

    /// Scheduler settings for [`crate::Match::run`].
    pub fn tick_config(&self) -> TickConfig {
        TickConfig::with_rate(self.tick_rate_hz)
    }
}
