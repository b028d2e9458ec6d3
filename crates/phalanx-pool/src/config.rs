//! Pool configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Static pool settings, read once when the pool is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Instances created up-front. Also the cap on retained spares for
    /// extendable, non-reusable pools.
    pub initial_capacity: usize,

    /// Create new instances when the free set is empty.
    pub extendable: bool,

    /// Keep released instances even when the free set is already at
    /// `initial_capacity`. Only meaningful when `extendable` is set.
    pub reusable: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 10,
            extendable: true,
            reusable: true,
        }
    }
}

impl PoolConfig {
    /// A fixed-size pool of `capacity` instances.
    pub fn fixed(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            extendable: false,
            reusable: true,
        }
    }

    /// A pool that grows past `capacity` and keeps everything it grew.
    pub fn elastic(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            extendable: true,
            reusable: true,
        }
    }

    /// A pool that grows past `capacity` but sheds the overflow on release.
    pub fn shedding(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            extendable: true,
            reusable: false,
        }
    }

    /// Fix out-of-range values so the config is safe to use.
    ///
    /// `initial_capacity` must be positive; zero is raised to one.
    pub fn validated(mut self) -> Self {
        if self.initial_capacity == 0 {
            warn!("pool initial_capacity is 0, raising to 1");
            self.initial_capacity = 1;
        }
        self
    }

    /// Whether a release should destroy the instance instead of keeping it,
    /// given how many instances are currently free.
    pub(crate) fn sheds_at(&self, free: usize) -> bool {
        self.extendable && !self.reusable && free >= self.initial_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_elastic() {
        let config = PoolConfig::default();
        assert_eq!(config.initial_capacity, 10);
        assert!(config.extendable);
        assert!(config.reusable);
    }

    #[test]
    fn test_validated_raises_zero_capacity() {
        let config = PoolConfig::fixed(0).validated();
        assert_eq!(config.initial_capacity, 1);
    }

    #[test]
    fn test_sheds_only_when_extendable_and_not_reusable() {
        assert!(PoolConfig::shedding(2).sheds_at(2));
        assert!(!PoolConfig::shedding(2).sheds_at(1));
        assert!(!PoolConfig::elastic(2).sheds_at(2));
        assert!(!PoolConfig::fixed(2).sheds_at(2));
    }
}
