//! Upgradeable tower statistics and their price counters.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Factor applied to the attack rate by every speed upgrade.
pub const ATTACK_RATE_GROWTH: f32 = 1.1;

/// Reasons a tower statistic may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum StatsError {
    /// Attack rate must be a finite, strictly positive number of shots per second.
    #[error("attack rate {0} must be finite and greater than zero")]
    InvalidAttackRate(f32),
    /// Range must be finite and non-negative.
    #[error("range {0} must be finite and non-negative")]
    InvalidRange(f32),
    /// Damage must be finite and non-negative.
    #[error("damage {0} must be finite and non-negative")]
    InvalidDamage(f32),
    /// A range upgrade would leave the tower with an invalid range.
    #[error("range increase of {0} is not a finite amount")]
    InvalidRangeIncrease(f32),
}

/// Combat statistics of a single tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    range: f32,
    damage: f32,
    attack_rate: f32,
    fire_period: Duration,
}

impl TowerStats {
    /// Creates validated tower statistics.
    pub fn new(range: f32, damage: f32, attack_rate: f32) -> Result<Self, StatsError> {
        if !range.is_finite() || range < 0.0 {
            return Err(StatsError::InvalidRange(range));
        }
        if !damage.is_finite() || damage < 0.0 {
            return Err(StatsError::InvalidDamage(damage));
        }
        let fire_period = period_for(attack_rate)?;

        Ok(Self {
            range,
            damage,
            attack_rate,
            fire_period,
        })
    }

    /// Targeting radius measured in world units.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Damage dealt by a single discrete attack.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Number of discrete attacks per second.
    #[must_use]
    pub const fn attack_rate(&self) -> f32 {
        self.attack_rate
    }

    /// Minimum time that must accumulate between two discrete attacks.
    #[must_use]
    pub const fn fire_period(&self) -> Duration {
        self.fire_period
    }

    /// Adds a single point of damage.
    pub fn increase_damage(&mut self) {
        self.damage += 1.0;
    }

    /// Widens the targeting radius by `delta` world units.
    ///
    /// Negative deltas are accepted as long as the resulting range stays
    /// non-negative; the stats are left untouched on error.
    pub fn increase_range(&mut self, delta: f32) -> Result<(), StatsError> {
        if !delta.is_finite() {
            return Err(StatsError::InvalidRangeIncrease(delta));
        }
        let range = self.range + delta;
        if !range.is_finite() || range < 0.0 {
            return Err(StatsError::InvalidRange(range));
        }
        self.range = range;
        Ok(())
    }

    /// Compounds the attack rate by [`ATTACK_RATE_GROWTH`].
    ///
    /// Fails once the grown rate is no longer representable; the stats are
    /// left untouched on error.
    pub fn increase_attack_rate(&mut self) -> Result<(), StatsError> {
        let grown = self.attack_rate * ATTACK_RATE_GROWTH;
        self.fire_period = period_for(grown)?;
        self.attack_rate = grown;
        Ok(())
    }
}

fn period_for(attack_rate: f32) -> Result<Duration, StatsError> {
    if !attack_rate.is_finite() || attack_rate <= 0.0 {
        return Err(StatsError::InvalidAttackRate(attack_rate));
    }
    Duration::try_from_secs_f32(attack_rate.recip())
        .map_err(|_| StatsError::InvalidAttackRate(attack_rate))
}

/// Prices of the tower itself and of the next upgrade in each category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpgradePrices {
    tower: u32,
    range: u32,
    damage: u32,
    speed: u32,
}

impl UpgradePrices {
    /// Creates a price table from explicit values.
    #[must_use]
    pub const fn new(tower: u32, range: u32, damage: u32, speed: u32) -> Self {
        Self {
            tower,
            range,
            damage,
            speed,
        }
    }

    /// Price paid to construct the tower.
    #[must_use]
    pub const fn tower(&self) -> u32 {
        self.tower
    }

    /// Price of the next range upgrade.
    #[must_use]
    pub const fn range(&self) -> u32 {
        self.range
    }

    /// Price of the next damage upgrade.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Price of the next attack speed upgrade.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Records a purchased range upgrade.
    pub fn bump_range(&mut self) {
        self.range = self.range.saturating_add(1);
    }

    /// Records a purchased damage upgrade.
    pub fn bump_damage(&mut self) {
        self.damage = self.damage.saturating_add(1);
    }

    /// Records a purchased attack speed upgrade.
    pub fn bump_speed(&mut self) {
        self.speed = self.speed.saturating_add(1);
    }
}
