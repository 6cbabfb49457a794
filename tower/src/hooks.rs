//! Capability set a concrete tower variant plugs into the combat loop.

use std::time::Duration;

use glam::Vec2;
use tower_defence_core::{EnemyId, Projectile, TowerId, TowerKind};
use tower_defence_system_tower_targeting::LossReason;

/// Attack parameters handed to the firing hooks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Tower performing the attack.
    pub tower: TowerId,
    /// Kind of the attacking tower.
    pub kind: TowerKind,
    /// Center of the attacking tower.
    pub origin: Vec2,
    /// Enemy being attacked.
    pub target: EnemyId,
    /// Center of the enemy at the moment of the attack.
    pub target_center: Vec2,
    /// Damage the tower currently deals.
    pub damage: f32,
}

/// Hooks the tower dispatches to; variants define every behaviour themselves.
pub trait TowerHooks {
    /// Projectile type produced by discrete attacks.
    type Projectile: Projectile;

    /// Launches one projectile when the attack cadence elapses.
    fn discrete_fire(&mut self, shot: &Shot) -> Self::Projectile;

    /// Applies the every-tick effect while a target is engaged.
    fn continuous_fire(&mut self, shot: &Shot, dt: Duration);

    /// Reacts to locking onto a new target.
    fn target_found(&mut self, target: EnemyId);

    /// Reacts to releasing the previous target.
    fn target_lost(&mut self, target: EnemyId, reason: LossReason);
}
