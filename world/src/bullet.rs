//! Straight-flying projectile that damages the first living enemy it touches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tower_defence_core::{EnemyId, Projectile, TowerId};

use crate::EnemyRoster;

/// Visible rectangle of the field; projectiles leaving it are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    /// Lower-left corner of the visible area.
    pub min: Vec2,
    /// Upper-right corner of the visible area.
    pub max: Vec2,
}

impl Arena {
    /// Creates an arena spanning the provided corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Reports whether the point lies inside the arena, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Reports whether something at `position` is outside the arena and still
    /// moving farther away along `velocity`.
    ///
    /// Entities waiting beyond an edge while heading inward are not leaving.
    #[must_use]
    pub fn is_leaving(&self, position: Vec2, velocity: Vec2) -> bool {
        let below = position.cmplt(self.min) & velocity.cmplt(Vec2::ZERO);
        let above = position.cmpgt(self.max) & velocity.cmpgt(Vec2::ZERO);
        (below | above).any()
    }
}

/// Flight characteristics shared by every bullet a tower fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletConfig {
    /// Distance covered per second.
    pub speed: f32,
    /// Collision radius around the bullet's position.
    pub radius: f32,
    /// Time after which an unspent bullet fizzles out.
    pub lifetime: Duration,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 400.0,
            radius: 4.0,
            lifetime: Duration::from_secs(2),
        }
    }
}

/// Projectile travelling in a straight line fixed at launch.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    owner: TowerId,
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    damage: f32,
    remaining: Duration,
    arena: Arena,
    visible: bool,
}

impl Bullet {
    /// Launches a bullet from `origin` toward the point `target` occupied at launch time.
    #[must_use]
    pub fn aimed(
        owner: TowerId,
        origin: Vec2,
        target: Vec2,
        damage: f32,
        config: BulletConfig,
        arena: Arena,
    ) -> Self {
        let direction = (target - origin).normalize_or_zero();
        Self {
            owner,
            position: origin,
            velocity: direction * config.speed,
            radius: config.radius,
            damage,
            remaining: config.lifetime,
            arena,
            visible: true,
        }
    }

    /// Tower that fired the bullet.
    #[must_use]
    pub const fn owner(&self) -> TowerId {
        self.owner
    }

    /// Current position of the bullet.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity fixed at launch.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Damage applied on impact.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Damages the first living enemy the bullet overlaps and spends the bullet.
    ///
    /// Returns the enemy that was struck, if any.
    pub fn resolve_hit(&mut self, roster: &mut EnemyRoster) -> Option<EnemyId> {
        if !self.visible {
            return None;
        }

        let struck = roster
            .iter()
            .find(|(_, enemy)| enemy.is_alive() && enemy.overlaps(self.position, self.radius))
            .map(|(id, _)| id)?;

        let _ = roster.apply_damage(struck, self.damage);
        self.visible = false;
        Some(struck)
    }
}

impl Projectile for Bullet {
    fn advance(&mut self, dt: Duration) {
        if !self.visible {
            return;
        }

        self.position += self.velocity * dt.as_secs_f32();
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() || !self.arena.contains(self.position) {
            self.visible = false;
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}
