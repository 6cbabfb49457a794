#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that advances a tower's projectiles and reclaims spent ones.

use std::time::Duration;

use tower_defence_core::Projectile;
use tracing::trace;

/// Ordered collection of projectiles launched by a single tower.
///
/// There is no capacity limit; reclamation on every tick is what keeps the
/// collection bounded.
#[derive(Debug)]
pub struct ProjectileLifecycle<P> {
    projectiles: Vec<P>,
}

impl<P> Default for ProjectileLifecycle<P> {
    fn default() -> Self {
        Self {
            projectiles: Vec::new(),
        }
    }
}

impl<P: Projectile> ProjectileLifecycle<P> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a freshly launched projectile.
    pub fn launch(&mut self, projectile: P) {
        self.projectiles.push(projectile);
    }

    /// Advances every owned projectile once, then drops those no longer visible.
    ///
    /// Launch order is preserved among the survivors. Returns how many
    /// projectiles were reclaimed.
    pub fn handle(&mut self, dt: Duration) -> usize {
        let before = self.projectiles.len();
        self.projectiles.retain_mut(|projectile| {
            projectile.advance(dt);
            projectile.is_visible()
        });

        let reclaimed = before - self.projectiles.len();
        if reclaimed > 0 {
            trace!(reclaimed, remaining = self.projectiles.len(), "projectiles reclaimed");
        }
        reclaimed
    }

    /// Iterator over the owned projectiles in launch order.
    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.projectiles.iter()
    }

    /// Mutable iterator over the owned projectiles in launch order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut P> {
        self.projectiles.iter_mut()
    }

    /// Number of projectiles currently owned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }
}
