#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative enemy and projectile state for the tower defence engine.
//!
//! Towers never mutate enemies. The world owns them in an [`EnemyRoster`],
//! publishes an immutable [`EnemyView`](tower_defence_core::EnemyView) at the
//! start of every frame, and lets [`Bullet`] projectiles apply damage once all
//! towers have finished their tick.

mod bullet;
mod roster;

pub use bullet::{Arena, Bullet, BulletConfig};
pub use roster::{Enemy, EnemyRoster, EnemySpawn};
