//! Scenario files describing the arena, the towers and the incoming waves.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tower_defence_core::TowerKind;
use tower_defence_world::{Arena, EnemySpawn};

const DEFAULT_TOWER_SIZE: Vec2 = Vec2::splat(32.0);
const DEFAULT_ENEMY_SIZE: Vec2 = Vec2::splat(16.0);
const DEFAULT_RANGE_STEP: f32 = 10.0;

/// Complete description of a headless simulation run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    pub(crate) arena: Arena,
    #[serde(default)]
    pub(crate) towers: Vec<TowerPlacement>,
    #[serde(default)]
    pub(crate) waves: Vec<Wave>,
}

/// Tower placed before the simulation starts.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TowerPlacement {
    pub(crate) kind: TowerKind,
    pub(crate) position: Vec2,
    #[serde(default = "default_tower_size")]
    pub(crate) size: Vec2,
    #[serde(default)]
    pub(crate) upgrades: Upgrades,
}

/// Upgrades purchased for a tower before the run.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Upgrades {
    pub(crate) damage: u32,
    pub(crate) range: u32,
    pub(crate) speed: u32,
    pub(crate) range_step: f32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            damage: 0,
            range: 0,
            speed: 0,
            range_step: DEFAULT_RANGE_STEP,
        }
    }
}

/// Group of identical enemies entering the arena in a line.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Wave {
    pub(crate) count: u32,
    pub(crate) spawn: Vec2,
    /// Offset between consecutive enemies of the wave.
    pub(crate) spacing: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) health: f32,
    #[serde(default = "default_enemy_size")]
    pub(crate) size: Vec2,
}

impl Wave {
    /// Expands the wave into individual spawn requests.
    pub(crate) fn spawns(&self) -> impl Iterator<Item = EnemySpawn> + '_ {
        (0..self.count).map(move |offset| EnemySpawn {
            position: self.spawn + self.spacing * offset as f32,
            size: self.size,
            velocity: self.velocity,
            health: self.health,
        })
    }
}

fn default_tower_size() -> Vec2 {
    DEFAULT_TOWER_SIZE
}

fn default_enemy_size() -> Vec2 {
    DEFAULT_ENEMY_SIZE
}

impl Scenario {
    /// Reads and validates the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Parses and validates a scenario from TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: Scenario =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Builds a random but reproducible scenario from `seed`.
    pub(crate) fn generated(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let arena = Arena::new(Vec2::ZERO, Vec2::new(800.0, 600.0));

        let towers = (0..3)
            .map(|slot| TowerPlacement {
                kind: TowerKind::ALL[rng.gen_range(0..TowerKind::ALL.len())],
                position: Vec2::new(
                    200.0 + 200.0 * slot as f32,
                    rng.gen_range(180.0..380.0),
                ),
                size: DEFAULT_TOWER_SIZE,
                upgrades: Upgrades {
                    damage: rng.gen_range(0..3),
                    speed: rng.gen_range(0..3),
                    ..Upgrades::default()
                },
            })
            .collect();

        let waves = (0..2)
            .map(|_| Wave {
                count: rng.gen_range(4..9),
                spawn: Vec2::new(0.0, rng.gen_range(200.0..400.0)),
                spacing: Vec2::new(-40.0, 0.0),
                velocity: Vec2::new(rng.gen_range(30.0..60.0), 0.0),
                health: rng.gen_range(3..7) as f32,
                size: DEFAULT_ENEMY_SIZE,
            })
            .collect();

        Self {
            arena,
            towers,
            waves,
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.arena.min.is_finite() && self.arena.max.is_finite()) {
            bail!(
                "arena corners {:?} and {:?} must be finite",
                self.arena.min,
                self.arena.max
            );
        }
        if !self.arena.min.cmplt(self.arena.max).all() {
            bail!(
                "arena min {:?} must lie below and left of max {:?}",
                self.arena.min,
                self.arena.max
            );
        }

        for (index, tower) in self.towers.iter().enumerate() {
            if !tower.position.is_finite() {
                bail!("tower #{index} has a non-finite position {:?}", tower.position);
            }
            if !(tower.size.is_finite() && tower.size.cmpgt(Vec2::ZERO).all()) {
                bail!("tower #{index} has a non-positive size {:?}", tower.size);
            }
        }

        for (index, wave) in self.waves.iter().enumerate() {
            for (field, value) in [
                ("spawn", wave.spawn),
                ("spacing", wave.spacing),
                ("velocity", wave.velocity),
            ] {
                if !value.is_finite() {
                    bail!("wave #{index} has a non-finite {field} {value:?}");
                }
            }
            if !(wave.size.is_finite() && wave.size.cmpgt(Vec2::ZERO).all()) {
                bail!("wave #{index} has a non-positive size {:?}", wave.size);
            }
            if !(wave.health.is_finite() && wave.health > 0.0) {
                bail!("wave #{index} has non-positive health {}", wave.health);
            }
        }

        Ok(())
    }
}
