//! Frame loop that drives towers against the enemy roster.

use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use tower_defence_core::{EnemyId, TowerId};
use tower_defence_tower::{Footprint, Tower};
use tower_defence_world::{Arena, EnemyRoster};
use tracing::{debug, info};

use crate::{arsenal::Arsenal, scenario::Scenario};

/// Totals gathered over a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Report {
    pub(crate) ticks: u32,
    pub(crate) shots: u32,
    pub(crate) hits: u32,
    pub(crate) kills: u32,
    pub(crate) escaped: u32,
    pub(crate) remaining: u32,
    pub(crate) arcing: u32,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks: {}, shots: {}, hits: {}, kills: {}, escaped: {}, remaining: {}, arcing towers: {}",
            self.ticks,
            self.shots,
            self.hits,
            self.kills,
            self.escaped,
            self.remaining,
            self.arcing
        )
    }
}

/// Headless world combining the enemy roster with the placed towers.
pub(crate) struct Simulation {
    arena: Arena,
    roster: EnemyRoster,
    towers: Vec<Tower<Arsenal>>,
    reaped: Vec<EnemyId>,
    report: Report,
}

impl Simulation {
    /// Places the scenario's towers, buys their upgrades and spawns every wave.
    pub(crate) fn new(scenario: &Scenario, double_speed: bool) -> Result<Self> {
        let mut towers = Vec::with_capacity(scenario.towers.len());
        for (index, placement) in scenario.towers.iter().enumerate() {
            let id = TowerId::new(u32::try_from(index).context("too many towers")?);
            let mut tower = Tower::new(
                id,
                placement.kind,
                Footprint::new(placement.position, placement.size),
                Arsenal::new(placement.kind, scenario.arena),
            )
            .with_context(|| format!("failed to build tower #{index}"))?;

            let upgrades = placement.upgrades;
            for _ in 0..upgrades.damage {
                tower.increase_damage();
            }
            for _ in 0..upgrades.range {
                tower
                    .increase_range(upgrades.range_step)
                    .with_context(|| format!("failed to upgrade range of tower #{index}"))?;
            }
            for _ in 0..upgrades.speed {
                tower
                    .increase_speed()
                    .with_context(|| format!("failed to upgrade speed of tower #{index}"))?;
            }
            if double_speed {
                tower.double_speed_clicked();
            }

            debug!(
                tower = id.get(),
                kind = ?tower.kind(),
                range = tower.range(),
                damage = tower.damage(),
                speed = tower.speed(),
                "tower placed"
            );
            towers.push(tower);
        }

        let mut roster = EnemyRoster::new();
        for spawn in scenario.waves.iter().flat_map(|wave| wave.spawns()) {
            let _ = roster.spawn(spawn);
        }

        Ok(Self {
            arena: scenario.arena,
            roster,
            towers,
            reaped: Vec::new(),
            report: Report::default(),
        })
    }

    /// Runs up to `ticks` frames, stopping early once the field is clear.
    pub(crate) fn run(&mut self, ticks: u32, dt: Duration) -> Report {
        for _ in 0..ticks {
            if self.roster.is_empty() {
                break;
            }
            self.step(dt);
        }

        self.report.remaining = u32::try_from(self.roster.len()).unwrap_or(u32::MAX);
        self.report.arcing = u32::try_from(
            self.towers
                .iter()
                .filter(|tower| tower.hooks().arc().is_some())
                .count(),
        )
        .unwrap_or(u32::MAX);
        info!(report = %self.report, "simulation finished");
        self.report
    }

    /// Advances the whole field by one frame.
    ///
    /// Every tower reads the same snapshot taken at the start of the frame;
    /// damage is only applied once all of them have updated.
    fn step(&mut self, dt: Duration) {
        self.report.ticks += 1;

        let view = self.roster.view();
        for tower in &mut self.towers {
            if tower.update(dt, &view).fired {
                self.report.shots += 1;
            }
        }

        self.reaped.clear();
        self.roster.reap_dead(&mut self.reaped);

        for tower in &mut self.towers {
            for strike in tower.hooks_mut().drain_strikes() {
                if self.roster.apply_damage(strike.enemy, strike.amount) {
                    self.report.kills += 1;
                }
            }

            for bullet in tower.projectiles_mut() {
                let Some(enemy) = bullet.resolve_hit(&mut self.roster) else {
                    continue;
                };
                self.report.hits += 1;
                if self.roster.get(enemy).is_some_and(|enemy| !enemy.is_alive()) {
                    self.report.kills += 1;
                }
            }
        }

        self.roster.advance(dt);
        self.release_escaped();
    }

    fn release_escaped(&mut self) {
        let escaped: Vec<EnemyId> = self
            .roster
            .iter()
            .filter(|(_, enemy)| {
                enemy.is_alive() && self.arena.is_leaving(enemy.position(), enemy.velocity())
            })
            .map(|(id, _)| id)
            .collect();

        for id in escaped {
            if self.roster.despawn(id) {
                debug!(enemy = ?id, "enemy escaped");
                self.report.escaped += 1;
            }
        }
    }
}
