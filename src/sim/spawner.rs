//! Spawn director: cadence, side/kind selection and the per-frame enemy sweep
//!
//! The spawn interval starts long and shrinks by a fixed step each time a
//! spawn fires, down to a floor. That is the whole difficulty ramp.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::body::Arena;
use super::enemy::{EnemyId, EnemyKind, SpawnSide};
use super::pool::EnemyPool;
use super::session::GameSession;
use crate::settings::Tunables;

/// Pick from a weighted table given `draw` in `[0, total)`.
///
/// Walks the cumulative sums and returns the first bucket whose running
/// total is >= `draw`; zero-weight entries are skipped. An empty or all-zero
/// table yields `Basic`.
pub fn pick_weighted(weights: &[(EnemyKind, u32)], draw: f64) -> EnemyKind {
    let mut running = 0.0;
    for &(kind, weight) in weights {
        if weight == 0 {
            continue;
        }
        running += weight as f64;
        if draw <= running {
            return kind;
        }
    }
    EnemyKind::Basic
}

/// Interval after `spawns` spawns
pub fn interval_after(initial: f32, step: f32, min: f32, spawns: u32) -> f32 {
    (initial - step * spawns as f32).max(min)
}

#[derive(Debug, Clone)]
pub struct SpawnDirector {
    pool: EnemyPool,
    rng: Pcg32,
    arena: Arena,
    weights: [(EnemyKind, u32); 3],
    interval_initial: f32,
    interval_min: f32,
    interval_step: f32,
    spawn_margin: f32,
    ground_reserve: f32,
    despawn_buffer: f32,
    /// Current seconds between spawns
    interval: f32,
    /// Seconds since the last spawn
    accumulator: f32,
    spawns: u32,
}

impl SpawnDirector {
    pub fn new(tunables: &Tunables, seed: u64) -> Self {
        Self {
            pool: EnemyPool::new(tunables.pool_floor, tunables.pool_ceiling),
            rng: Pcg32::seed_from_u64(seed),
            arena: tunables.arena(),
            weights: tunables.weights(),
            interval_initial: tunables.spawn_interval_initial,
            interval_min: tunables.spawn_interval_min,
            interval_step: tunables.spawn_interval_step,
            spawn_margin: tunables.spawn_margin,
            ground_reserve: tunables.spawn_ground_reserve,
            despawn_buffer: tunables.despawn_buffer,
            interval: tunables.spawn_interval_initial,
            accumulator: 0.0,
            spawns: 0,
        }
    }

    pub fn pool(&self) -> &EnemyPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut EnemyPool {
        &mut self.pool
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Spawn attempts so far (including ones the pool refused)
    pub fn spawns(&self) -> u32 {
        self.spawns
    }

    /// Tick active enemies, then spawn once if the interval has elapsed.
    /// Returns the id of an enemy spawned this tick.
    pub fn update(&mut self, dt: f32, session: &GameSession, target: Vec2) -> Option<EnemyId> {
        if !session.is_running() {
            return None;
        }

        self.pool.update(dt, session, &self.arena, self.despawn_buffer);

        self.accumulator += dt;
        if self.accumulator < self.interval {
            return None;
        }

        self.accumulator = 0.0;
        let spawned = self.spawn(target);
        self.spawns += 1;
        self.interval = interval_after(
            self.interval_initial,
            self.interval_step,
            self.interval_min,
            self.spawns,
        );
        spawned
    }

    /// Restart cadence and recycle every enemy. The RNG stream continues.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.interval = self.interval_initial;
        self.accumulator = 0.0;
        self.spawns = 0;
    }

    /// One spawn attempt aimed at `target`; `None` if the pool is exhausted
    pub fn spawn(&mut self, target: Vec2) -> Option<EnemyId> {
        let side = self.random_side();
        let kind = self.random_kind();
        let pos = self.spawn_position(side);

        // Exhaustion is already logged by the pool; retry on the next cycle
        let id = self.pool.acquire(kind, side, pos).ok()?;
        if let Some(enemy) = self.pool.get_mut(id) {
            enemy.set_target(target);
        }
        log::debug!("Spawned {} from {:?} at {:?}", kind.as_str(), side, pos);
        Some(id)
    }

    pub fn random_side(&mut self) -> SpawnSide {
        SpawnSide::ALL[self.rng.random_range(0..SpawnSide::ALL.len())]
    }

    pub fn random_kind(&mut self) -> EnemyKind {
        // u64 so three u32 weights cannot overflow
        let total: u64 = self.weights.iter().map(|&(_, w)| w as u64).sum();
        if total == 0 {
            return EnemyKind::Basic;
        }
        let draw = self.rng.random::<f64>() * total as f64;
        pick_weighted(&self.weights, draw)
    }

    /// Just outside the viewport on `side`, random along the edge
    pub fn spawn_position(&mut self, side: SpawnSide) -> Vec2 {
        let size = self.spawn_margin;
        let w = self.arena.width;
        let h = self.arena.height;
        match side {
            SpawnSide::Left => Vec2::new(-size, self.random_between(size, h - size - self.ground_reserve)),
            SpawnSide::Right => {
                Vec2::new(w + size, self.random_between(size, h - size - self.ground_reserve))
            }
            SpawnSide::Top => Vec2::new(self.random_between(size, w - size), -size),
        }
    }

    fn random_between(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }
}
