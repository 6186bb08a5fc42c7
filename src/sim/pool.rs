//! Enemy object pool
//!
//! Enemies live in slots owned by the pool. Inactive warm instances sit on a
//! LIFO free list; active ones are tracked by id in an ordered set so
//! iteration is stable (by slot index).
//!
//! Invariants:
//! - a slot index is on the free list or its enemy is in `active`, never both
//! - `active.len() <= ceiling`
//! - `free.len() <= floor`; releases beyond that drop the enemy and recycle
//!   the slot, so steady-state memory is bounded by the floor

use std::collections::BTreeSet;

use glam::Vec2;
use thiserror::Error;

use super::body::Arena;
use super::enemy::{Enemy, EnemyId, EnemyKind, EnemyUpdate, SpawnSide};
use super::session::GameSession;

/// Default warm instance count
pub const DEFAULT_POOL_FLOOR: usize = 20;
/// Default maximum concurrently active enemies
pub const DEFAULT_POOL_CEILING: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("enemy pool exhausted ({ceiling} active)")]
    Exhausted { ceiling: usize },
}

/// Pool occupancy snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub active: usize,
    pub pooled: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct EnemyPool {
    slots: Vec<Option<Enemy>>,
    /// Warm inactive slots, most recently released last
    free: Vec<usize>,
    /// Emptied slots and their last generation, reused before the slot
    /// vector grows
    vacant: Vec<(usize, u32)>,
    active: BTreeSet<EnemyId>,
    floor: usize,
    ceiling: usize,
}

impl Default for EnemyPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_FLOOR, DEFAULT_POOL_CEILING)
    }
}

impl EnemyPool {
    /// Create a pool with `floor` warm instances. A ceiling below the floor
    /// is raised to it.
    pub fn new(floor: usize, ceiling: usize) -> Self {
        let ceiling = if ceiling < floor {
            log::warn!("Pool ceiling {} below floor {}, raising it", ceiling, floor);
            floor
        } else {
            ceiling
        };

        let mut pool = Self {
            slots: Vec::with_capacity(ceiling),
            free: Vec::with_capacity(floor),
            vacant: Vec::new(),
            active: BTreeSet::new(),
            floor,
            ceiling,
        };
        for _ in 0..floor {
            let index = pool.construct();
            pool.free.push(index);
        }
        pool
    }

    pub fn floor(&self) -> usize {
        self.floor
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active.len(),
            pooled: self.free.len(),
            total: self.active.len() + self.free.len(),
        }
    }

    /// Hand out an enemy activated as `kind` at `pos`.
    ///
    /// Reuses the most recently released instance, constructs a new one while
    /// under the ceiling, and otherwise reports exhaustion.
    pub fn acquire(
        &mut self,
        kind: EnemyKind,
        side: SpawnSide,
        pos: Vec2,
    ) -> Result<EnemyId, PoolError> {
        if self.active.len() >= self.ceiling {
            log::warn!("Enemy pool exhausted - {} active", self.active.len());
            return Err(PoolError::Exhausted {
                ceiling: self.ceiling,
            });
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => self.construct(),
        };

        let enemy = self.slots[index].get_or_insert_with(|| Enemy::new(index as u32));
        let id = enemy.activate(kind, side, pos);
        self.active.insert(id);
        Ok(id)
    }

    /// Return an enemy to the pool. Ids that are not currently active
    /// (already released, stale) are ignored; returns whether anything changed.
    pub fn release(&mut self, id: EnemyId) -> bool {
        if !self.active.remove(&id) {
            return false;
        }

        let index = id.index();
        if let Some(enemy) = self.slots[index].as_mut() {
            enemy.deactivate();
        }

        if self.free.len() < self.floor {
            self.free.push(index);
        } else {
            self.slots[index] = None;
            self.vacant.push((index, id.generation()));
        }
        true
    }

    /// Release every active enemy (game restart)
    pub fn clear(&mut self) {
        let ids: Vec<EnemyId> = self.active.iter().copied().collect();
        for id in ids {
            self.release(id);
        }
    }

    pub fn contains(&self, id: EnemyId) -> bool {
        self.active.contains(&id)
    }

    /// The enemy for an active id
    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        if !self.active.contains(&id) {
            return None;
        }
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        if !self.active.contains(&id) {
            return None;
        }
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn active_ids(&self) -> Vec<EnemyId> {
        self.active.iter().copied().collect()
    }

    /// Active enemies whose own flags agree they are in play
    pub fn active_members(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.active
            .iter()
            .filter_map(|id| self.slots.get(id.index()).and_then(Option::as_ref))
            .filter(|e| e.is_active() && e.is_visible())
    }

    /// Update every active enemy, then release those that asked for it.
    /// Returns the number released.
    pub fn update(
        &mut self,
        dt: f32,
        session: &GameSession,
        arena: &Arena,
        margin: f32,
    ) -> usize {
        let mut leaving = Vec::new();
        for &id in &self.active {
            let Some(enemy) = self.slots.get_mut(id.index()).and_then(Option::as_mut) else {
                continue;
            };
            if !enemy.is_active() {
                continue;
            }
            if enemy.update(dt, session, arena, margin) == EnemyUpdate::ShouldRelease {
                leaving.push(id);
            }
        }

        leaving.into_iter().filter(|&id| self.release(id)).count()
    }

    fn construct(&mut self) -> usize {
        match self.vacant.pop() {
            Some((index, generation)) => {
                // Continue the slot's generation so stale ids stay stale
                self.slots[index] = Some(Enemy::new(index as u32).with_generation(generation));
                index
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Some(Enemy::new(index as u32)));
                index
            }
        }
    }
}
