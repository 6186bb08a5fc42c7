//! Pooled enemy entities
//!
//! An `Enemy` is plain state plus a physics `Body`. It is created once by the
//! pool and then cycled between inactive and active for the life of the pool.
//! Each activation travels in a straight line fixed the first time it updates
//! after a target is set; it does not home.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Arena, Body};
use super::session::GameSession;
use crate::consts::{ENEMY_BASE_SIZE, OFF_STAGE};
use crate::{direction_to, heading};

/// Identifies one activation of a pooled enemy.
///
/// `index` is the pool slot, `generation` increments on every activation, so
/// an id held past its enemy's release never matches the next activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId {
    index: u32,
    generation: u32,
}

impl EnemyId {
    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Basic,
    Fast,
    Tank,
}

/// Per-kind attributes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindStats {
    pub scale: f32,
    /// Travel speed (pixels/s)
    pub speed: f32,
    /// Health removed from the player on contact
    pub damage: u32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Tank];

    pub const fn stats(self) -> KindStats {
        match self {
            EnemyKind::Basic => KindStats {
                scale: 1.5,
                speed: 150.0,
                damage: 25,
            },
            EnemyKind::Fast => KindStats {
                scale: 1.0,
                speed: 300.0,
                damage: 15,
            },
            EnemyKind::Tank => KindStats {
                scale: 2.0,
                speed: 75.0,
                damage: 50,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Basic => "Basic",
            EnemyKind::Fast => "Fast",
            EnemyKind::Tank => "Tank",
        }
    }

    /// Stable numeric code for flat render buffers
    pub fn code(&self) -> u8 {
        match self {
            EnemyKind::Basic => 0,
            EnemyKind::Fast => 1,
            EnemyKind::Tank => 2,
        }
    }
}

/// Viewport edge an enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpawnSide {
    #[default]
    Left,
    Right,
    Top,
}

impl SpawnSide {
    pub const ALL: [SpawnSide; 3] = [SpawnSide::Left, SpawnSide::Right, SpawnSide::Top];
}

/// Result of one enemy update, consumed by the pool sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyUpdate {
    /// Inactive, paused or game over: nothing changed
    Skipped,
    Moved,
    /// Left the play area; the pool should take it back
    ShouldRelease,
}

/// What a renderer needs to draw one enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySprite {
    pub pos: Vec2,
    pub rotation: f32,
    pub scale: f32,
    pub flip_y: bool,
    pub kind: EnemyKind,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    side: SpawnSide,
    body: Body,
    speed: f32,
    damage: u32,
    scale: f32,
    active: bool,
    visible: bool,
    target: Option<Vec2>,
    /// Travel direction, fixed on first update after a target is set
    direction: Option<Vec2>,
    rotation: f32,
    flip_y: bool,
}

impl Enemy {
    /// A fresh, inactive enemy parked off stage
    pub fn new(index: u32) -> Self {
        let mut body = Body::new(Vec2::splat(OFF_STAGE), Vec2::splat(ENEMY_BASE_SIZE));
        body.collision_enabled = false;
        Self {
            id: EnemyId {
                index,
                generation: 0,
            },
            kind: EnemyKind::Basic,
            side: SpawnSide::Left,
            body,
            speed: 0.0,
            damage: 0,
            scale: 1.0,
            active: false,
            visible: false,
            target: None,
            direction: None,
            rotation: 0.0,
            flip_y: false,
        }
    }

    /// Start counting activations after `generation`
    pub(crate) fn with_generation(mut self, generation: u32) -> Self {
        self.id.generation = generation;
        self
    }

    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn side(&self) -> SpawnSide {
        self.side
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    pub fn direction(&self) -> Option<Vec2> {
        self.direction
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn is_flipped(&self) -> bool {
        self.flip_y
    }

    /// Bring the enemy into play as `kind` at `pos`. Returns the id of this
    /// activation.
    pub fn activate(&mut self, kind: EnemyKind, side: SpawnSide, pos: Vec2) -> EnemyId {
        let stats = kind.stats();
        self.id.generation = self.id.generation.wrapping_add(1);
        self.kind = kind;
        self.side = side;
        self.speed = stats.speed;
        self.damage = stats.damage;
        self.scale = stats.scale;

        // Collider is half the scaled sprite
        self.body.size = Vec2::splat(ENEMY_BASE_SIZE * stats.scale * 0.5);
        self.body.vel = Vec2::ZERO;
        self.body.pos = pos;
        self.body.collision_enabled = true;

        self.target = None;
        self.direction = None;
        self.rotation = 0.0;
        self.flip_y = false;
        self.active = true;
        self.visible = true;
        self.id
    }

    /// Take the enemy out of play and park it off stage
    pub fn deactivate(&mut self) {
        self.body.vel = Vec2::ZERO;
        self.body.collision_enabled = false;
        self.body.pos = Vec2::splat(OFF_STAGE);
        self.active = false;
        self.visible = false;
        self.target = None;
        self.direction = None;
    }

    /// Aim at `target`; the travel direction is fixed on the next update
    pub fn set_target(&mut self, target: Vec2) {
        self.target = Some(target);
        self.flip_y = self.side == SpawnSide::Right
            || (self.side == SpawnSide::Top && self.body.pos.x > target.x);
    }

    pub fn update(
        &mut self,
        dt: f32,
        session: &GameSession,
        arena: &Arena,
        margin: f32,
    ) -> EnemyUpdate {
        if !self.active || !session.is_running() {
            return EnemyUpdate::Skipped;
        }

        let dir = match (self.direction, self.target) {
            (Some(dir), _) => dir,
            (None, Some(target)) => {
                // A target on top of the spawn point yields a zero direction,
                // which is kept: the enemy stays put for this activation.
                let dir = direction_to(self.body.pos, target);
                self.direction = Some(dir);
                dir
            }
            (None, None) => Vec2::ZERO,
        };

        self.body.vel = dir * self.speed;
        if self.body.vel != Vec2::ZERO {
            self.rotation = heading(self.body.vel);
        }
        self.body.step(dt, None);

        if arena.is_outside(self.body.pos, margin) {
            EnemyUpdate::ShouldRelease
        } else {
            EnemyUpdate::Moved
        }
    }

    pub fn sprite(&self) -> EnemySprite {
        EnemySprite {
            pos: self.body.pos,
            rotation: self.rotation,
            scale: self.scale,
            flip_y: self.flip_y,
            kind: self.kind,
        }
    }
}
