//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by enemy ID)
//! - No rendering or platform dependencies

pub mod anim;
pub mod body;
pub mod enemy;
pub mod fsm;
pub mod player;
pub mod pool;
pub mod session;
pub mod spawner;
pub mod tick;

pub use anim::{Animator, ClipPlayer, FALLBACK_CLIP};
pub use body::{Aabb, Arena, Body};
pub use enemy::{Enemy, EnemyId, EnemyKind, EnemySprite, EnemyUpdate, KindStats, SpawnSide};
pub use fsm::{ListenerId, StateHandler, StateMachine, StateMachineBuilder};
pub use player::{
    DamageOutcome, Player, PlayerController, PlayerHealth, PlayerInput, PlayerState, PlayerTick,
    classify,
};
pub use pool::{DEFAULT_POOL_CEILING, DEFAULT_POOL_FLOOR, EnemyPool, PoolError, PoolStats};
pub use session::{CallbackId, GameSession};
pub use spawner::{SpawnDirector, interval_after, pick_weighted};
pub use tick::{GameEvent, GameWorld, TickInput, tick};
