//! Game settings and tunables
//!
//! Persisted as one JSON blob in LocalStorage. Every struct is
//! `#[serde(default)]` so older or partial saves still load.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::body::Arena;
use crate::sim::enemy::EnemyKind;
use crate::sim::pool::{DEFAULT_POOL_CEILING, DEFAULT_POOL_FLOOR};

/// Largest kind weight accepted from storage
pub const MAX_KIND_WEIGHT: u32 = 1_000_000;

/// Gameplay balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    // === Arena ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub ground_height: f32,

    // === Enemy pool ===
    /// Warm instances kept around
    pub pool_floor: usize,
    /// Maximum concurrently active enemies
    pub pool_ceiling: usize,

    // === Spawning ===
    /// Seconds between spawns at the start of a run
    pub spawn_interval_initial: f32,
    /// Fastest spawn cadence (seconds)
    pub spawn_interval_min: f32,
    /// Interval reduction per spawn (seconds)
    pub spawn_interval_step: f32,
    /// Relative kind weights: Basic, Fast, Tank
    pub kind_weights: [u32; 3],
    /// Distance outside the viewport where enemies appear
    pub spawn_margin: f32,
    /// Band above the bottom edge kept clear of side spawns
    pub spawn_ground_reserve: f32,
    /// Distance past the viewport after which enemies are recycled
    pub despawn_buffer: f32,

    // === Player ===
    pub max_health: u32,
    /// Seconds of invulnerability after a hit
    pub invulnerability: f32,
    /// Blink half-period while invulnerable (seconds)
    pub flash_period: f32,
    /// Damage for leaving the viewport
    pub out_of_bounds_damage: u32,
    pub move_acceleration: f32,
    pub max_move_speed: f32,
    pub jump_impulse: f32,
    pub gravity: f32,
    /// Horizontal velocity multiplier per tick with no input
    pub friction: f32,
    /// |vx| above which a grounded player counts as running
    pub run_threshold: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            ground_height: GROUND_HEIGHT,

            pool_floor: DEFAULT_POOL_FLOOR,
            pool_ceiling: DEFAULT_POOL_CEILING,

            spawn_interval_initial: 2.0,
            spawn_interval_min: 0.3,
            spawn_interval_step: 0.05,
            kind_weights: [70, 20, 10],
            spawn_margin: 50.0,
            spawn_ground_reserve: GROUND_HEIGHT,
            despawn_buffer: 200.0,

            max_health: 100,
            invulnerability: 2.0,
            flash_period: 0.1,
            out_of_bounds_damage: 50,
            move_acceleration: 40_000.0,
            max_move_speed: 300.0,
            jump_impulse: 350.0,
            gravity: 900.0,
            friction: 0.8,
            run_threshold: 10.0,
        }
    }
}

impl Tunables {
    pub fn arena(&self) -> Arena {
        Arena::new(self.viewport_width, self.viewport_height, self.ground_height)
    }

    /// Cap stored kind weights at `MAX_KIND_WEIGHT`
    pub fn clamp_weights(&mut self) {
        for w in &mut self.kind_weights {
            if *w > MAX_KIND_WEIGHT {
                log::warn!("Kind weight {} clamped to {}", w, MAX_KIND_WEIGHT);
                *w = MAX_KIND_WEIGHT;
            }
        }
    }

    /// Weight table keyed by kind
    pub fn weights(&self) -> [(EnemyKind, u32); 3] {
        [
            (EnemyKind::Basic, self.kind_weights[0]),
            (EnemyKind::Fast, self.kind_weights[1]),
            (EnemyKind::Tank, self.kind_weights[2]),
        ]
    }
}

/// Volume preferences (0.0 - 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub master_volume: f32,
    pub sfx_volume: f32,
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 0.8,
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl AudioSettings {
    /// Volume applied to sound effects
    pub fn effective_sfx(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tunables: Tunables,
    pub audio: AudioSettings,
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "dodge_spike_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(mut settings) => {
                        settings.tunables.clamp_weights();
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring malformed settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
