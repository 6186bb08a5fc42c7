//! Dodge the Spike - a side-view survival platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state machine, enemy pool, spawning, player)
//! - `settings`: Tunables and preferences persisted to LocalStorage
//! - `highscores`: Top-10 leaderboard persisted to LocalStorage
//! - `audio` / `web`: Browser-only host glue (Web Audio, wasm-bindgen handle)

pub mod highscores;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::HighScores;
pub use settings::{AudioSettings, Settings, Tunables};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Viewport dimensions (pixels)
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;
    /// Height of the ground strip at the bottom of the viewport
    pub const GROUND_HEIGHT: f32 = 150.0;

    /// Player collider (pixels)
    pub const PLAYER_SIZE: (f32, f32) = (25.0, 95.0);
    /// Player spawn point
    pub const PLAYER_SPAWN: (f32, f32) = (200.0, 100.0);

    /// Unscaled enemy collider edge (pixels); kind scale is applied on top
    pub const ENEMY_BASE_SIZE: f32 = 32.0;
    /// Where deactivated enemies are parked
    pub const OFF_STAGE: f32 = -10_000.0;
}

/// Heading angle (radians) of a vector, 0 = +x, y grows downward
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector from `from` toward `to`, zero when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to() {
        let d = direction_to(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0));
        assert!((d - Vec2::new(0.6, 0.8)).length() < 1e-6);
        assert_eq!(direction_to(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }

    #[test]
    fn test_heading() {
        assert!((heading(Vec2::new(0.0, 1.0)) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!(heading(Vec2::new(1.0, 0.0)).abs() < 1e-6);
    }
}
