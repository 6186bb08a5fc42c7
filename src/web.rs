//! Browser host handle
//!
//! JS owns the canvas, the sprite sheets and the input listeners; it calls
//! `frame` from `requestAnimationFrame` and draws from the flat snapshots.
//! Everything in here is glue: the simulation runs in `sim::tick`.

use wasm_bindgen::prelude::*;

use crate::audio::{AudioManager, SoundEffect};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::sim::{Animator, GameEvent, GameWorld, TickInput, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Dodge the Spike starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    world: GameWorld,
    settings: Settings,
    highscores: HighScores,
    audio: AudioManager,
    /// Held buttons; `pause` is consumed by the next frame
    input: TickInput,
    accumulator: f32,
    /// Rank of the last finished run, if it made the board
    last_rank: Option<usize>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebGame {
        let settings = Settings::load();
        let audio = AudioManager::new(settings.audio.clone());
        WebGame {
            world: GameWorld::new(settings.tunables.clone(), seed),
            settings,
            highscores: HighScores::load(),
            audio,
            input: TickInput::default(),
            accumulator: 0.0,
            last_rank: None,
        }
    }

    pub fn set_input(&mut self, left: bool, right: bool, jump: bool) {
        self.input.left = left;
        self.input.right = right;
        self.input.jump = jump;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = true;
    }

    /// Advance by a wall-clock delta in milliseconds
    pub fn frame(&mut self, dt_ms: f64) {
        // Pause edge applies once per frame, even when no substep runs
        if self.input.pause {
            self.input.pause = false;
            self.world.session.toggle_pause();
        }

        let dt = ((dt_ms / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let events = tick(&mut self.world, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            for event in &events {
                self.audio.play_event(event);
                if let GameEvent::GameOver { score } = event {
                    self.record_score(*score);
                }
            }
        }

        // Pause/game over must not bank time for a burst on resume
        if !self.world.session.is_running() {
            self.accumulator = 0.0;
        }
    }

    pub fn restart(&mut self) {
        self.world.restart();
        self.input = TickInput::default();
        self.accumulator = 0.0;
        self.last_rank = None;
    }

    pub fn score(&self) -> u32 {
        self.world.score().min(u32::MAX as u64) as u32
    }

    pub fn best_score(&self) -> Option<u32> {
        self.highscores.best().map(|s| s.min(u32::MAX as u64) as u32)
    }

    pub fn last_rank(&self) -> Option<u32> {
        self.last_rank.map(|r| r as u32)
    }

    pub fn health(&self) -> u32 {
        self.world.player.health().current()
    }

    pub fn is_paused(&self) -> bool {
        self.world.session.is_paused()
    }

    pub fn is_game_over(&self) -> bool {
        self.world.is_game_over()
    }

    /// Leaderboard as JSON for the HUD
    pub fn highscores_json(&self) -> String {
        serde_json::to_string(&self.highscores).unwrap_or_else(|_| "{\"entries\":[]}".into())
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.audio.muted = muted;
        self.audio.set_settings(self.settings.audio.clone());
        self.settings.save();
    }

    /// `[x, y, visible, flip_x, state]` with state 0 idle, 1 run, 2 jump, 3 fall
    pub fn player_snapshot(&self) -> Vec<f32> {
        let player = &self.world.player;
        let anim = player.anim();
        let state = crate::sim::PlayerState::ALL
            .iter()
            .position(|s| *s == player.state())
            .unwrap_or(0);
        let pos = player.pos();
        vec![
            pos.x,
            pos.y,
            if anim.is_visible() { 1.0 } else { 0.0 },
            if anim.is_flipped() { 1.0 } else { 0.0 },
            state as f32,
        ]
    }

    /// Animation clip currently playing on the player sprite
    pub fn player_clip(&self) -> Option<String> {
        self.world.player.anim().current_clip().map(str::to_string)
    }

    /// Five floats per enemy: `[x, y, rotation, scale, kind_code + 8 * flip_y]`
    pub fn enemy_snapshot(&self) -> Vec<f32> {
        let mut out = Vec::new();
        for enemy in self.world.spawner.pool().active_members() {
            let sprite = enemy.sprite();
            let flags = sprite.kind.code() as f32 + if sprite.flip_y { 8.0 } else { 0.0 };
            out.extend_from_slice(&[sprite.pos.x, sprite.pos.y, sprite.rotation, sprite.scale, flags]);
        }
        out
    }
}

impl WebGame {
    fn record_score(&mut self, score: u64) {
        let now = js_sys::Date::now();
        self.last_rank = self.highscores.record(score, self.world.seed(), now);
        if self.last_rank == Some(1) {
            self.audio.play(SoundEffect::HighScore);
        }
        self.highscores.save();
    }
}
