//! Session flags shared by every simulation component
//!
//! Replaces a process-global manager: the world owns one `GameSession` and
//! lends it to each `update`, which checks `is_running()` before doing any
//! work. Only the world and the player's damage path write to it.

/// Handle returned when registering a pause/resume callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u32);

type Callback = Box<dyn FnMut()>;

/// Pause / game-over flags plus elapsed play time
#[derive(Default)]
pub struct GameSession {
    paused: bool,
    game_over: bool,
    /// Seconds of unpaused play since the session started
    elapsed: f32,
    pause_callbacks: Vec<(CallbackId, Callback)>,
    resume_callbacks: Vec<(CallbackId, Callback)>,
    next_callback: u32,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Neither paused nor over
    pub fn is_running(&self) -> bool {
        !self.paused && !self.game_over
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Points are whole seconds survived
    pub fn score(&self) -> u64 {
        self.elapsed.max(0.0).floor() as u64
    }

    /// Accumulate play time; ignored while paused or over
    pub fn advance(&mut self, dt: f32) {
        if self.is_running() {
            self.elapsed += dt;
        }
    }

    /// Start a fresh session. Registered callbacks are kept.
    pub fn reset(&mut self) {
        self.paused = false;
        self.game_over = false;
        self.elapsed = 0.0;
        log::info!("Session started");
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused {
            self.pause();
        } else {
            self.resume();
        }
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// No effect when already paused or over
    pub fn pause(&mut self) {
        if self.paused || self.game_over {
            return;
        }
        self.paused = true;
        log::info!("Paused at {:.1}s", self.elapsed);
        for (_, cb) in self.pause_callbacks.iter_mut() {
            cb();
        }
    }

    /// No effect unless paused (and not over)
    pub fn resume(&mut self) {
        if !self.paused || self.game_over {
            return;
        }
        self.paused = false;
        log::info!("Resumed");
        for (_, cb) in self.resume_callbacks.iter_mut() {
            cb();
        }
    }

    /// Game over also clears the pause flag
    pub fn set_game_over(&mut self, game_over: bool) {
        if game_over && !self.game_over {
            log::info!("Game over after {:.1}s", self.elapsed);
        }
        self.game_over = game_over;
        if game_over {
            self.paused = false;
        }
    }

    pub fn on_pause(&mut self, f: impl FnMut() + 'static) -> CallbackId {
        let id = self.next_id();
        self.pause_callbacks.push((id, Box::new(f)));
        id
    }

    pub fn on_resume(&mut self, f: impl FnMut() + 'static) -> CallbackId {
        let id = self.next_id();
        self.resume_callbacks.push((id, Box::new(f)));
        id
    }

    /// Remove a pause or resume callback
    pub fn remove_callback(&mut self, id: CallbackId) -> bool {
        let before = self.pause_callbacks.len() + self.resume_callbacks.len();
        self.pause_callbacks.retain(|(cid, _)| *cid != id);
        self.resume_callbacks.retain(|(cid, _)| *cid != id);
        self.pause_callbacks.len() + self.resume_callbacks.len() != before
    }

    fn next_id(&mut self) -> CallbackId {
        let id = CallbackId(self.next_callback);
        self.next_callback += 1;
        id
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("paused", &self.paused)
            .field("game_over", &self.game_over)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}
