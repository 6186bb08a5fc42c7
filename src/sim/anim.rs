//! Animation capability used by the player's state handlers
//!
//! The host renderer implements `Animator`; `ClipPlayer` is the headless
//! implementation used natively and in tests, and is what the web host reads
//! back when drawing.

use std::collections::HashSet;

/// Clip played when the requested one is not registered
pub const FALLBACK_CLIP: &str = "player_idle";

/// What the simulation needs from a sprite renderer
pub trait Animator {
    /// Start `clip`; no-op if it is already playing
    fn play(&mut self, clip: &str);
    fn exists(&self, clip: &str) -> bool;
    fn current_clip(&self) -> Option<&str>;
    fn set_visible(&mut self, visible: bool);
    fn set_flip_x(&mut self, flip: bool);

    /// Play `clip` if registered, otherwise `fallback` if that is
    fn play_or_fallback(&mut self, clip: &str, fallback: &str) {
        if self.exists(clip) {
            self.play(clip);
        } else if self.exists(fallback) {
            self.play(fallback);
        }
    }
}

/// Headless animator: tracks the registered clip names and the sprite flags
#[derive(Debug, Clone, Default)]
pub struct ClipPlayer {
    clips: HashSet<String>,
    current: Option<String>,
    visible: bool,
    flip_x: bool,
    /// Number of times a clip actually (re)started
    starts: u32,
}

impl ClipPlayer {
    pub fn new<I, T>(clips: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            clips: clips.into_iter().map(Into::into).collect(),
            current: None,
            visible: true,
            flip_x: false,
            starts: 0,
        }
    }

    /// Clip set of the shipped player sprite sheet
    pub fn player() -> Self {
        Self::new(["player_idle", "player_run", "player_jump"])
    }

    pub fn register(&mut self, clip: impl Into<String>) {
        self.clips.insert(clip.into());
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_flipped(&self) -> bool {
        self.flip_x
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }
}

impl Animator for ClipPlayer {
    fn play(&mut self, clip: &str) {
        if self.current.as_deref() == Some(clip) {
            return;
        }
        self.current = Some(clip.to_string());
        self.starts += 1;
    }

    fn exists(&self, clip: &str) -> bool {
        self.clips.contains(clip)
    }

    fn current_clip(&self) -> Option<&str> {
        self.current.as_deref()
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_flip_x(&mut self, flip: bool) {
        self.flip_x = flip;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_is_idempotent() {
        let mut anim = ClipPlayer::player();
        anim.play("player_run");
        anim.play("player_run");
        assert_eq!(anim.current_clip(), Some("player_run"));
        assert_eq!(anim.starts(), 1);
    }

    #[test]
    fn test_missing_clip_falls_back() {
        let mut anim = ClipPlayer::new(["player_idle"]);
        anim.play_or_fallback("player_run", FALLBACK_CLIP);
        assert_eq!(anim.current_clip(), Some("player_idle"));

        let mut bare = ClipPlayer::new(Vec::<String>::new());
        bare.play_or_fallback("player_run", FALLBACK_CLIP);
        assert_eq!(bare.current_clip(), None);
    }
}
