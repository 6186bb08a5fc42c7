//! Sound effects using the Web Audio API
//!
//! Every effect is a short synthesized tone sweep, so no audio assets ship
//! with the game.

use web_sys::OscillatorType::{Sawtooth, Sine, Square, Triangle};
use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::settings::AudioSettings;
use crate::sim::{EnemyKind, GameEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    PlayerHurt,
    PlayerDie,
    /// Pitched per enemy kind
    EnemySpawn(EnemyKind),
    GameOver,
    HighScore,
}

impl SoundEffect {
    /// Effect for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match *event {
            GameEvent::Jump => Some(SoundEffect::Jump),
            GameEvent::PlayerHurt { .. } => Some(SoundEffect::PlayerHurt),
            GameEvent::PlayerDied => Some(SoundEffect::PlayerDie),
            GameEvent::EnemySpawned { kind } => Some(SoundEffect::EnemySpawn(kind)),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::EnemyHit { .. } => None,
        }
    }

    /// Tone sweeps making up the effect
    fn tones(&self) -> &'static [Tone] {
        match self {
            SoundEffect::Jump => JUMP,
            SoundEffect::PlayerHurt => HURT,
            SoundEffect::PlayerDie => DIE,
            SoundEffect::EnemySpawn(EnemyKind::Basic) => SPAWN_BASIC,
            SoundEffect::EnemySpawn(EnemyKind::Fast) => SPAWN_FAST,
            SoundEffect::EnemySpawn(EnemyKind::Tank) => SPAWN_TANK,
            SoundEffect::GameOver => GAME_OVER,
            SoundEffect::HighScore => HIGH_SCORE,
        }
    }
}

const JUMP: &[Tone] = &[Tone::new(Square, 220.0, 660.0, 0.0, 0.12, 0.25)];
const HURT: &[Tone] = &[Tone::new(Sawtooth, 300.0, 90.0, 0.0, 0.2, 0.45)];
const DIE: &[Tone] = &[
    Tone::new(Sawtooth, 400.0, 60.0, 0.0, 0.6, 0.5),
    Tone::new(Square, 200.0, 40.0, 0.1, 0.6, 0.3),
];
const SPAWN_BASIC: &[Tone] = &[Tone::new(Triangle, 500.0, 350.0, 0.0, 0.08, 0.15)];
const SPAWN_FAST: &[Tone] = &[Tone::new(Triangle, 900.0, 600.0, 0.0, 0.06, 0.15)];
const SPAWN_TANK: &[Tone] = &[Tone::new(Triangle, 160.0, 110.0, 0.0, 0.15, 0.2)];
// Falling phrase
const GAME_OVER: &[Tone] = &[
    Tone::new(Sine, 440.0, 440.0, 0.0, 0.25, 0.4),
    Tone::new(Sine, 349.0, 349.0, 0.25, 0.25, 0.4),
    Tone::new(Sine, 262.0, 220.0, 0.5, 0.6, 0.4),
];
// C major arpeggio
const HIGH_SCORE: &[Tone] = &[
    Tone::new(Sine, 523.0, 523.0, 0.0, 0.15, 0.35),
    Tone::new(Sine, 659.0, 659.0, 0.15, 0.15, 0.35),
    Tone::new(Sine, 784.0, 784.0, 0.3, 0.15, 0.35),
    Tone::new(Sine, 1047.0, 1047.0, 0.45, 0.4, 0.35),
];

/// One exponential frequency sweep with a decaying gain envelope
#[derive(Debug, Clone, Copy)]
struct Tone {
    wave: OscillatorType,
    from_hz: f32,
    to_hz: f32,
    /// Start offset (seconds)
    delay: f64,
    duration: f64,
    gain: f32,
}

impl Tone {
    const fn new(wave: OscillatorType, from_hz: f32, to_hz: f32, delay: f64, duration: f64, gain: f32) -> Self {
        Self {
            wave,
            from_hz,
            to_hz,
            delay,
            duration,
            gain,
        }
    }
}

pub struct AudioManager {
    ctx: Option<AudioContext>,
    settings: AudioSettings,
}

impl AudioManager {
    pub fn new(settings: AudioSettings) -> Self {
        // Not available outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx, settings }
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: AudioSettings) {
        self.settings = settings;
    }

    pub fn play_event(&self, event: &GameEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    pub fn play(&self, effect: SoundEffect) {
        let vol = self.settings.effective_sfx();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers start the context suspended until a user gesture
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        for tone in effect.tones() {
            if self.play_tone(ctx, tone, vol).is_none() {
                log::debug!("Dropped tone for {:?}", effect);
            }
        }
    }

    fn play_tone(&self, ctx: &AudioContext, tone: &Tone, vol: f32) -> Option<()> {
        let (osc, gain) = Self::create_osc(ctx, tone.wave)?;
        let t = ctx.current_time() + tone.delay;
        let end = t + tone.duration;

        osc.frequency().set_value_at_time(tone.from_hz, t).ok()?;
        osc.frequency().exponential_ramp_to_value_at_time(tone.to_hz, end).ok()?;
        gain.gain().set_value_at_time(vol * tone.gain, t).ok()?;
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok()?;

        osc.start_with_when(t).ok()?;
        osc.stop_with_when(end + 0.02).ok()?;
        Some(())
    }

    fn create_osc(ctx: &AudioContext, wave: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(wave);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}
