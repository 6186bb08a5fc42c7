//! Player: movement controller, health with invulnerability, and the
//! animation state machine.
//!
//! The player state is never commanded directly. Every tick it is re-derived
//! from the physics body (grounded flag and velocity) and fed to the
//! `StateMachine`, whose enter handlers pick the animation clip.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::anim::{Animator, ClipPlayer, FALLBACK_CLIP};
use super::body::{Arena, Body};
use super::fsm::{StateHandler, StateMachine};
use super::session::GameSession;
use crate::consts::{PLAYER_SIZE, PLAYER_SPAWN};
use crate::settings::Tunables;

/// Player movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Idle,
    Running,
    Jumping,
    Falling,
}

impl PlayerState {
    pub const ALL: [PlayerState; 4] = [
        PlayerState::Idle,
        PlayerState::Running,
        PlayerState::Jumping,
        PlayerState::Falling,
    ];

    /// Animation clip for this state
    pub fn clip(&self) -> &'static str {
        match self {
            PlayerState::Idle => "player_idle",
            PlayerState::Running => "player_run",
            PlayerState::Jumping | PlayerState::Falling => "player_jump",
        }
    }

    /// States reachable from `self`
    pub fn allowed_next(&self) -> &'static [PlayerState] {
        use PlayerState::*;
        match self {
            Idle => &[Running, Jumping, Falling],
            Running => &[Idle, Jumping, Falling],
            Jumping => &[Falling],
            Falling => &[Idle, Running, Jumping],
        }
    }

    pub fn transition_table() -> HashMap<PlayerState, Vec<PlayerState>> {
        Self::ALL
            .iter()
            .map(|s| (*s, s.allowed_next().to_vec()))
            .collect()
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self, PlayerState::Jumping | PlayerState::Falling)
    }
}

/// Derive the state from physics signals.
///
/// Airborne is checked first: rising is `Jumping`, otherwise `Falling`. On the
/// ground, horizontal speed above `run_threshold` is `Running`.
pub fn classify(grounded: bool, vel: Vec2, run_threshold: f32) -> PlayerState {
    if !grounded {
        if vel.y < 0.0 {
            PlayerState::Jumping
        } else {
            PlayerState::Falling
        }
    } else if vel.x.abs() > run_threshold {
        PlayerState::Running
    } else {
        PlayerState::Idle
    }
}

/// Buttons held this tick (keyboard and touch merged by the host)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Result of `PlayerHealth::take_damage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable, already dead, or the game is over: nothing changed
    Ignored,
    /// Health reduced; invulnerability window armed
    Survived,
    /// Health reached zero; game over has been signalled
    Died,
}

impl DamageOutcome {
    pub fn is_fatal(&self) -> bool {
        *self == DamageOutcome::Died
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHealth {
    max: u32,
    current: u32,
    invulnerable: bool,
    /// Seconds left in the invulnerability window
    remaining: f32,
    duration: f32,
    flash_period: f32,
}

impl PlayerHealth {
    pub fn new(max: u32, invulnerability: f32, flash_period: f32) -> Self {
        Self {
            max,
            current: max,
            invulnerable: false,
            remaining: 0.0,
            duration: invulnerability,
            flash_period,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    pub fn invulnerability_remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    pub fn take_damage(&mut self, amount: u32, session: &mut GameSession) -> DamageOutcome {
        if self.invulnerable || self.is_dead() || session.is_game_over() {
            return DamageOutcome::Ignored;
        }

        if amount >= self.current {
            self.current = 0;
            session.set_game_over(true);
            return DamageOutcome::Died;
        }

        self.current -= amount;
        self.invulnerable = true;
        self.remaining = self.duration;
        DamageOutcome::Survived
    }

    /// Count down the invulnerability window. Returns the sprite visibility
    /// while blinking, `Some(true)` on the tick it ends, `None` otherwise.
    pub fn update(&mut self, dt: f32) -> Option<bool> {
        if !self.invulnerable {
            return None;
        }

        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.invulnerable = false;
            self.remaining = 0.0;
            return Some(true);
        }

        let phase = (self.remaining / self.flash_period).floor() as i64;
        Some(phase % 2 == 0)
    }

    pub fn reset(&mut self) {
        self.current = self.max;
        self.invulnerable = false;
        self.remaining = 0.0;
    }
}

/// Horizontal acceleration, friction and jumping
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerController {
    move_dir: i8,
    reversed: bool,
    acceleration: f32,
    max_speed: f32,
    jump_impulse: f32,
    friction: f32,
}

impl PlayerController {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            move_dir: 0,
            reversed: false,
            acceleration: tunables.move_acceleration,
            max_speed: tunables.max_move_speed,
            jump_impulse: tunables.jump_impulse,
            friction: tunables.friction,
        }
    }

    /// -1 left, 1 right, 0 none
    pub fn move_dir(&self) -> i8 {
        self.move_dir
    }

    /// Facing left
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Apply input to the body's velocity. Returns true if a jump started.
    pub fn apply(&mut self, body: &mut Body, input: &PlayerInput, dt: f32) -> bool {
        // Left wins when both are held
        self.move_dir = if input.left {
            -1
        } else if input.right {
            1
        } else {
            0
        };
        self.reversed = input.left;

        if self.move_dir == 0 {
            body.vel.x *= self.friction;
        } else {
            let vx = body.vel.x + self.move_dir as f32 * self.acceleration * dt;
            body.vel.x = vx.abs().min(self.max_speed) * vx.signum();
        }

        if input.jump && body.touching_ground {
            body.vel.y = -self.jump_impulse;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.move_dir = 0;
        self.reversed = false;
    }
}

/// What happened to the player during one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTick {
    pub jumped: bool,
    /// Set when leaving the viewport cost health
    pub damage: Option<DamageOutcome>,
}

/// Play `state`'s clip on enter, falling back to idle
fn animation_handler<A: Animator + 'static>(state: PlayerState) -> StateHandler<PlayerState, A> {
    StateHandler::new().on_enter(move |anim: &mut A, _| {
        anim.play_or_fallback(state.clip(), FALLBACK_CLIP);
    })
}

pub struct Player<A: Animator + 'static = ClipPlayer> {
    body: Body,
    controller: PlayerController,
    health: PlayerHealth,
    fsm: StateMachine<PlayerState, A>,
    anim: A,
    arena: Arena,
    spawn: Vec2,
    run_threshold: f32,
    out_of_bounds_damage: u32,
}

impl<A: Animator + 'static> Player<A> {
    pub fn new(tunables: &Tunables, mut anim: A) -> Self {
        let spawn = Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1);
        let mut builder = StateMachine::builder(PlayerState::Idle).table(PlayerState::transition_table());
        for state in PlayerState::ALL {
            builder = builder.handler(state, animation_handler(state));
        }
        let fsm = builder.build(&mut anim);

        Self {
            body: Body::new(spawn, Vec2::new(PLAYER_SIZE.0, PLAYER_SIZE.1)).with_gravity(tunables.gravity),
            controller: PlayerController::new(tunables),
            health: PlayerHealth::new(tunables.max_health, tunables.invulnerability, tunables.flash_period),
            fsm,
            anim,
            arena: tunables.arena(),
            spawn,
            run_threshold: tunables.run_threshold,
            out_of_bounds_damage: tunables.out_of_bounds_damage,
        }
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    pub fn health(&self) -> &PlayerHealth {
        &self.health
    }

    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    pub fn state(&self) -> PlayerState {
        self.fsm.current()
    }

    pub fn state_machine(&self) -> &StateMachine<PlayerState, A> {
        &self.fsm
    }

    pub fn anim(&self) -> &A {
        &self.anim
    }

    /// One player tick: input, physics, invulnerability blink, state
    /// classification, bounds check. Does nothing while paused or over.
    pub fn update(&mut self, dt: f32, input: &PlayerInput, session: &mut GameSession) -> PlayerTick {
        let mut tick = PlayerTick::default();
        if !session.is_running() {
            return tick;
        }

        tick.jumped = self.controller.apply(&mut self.body, input, dt);
        self.body.step(dt, Some(self.arena.ground_y));

        if let Some(visible) = self.health.update(dt) {
            self.anim.set_visible(visible);
        }

        let next = classify(self.body.touching_ground, self.body.vel, self.run_threshold);
        self.enter_state(next);
        self.fsm.update(&mut self.anim, dt);
        self.anim.set_flip_x(self.controller.is_reversed());

        if self.arena.is_outside_by(self.body.pos, self.body.size) {
            tick.damage = Some(self.take_damage(self.out_of_bounds_damage, session));
            self.body.pos = self.arena.center();
            self.body.vel = Vec2::ZERO;
        }

        tick
    }

    pub fn take_damage(&mut self, amount: u32, session: &mut GameSession) -> DamageOutcome {
        let outcome = self.health.take_damage(amount, session);
        if outcome.is_fatal() {
            self.anim.set_visible(true);
        }
        outcome
    }

    /// Back to a fresh run: full health, spawn point, idle
    pub fn reset(&mut self) {
        self.health.reset();
        self.controller.reset();
        self.body.pos = self.spawn;
        self.body.vel = Vec2::ZERO;
        self.body.touching_ground = false;
        self.anim.set_visible(true);
        self.anim.set_flip_x(false);
        self.fsm.reset(&mut self.anim, Some(PlayerState::Idle));
    }

    /// Feed the classifier's state to the machine if it changed
    fn enter_state(&mut self, next: PlayerState) {
        let current = self.fsm.current();
        if next == current || self.fsm.transition_to(&mut self.anim, next, false) {
            return;
        }
        // Landing without a recorded apex: pass through Falling
        if current == PlayerState::Jumping
            && self.fsm.transition_to(&mut self.anim, PlayerState::Falling, false)
        {
            self.fsm.transition_to(&mut self.anim, next, false);
        }
    }
}

impl<A: Animator + std::fmt::Debug + 'static> std::fmt::Debug for Player<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("body", &self.body)
            .field("health", &self.health)
            .field("state", &self.fsm.current())
            .field("anim", &self.anim)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn player() -> Player {
        Player::new(&Tunables::default(), ClipPlayer::player())
    }

    /// Step until the player rests on the ground
    fn settle(player: &mut Player, session: &mut GameSession) {
        for _ in 0..120 {
            player.update(SIM_DT, &PlayerInput::default(), session);
        }
        assert!(player.body().touching_ground);
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify(false, Vec2::new(200.0, -10.0), 10.0), PlayerState::Jumping);
        assert_eq!(classify(false, Vec2::new(200.0, 0.0), 10.0), PlayerState::Falling);
        assert_eq!(classify(false, Vec2::new(0.0, 50.0), 10.0), PlayerState::Falling);
        assert_eq!(classify(true, Vec2::new(-11.0, 0.0), 10.0), PlayerState::Running);
        assert_eq!(classify(true, Vec2::new(10.0, 0.0), 10.0), PlayerState::Idle);
        assert_eq!(classify(true, Vec2::ZERO, 10.0), PlayerState::Idle);
    }

    #[test]
    fn test_transition_table_shape() {
        let table = PlayerState::transition_table();
        assert_eq!(table.len(), 4);
        assert_eq!(table[&PlayerState::Jumping], vec![PlayerState::Falling]);
        assert!(!table[&PlayerState::Idle].contains(&PlayerState::Idle));
    }

    #[test]
    fn test_damage_and_invulnerability_window() {
        let mut session = GameSession::new();
        let mut health = PlayerHealth::new(100, 2.0, 0.1);

        assert_eq!(health.take_damage(30, &mut session), DamageOutcome::Survived);
        assert_eq!(health.current(), 70);
        assert!(health.is_invulnerable());

        assert_eq!(health.take_damage(30, &mut session), DamageOutcome::Ignored);
        assert_eq!(health.current(), 70);

        // Window elapses
        for _ in 0..21 {
            health.update(0.1);
        }
        assert!(!health.is_invulnerable());

        assert_eq!(health.take_damage(100, &mut session), DamageOutcome::Died);
        assert_eq!(health.current(), 0);
        assert!(session.is_game_over());

        assert_eq!(health.take_damage(1, &mut session), DamageOutcome::Ignored);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn test_no_damage_after_game_over() {
        let mut session = GameSession::new();
        session.set_game_over(true);
        let mut health = PlayerHealth::new(100, 2.0, 0.1);
        assert_eq!(health.take_damage(10, &mut session), DamageOutcome::Ignored);
        assert_eq!(health.current(), 100);
    }

    #[test]
    fn test_blink_while_invulnerable() {
        let mut session = GameSession::new();
        let mut health = PlayerHealth::new(100, 1.0, 0.1);
        assert_eq!(health.update(0.05), None);

        health.take_damage(10, &mut session);
        let mut seen_hidden = false;
        let mut seen_visible = false;
        let mut last = None;
        for _ in 0..25 {
            last = health.update(0.05);
            match last {
                Some(true) => seen_visible = true,
                Some(false) => seen_hidden = true,
                None => {}
            }
        }
        assert!(seen_hidden && seen_visible);
        // Ends visible and vulnerable
        assert_eq!(last, None);
        assert!(!health.is_invulnerable());
    }

    #[test]
    fn test_controller_accelerates_and_clamps() {
        let t = Tunables::default();
        let mut controller = PlayerController::new(&t);
        let mut body = Body::new(Vec2::ZERO, Vec2::ONE);
        let right = PlayerInput {
            right: true,
            ..Default::default()
        };

        controller.apply(&mut body, &right, SIM_DT);
        assert_eq!(body.vel.x, 300.0);
        assert!(!controller.is_reversed());

        controller.apply(&mut body, &PlayerInput::default(), SIM_DT);
        assert!((body.vel.x - 240.0).abs() < 1e-3);

        let left = PlayerInput {
            left: true,
            ..Default::default()
        };
        controller.apply(&mut body, &left, SIM_DT);
        assert_eq!(body.vel.x, -300.0);
        assert!(controller.is_reversed());
        assert_eq!(controller.move_dir(), -1);
    }

    #[test]
    fn test_jump_requires_ground() {
        let t = Tunables::default();
        let mut controller = PlayerController::new(&t);
        let mut body = Body::new(Vec2::ZERO, Vec2::ONE);
        let jump = PlayerInput {
            jump: true,
            ..Default::default()
        };

        assert!(!controller.apply(&mut body, &jump, SIM_DT));
        body.touching_ground = true;
        assert!(controller.apply(&mut body, &jump, SIM_DT));
        assert_eq!(body.vel.y, -350.0);
    }

    #[test]
    fn test_player_starts_idle_and_falls() {
        let mut session = GameSession::new();
        let mut p = player();
        assert_eq!(p.state(), PlayerState::Idle);
        assert_eq!(p.anim().current_clip(), Some("player_idle"));

        p.update(SIM_DT, &PlayerInput::default(), &mut session);
        assert_eq!(p.state(), PlayerState::Falling);
        assert_eq!(p.anim().current_clip(), Some("player_jump"));

        settle(&mut p, &mut session);
        assert_eq!(p.state(), PlayerState::Idle);
        assert_eq!(p.anim().current_clip(), Some("player_idle"));
    }

    #[test]
    fn test_run_jump_fall_cycle() {
        let mut session = GameSession::new();
        let mut p = player();
        settle(&mut p, &mut session);

        let run = PlayerInput {
            right: true,
            ..Default::default()
        };
        p.update(SIM_DT, &run, &mut session);
        assert_eq!(p.state(), PlayerState::Running);
        assert_eq!(p.anim().current_clip(), Some("player_run"));

        let jump = PlayerInput {
            jump: true,
            ..Default::default()
        };
        let tick = p.update(SIM_DT, &jump, &mut session);
        assert!(tick.jumped);
        assert_eq!(p.state(), PlayerState::Jumping);

        let mut saw_falling = false;
        for _ in 0..120 {
            p.update(SIM_DT, &PlayerInput::default(), &mut session);
            saw_falling |= p.state() == PlayerState::Falling;
        }
        assert!(saw_falling);
        assert!(p.state() == PlayerState::Idle || p.state() == PlayerState::Running);
    }

    #[test]
    fn test_missing_clip_uses_idle() {
        let mut session = GameSession::new();
        let mut p = Player::new(&Tunables::default(), ClipPlayer::new(["player_idle"]));
        p.update(SIM_DT, &PlayerInput::default(), &mut session);
        assert_eq!(p.state(), PlayerState::Falling);
        assert_eq!(p.anim().current_clip(), Some("player_idle"));
    }

    #[test]
    fn test_leaving_viewport_costs_health() {
        let mut session = GameSession::new();
        let mut p = player();
        settle(&mut p, &mut session);

        p.body_mut().pos.x = -30.0;
        let tick = p.update(SIM_DT, &PlayerInput::default(), &mut session);
        assert_eq!(tick.damage, Some(DamageOutcome::Survived));
        assert_eq!(p.health().current(), 50);
        assert_eq!(p.pos(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_paused_player_frozen() {
        let mut session = GameSession::new();
        let mut p = player();
        session.pause();
        let before = p.pos();
        p.update(SIM_DT, &PlayerInput::default(), &mut session);
        assert_eq!(p.pos(), before);
        assert_eq!(p.state(), PlayerState::Idle);
    }

    #[test]
    fn test_reset_restores_player() {
        let mut session = GameSession::new();
        let mut p = player();
        settle(&mut p, &mut session);
        p.take_damage(40, &mut session);
        p.reset();
        assert_eq!(p.health().current(), 100);
        assert!(!p.health().is_invulnerable());
        assert_eq!(p.state(), PlayerState::Idle);
        assert_eq!(p.state_machine().previous(), None);
        assert_eq!(p.pos(), Vec2::new(200.0, 100.0));
    }
}
