//! Fixed timestep simulation tick
//!
//! Advances the whole world by one step: pause handling, the player, the
//! spawn director and its enemies, then contact resolution. Everything the
//! host needs to react to (audio, high scores) comes back as `GameEvent`s.

use serde::{Deserialize, Serialize};

use super::anim::ClipPlayer;
use super::enemy::{EnemyId, EnemyKind};
use super::player::{DamageOutcome, Player, PlayerInput};
use super::session::GameSession;
use super::spawner::SpawnDirector;
use crate::settings::Tunables;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Pause toggle (edge, not held)
    pub pause: bool,
}

impl TickInput {
    pub fn player(&self) -> PlayerInput {
        PlayerInput {
            left: self.left,
            right: self.right,
            jump: self.jump,
        }
    }
}

/// Things that happened during a tick, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Jump,
    EnemySpawned { kind: EnemyKind },
    /// An enemy touched the player and was recycled
    EnemyHit { kind: EnemyKind },
    PlayerHurt { health: u32 },
    PlayerDied,
    /// Emitted once per run
    GameOver { score: u64 },
}

/// Everything one run needs
#[derive(Debug)]
pub struct GameWorld {
    pub session: GameSession,
    pub player: Player<ClipPlayer>,
    pub spawner: SpawnDirector,
    tunables: Tunables,
    seed: u64,
    /// Simulation tick counter
    time_ticks: u64,
    game_over_reported: bool,
}

impl GameWorld {
    pub fn new(tunables: Tunables, seed: u64) -> Self {
        log::info!("New world, seed {}", seed);
        Self {
            session: GameSession::new(),
            player: Player::new(&tunables, ClipPlayer::player()),
            spawner: SpawnDirector::new(&tunables, seed),
            tunables,
            seed,
            time_ticks: 0,
            game_over_reported: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn score(&self) -> u64 {
        self.session.score()
    }

    pub fn is_game_over(&self) -> bool {
        self.session.is_game_over()
    }

    /// Start over with full health and an empty screen. The spawn RNG keeps
    /// its stream, so consecutive runs differ.
    pub fn restart(&mut self) {
        self.session.reset();
        self.player.reset();
        self.spawner.reset();
        self.time_ticks = 0;
        self.game_over_reported = false;
    }

    /// Contact between the player and enemy `id`.
    ///
    /// The enemy's damage is applied (subject to invulnerability) and the
    /// enemy is recycled unless the hit ended the game. Ids that are no
    /// longer active are ignored, so repeated reports are harmless.
    pub fn on_overlap(&mut self, id: EnemyId, events: &mut Vec<GameEvent>) {
        if self.session.is_game_over() {
            return;
        }
        let Some(enemy) = self.spawner.pool().get(id) else {
            return;
        };
        let kind = enemy.kind();
        let damage = enemy.damage();

        let outcome = self.player.take_damage(damage, &mut self.session);
        self.push_damage(outcome, events);
        if outcome.is_fatal() {
            return;
        }

        if self.spawner.pool_mut().release(id) {
            events.push(GameEvent::EnemyHit { kind });
        }
    }

    fn push_damage(&self, outcome: DamageOutcome, events: &mut Vec<GameEvent>) {
        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Survived => events.push(GameEvent::PlayerHurt {
                health: self.player.health().current(),
            }),
            DamageOutcome::Died => events.push(GameEvent::PlayerDied),
        }
    }

    /// Active enemies currently touching the player, by id
    fn contacts(&self) -> Vec<EnemyId> {
        let player = self.player.body();
        self.spawner
            .pool()
            .active_members()
            .filter(|e| player.overlaps(e.body()))
            .map(|e| e.id())
            .collect()
    }
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut GameWorld, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause {
        world.session.toggle_pause();
    }

    if !world.session.is_running() {
        report_game_over(world, &mut events);
        return events;
    }

    world.time_ticks += 1;
    world.session.advance(dt);

    let player_tick = world.player.update(dt, &input.player(), &mut world.session);
    if player_tick.jumped {
        events.push(GameEvent::Jump);
    }
    if let Some(outcome) = player_tick.damage {
        world.push_damage(outcome, &mut events);
    }

    let target = world.player.pos();
    if let Some(id) = world.spawner.update(dt, &world.session, target) {
        if let Some(enemy) = world.spawner.pool().get(id) {
            events.push(GameEvent::EnemySpawned { kind: enemy.kind() });
        }
    }

    for id in world.contacts() {
        if world.session.is_game_over() {
            break;
        }
        world.on_overlap(id, &mut events);
    }

    report_game_over(world, &mut events);
    events
}

fn report_game_over(world: &mut GameWorld, events: &mut Vec<GameEvent>) {
    if world.session.is_game_over() && !world.game_over_reported {
        world.game_over_reported = true;
        events.push(GameEvent::GameOver {
            score: world.session.score(),
        });
    }
}
