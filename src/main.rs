//! Dodge the Spike entry point
//!
//! The browser build is driven from JS through `web::WebGame`. Natively this
//! runs a headless session with a simple dodging bot and logs the outcome,
//! which is handy for checking balance changes.

#[cfg(not(target_arch = "wasm32"))]
use dodge_spike::consts::SIM_DT;
#[cfg(not(target_arch = "wasm32"))]
use dodge_spike::sim::{GameEvent, GameWorld, TickInput, tick};

/// Give up after this many simulated seconds
#[cfg(not(target_arch = "wasm32"))]
const MAX_SECONDS: f32 = 300.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(12345);
    log::info!("Dodge the Spike (native, headless) seed {}", seed);

    let settings = dodge_spike::Settings::load();
    let mut world = GameWorld::new(settings.tunables, seed);
    let mut scores = dodge_spike::HighScores::load();

    let max_ticks = (MAX_SECONDS / SIM_DT) as u64;
    let mut hits = 0;
    let mut spawned = 0;
    while world.time_ticks() < max_ticks {
        let input = bot_input(&world);
        for event in tick(&mut world, &input, SIM_DT) {
            match event {
                GameEvent::EnemySpawned { .. } => spawned += 1,
                GameEvent::PlayerHurt { health } => {
                    hits += 1;
                    log::debug!("Hit at {:.1}s, health {}", world.session.elapsed(), health);
                }
                GameEvent::GameOver { score } => {
                    if let Some(rank) = scores.record(score, seed, 0.0) {
                        log::info!("Rank {} on this session's board", rank);
                    }
                }
                _ => {}
            }
        }
        if world.is_game_over() {
            break;
        }
    }

    let stats = world.spawner.pool().stats();
    log::info!(
        "Survived {}s ({} hits, {} spawned, pool {} active / {} warm)",
        world.score(),
        hits,
        spawned,
        stats.active,
        stats.pooled
    );
}

/// Run away from the nearest enemy and jump when one is close and level
#[cfg(not(target_arch = "wasm32"))]
fn bot_input(world: &GameWorld) -> TickInput {
    let me = world.player.pos();
    let nearest = world
        .spawner
        .pool()
        .active_members()
        .map(|e| e.pos())
        .min_by(|a, b| a.distance_squared(me).total_cmp(&b.distance_squared(me)));

    let Some(threat) = nearest else {
        return TickInput::default();
    };

    let delta = threat - me;
    let center = world.tunables().viewport_width / 2.0;
    // Flee horizontally, but drift back toward the middle near the walls
    let flee_left = if (me.x - center).abs() > center * 0.7 {
        me.x > center
    } else {
        delta.x > 0.0
    };

    TickInput {
        left: flee_left,
        right: !flee_left,
        jump: delta.length() < 150.0 && delta.y.abs() < 80.0,
        pause: false,
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}
