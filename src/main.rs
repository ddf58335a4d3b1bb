//! Territory Arena entry point
//!
//! Headless runner: plays one round at 60 Hz with the player sweeping in a
//! slow spiral, then prints the standings and the round report as JSON.
//!
//! Usage: `territory-arena [seed] [ticks] [settings.json]`

use glam::Vec2;
use territory_arena::ArenaSettings;
use territory_arena::sim::{GameEvent, GamePhase, Simulation, TickInput};

const TICK_DT: f32 = 1.0 / 60.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let ticks = args.next().and_then(|s| s.parse().ok()).unwrap_or(3600usize);
    let settings = match args.next() {
        Some(path) => match ArenaSettings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => ArenaSettings::default(),
    };

    log::info!("Territory Arena (headless) seed {seed}, {ticks} ticks");
    let mut sim = Simulation::new(settings, seed);
    sim.start();

    for i in 0..ticks {
        let theta = i as f32 * TICK_DT * 0.8;
        let input = TickInput::player(Vec2::new(theta.cos(), theta.sin()));
        for event in sim.tick(TICK_DT, &input) {
            match &event {
                GameEvent::Died { agent, cause } => log::info!("{agent} died: {cause:?}"),
                GameEvent::Victory { agent } => log::info!("{agent} won"),
                _ => {}
            }
        }
        if sim.phase() == GamePhase::GameOver {
            break;
        }
    }

    let output = serde_json::json!({
        "ticks": sim.state().time_ticks,
        "leaderboard": sim.leaderboard(),
        "report": sim.round_report(),
    });
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize results: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
