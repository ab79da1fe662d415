//! Island Flight - headless flight over a procedurally generated island chain.
//!
//! Usage: `islandflight [config.ron]`

mod config;
mod hud;
mod pilot;
mod scenario;
mod state;
mod update;

use anyhow::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use config::GameConfig;
use hud::HudData;
use state::GameState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let labels: Vec<&str> = scenario::ScenarioKind::ALL.iter().map(|k| k.label()).collect();
    log::debug!("Scenarios: {}", labels.join(", "));

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = GameConfig::load(config_path.as_deref());

    log::info!(
        "Starting Island Flight: {} for {:.0} s at {} Hz",
        config.scenario.label(),
        config.sim_seconds,
        config.tick_rate
    );

    let mut state = GameState::new(&config)?;
    run(&mut state, &config);

    let jet = &state.jet;
    let p = jet.position();
    log::info!(
        "Finished after {:.1} s ({} frames): {}",
        state.time.elapsed_seconds(),
        state.time.frame_count(),
        HudData::from_flight(jet, state.paused, state.brake_engaged).console_line()
    );
    let attitude = jet.transform().attitude();
    log::info!(
        "Final position ({:.1}, {:.1}, {:.1}), pitch {:.1} deg, roll {:.1} deg, pilot {:?}",
        p.x,
        p.y,
        p.z,
        attitude.pitch.to_degrees(),
        attitude.roll.to_degrees(),
        state.pilot.phase()
    );
    if let Some(agl) = state.height_above_terrain() {
        log::info!("Height above terrain: {:.1} m", agl);
    }

    if let Some(path) = &config.minimap_png {
        hud::save_minimap_png(&state.minimap, Some((p.x, p.z)), config.minimap_png_size, path)?;
    }
    Ok(())
}

/// Run the configured number of ticks, optionally paced against the wall clock.
fn run(state: &mut GameState, config: &GameConfig) {
    let total_ticks = config.total_ticks();
    if total_ticks == 0 {
        log::warn!("Nothing to simulate (sim_seconds {}, tick_rate {})", config.sim_seconds, config.tick_rate);
        return;
    }
    let started = Instant::now();

    if config.realtime {
        run_realtime(state, total_ticks);
    } else {
        let step = state.time.fixed_timestep();
        for _ in 0..total_ticks {
            state.time.advance(step);
            let dt = state.time.sim_delta_seconds();
            update::step(state, dt);
        }
    }

    let wall = started.elapsed();
    if wall > Duration::ZERO {
        log::info!(
            "Simulated {} ticks in {:.2} s wall time ({:.0}x realtime)",
            total_ticks,
            wall.as_secs_f32(),
            state.time.elapsed_seconds() / wall.as_secs_f32()
        );
    }
}

/// Fixed-rate ticks driven by the wall clock, sleeping until the next tick is due.
fn run_realtime(state: &mut GameState, total_ticks: u64) {
    let dt = state.time.fixed_timestep_seconds();
    let mut ticks = 0;
    while ticks < total_ticks {
        state.time.update();
        while ticks < total_ticks && state.time.should_fixed_update() {
            update::step(state, dt);
            ticks += 1;
        }
        std::thread::sleep(state.time.until_next_fixed_update());
    }
}
