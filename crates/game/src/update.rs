//! Per-tick simulation: pilot requests, carrier floor, flight, stick, engine sound, HUD.

use engine_core::MAX_SIM_STEP;

use crate::hud::{CockpitStick, HudData};
use crate::pilot::PilotCommand;
use crate::state::{GameState, DECK_CLEARANCE};

/// Advance one tick of `dt` seconds with the scripted pilot at the controls.
pub fn step(state: &mut GameState, dt: f32) {
    let command = state.pilot_command(dt);
    apply_command(state, dt, &command);
}

/// Advance one tick with an explicit command. `dt` is clamped to `[0, MAX_SIM_STEP]`.
///
/// `brake` and `auto_level` are held states; `pause` and `reset` are one-shot
/// requests (pause toggles).
pub fn apply_command(state: &mut GameState, dt: f32, command: &PilotCommand) {
    let dt = dt.clamp(0.0, MAX_SIM_STEP);

    if command.reset {
        log::info!("Aircraft reset to spawn");
        state.jet.reset();
    }
    if command.pause {
        state.paused = !state.paused;
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    }
    state.brake_engaged = command.brake;
    state.auto_level = command.auto_level;

    if let Some(deck) = &state.carrier {
        let p = state.jet.position();
        let floor = deck.floor_height_at(&state.physics, p.x, p.z) + DECK_CLEARANCE;
        state.jet.raise_floor_to(floor);
    }

    if !state.paused {
        state
            .jet
            .update(dt, &command.input, state.brake_engaged, state.auto_level);
    }

    state.stick = CockpitStick::from_input(&command.input);
    log::trace!("Stick pitch {:.3} roll {:.3}", state.stick.pitch, state.stick.roll);

    if state.engine_sound.set_paused(state.paused) {
        if let Some(player) = state.audio.as_mut() {
            player.set_paused(state.paused);
        }
    }
    let frame = state.engine_sound.update(dt, state.jet.throttle());
    if let Some(player) = state.audio.as_mut() {
        if let Err(e) = player.apply(&frame) {
            log::warn!("Engine audio failed, muting: {:#}", e);
            state.audio = None;
        }
    }

    if state.hud_interval > 0.0 {
        state.hud_timer += dt;
        if state.hud_timer >= state.hud_interval {
            state.hud_timer -= state.hud_interval;
            let hud = HudData::from_flight(&state.jet, state.paused, state.brake_engaged);
            log::info!("[{:?}] {}", state.pilot.phase(), hud.console_line());
        }
    }
}
