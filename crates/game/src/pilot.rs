//! Scripted "takeoff and climb" pilot that stands in for a human at the stick.
//!
//! The pilot reads the controller's public state each tick and answers with a
//! [`PilotCommand`]; it never touches the aircraft directly.

use physics::{ControlInput, FlightController};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotSettings {
    /// Seconds on the brakes before the takeoff roll.
    pub settle_time: f32,
    /// Margin over takeoff speed before rotating (m/s).
    pub rotate_margin: f32,
    /// Stick pull while rotating.
    pub rotate_pitch: f32,
    /// Height above the floor that counts as safely airborne.
    pub airborne_height: f32,
    pub cruise_altitude: f32,
    /// Altitude band around cruise where the throttle is left alone.
    pub altitude_band: f32,
    /// Rudder held in cruise so the aircraft circles instead of hitting the world edge.
    pub cruise_yaw: f32,
}

impl Default for PilotSettings {
    fn default() -> Self {
        Self {
            settle_time: 1.0,
            rotate_margin: 2.0,
            rotate_pitch: 0.3,
            airborne_height: 1.0,
            cruise_altitude: 120.0,
            altitude_band: 5.0,
            cruise_yaw: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotPhase {
    Holding,
    TakeoffRoll,
    Rotate,
    Climb,
    Cruise,
}

/// Everything the host needs from the pilot for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PilotCommand {
    pub input: ControlInput,
    pub brake: bool,
    pub auto_level: bool,
    pub pause: bool,
    pub reset: bool,
}

#[derive(Debug, Clone)]
pub struct ScriptedPilot {
    settings: PilotSettings,
    phase: PilotPhase,
    phase_time: f32,
}

impl ScriptedPilot {
    pub fn new(settings: PilotSettings) -> Self {
        Self {
            settings,
            phase: PilotPhase::Holding,
            phase_time: 0.0,
        }
    }

    pub fn phase(&self) -> PilotPhase {
        self.phase
    }

    fn enter(&mut self, phase: PilotPhase, jet: &FlightController) {
        log::info!(
            "Pilot: {:?} -> {:?} at {:.1} m/s, {:.1} m",
            self.phase,
            phase,
            jet.speed(),
            jet.position().y
        );
        self.phase = phase;
        self.phase_time = 0.0;
    }

    /// Decide this tick's controls from the aircraft's current state.
    pub fn command(&mut self, dt: f32, jet: &FlightController) -> PilotCommand {
        self.phase_time += dt;
        let s = &self.settings;
        let takeoff_speed = jet.tuning().takeoff_speed;
        let height = jet.position().y - jet.min_altitude();

        let next = match self.phase {
            PilotPhase::Holding if self.phase_time >= s.settle_time => Some(PilotPhase::TakeoffRoll),
            PilotPhase::TakeoffRoll if jet.speed() >= takeoff_speed + s.rotate_margin => {
                Some(PilotPhase::Rotate)
            }
            PilotPhase::Rotate if height >= s.airborne_height => Some(PilotPhase::Climb),
            // Settled back onto the runway: go round again.
            PilotPhase::Climb if jet.is_grounded() => Some(PilotPhase::TakeoffRoll),
            PilotPhase::Climb if jet.position().y >= s.cruise_altitude => Some(PilotPhase::Cruise),
            _ => None,
        };
        if let Some(phase) = next {
            self.enter(phase, jet);
        }

        let s = &self.settings;
        let full_power = ControlInput {
            throttle_up: true,
            ..Default::default()
        };
        match self.phase {
            PilotPhase::Holding => PilotCommand {
                brake: true,
                ..Default::default()
            },
            PilotPhase::TakeoffRoll => PilotCommand {
                input: full_power,
                ..Default::default()
            },
            PilotPhase::Rotate => PilotCommand {
                input: ControlInput {
                    pitch: s.rotate_pitch,
                    ..full_power
                },
                ..Default::default()
            },
            PilotPhase::Climb => PilotCommand {
                input: full_power,
                auto_level: true,
                ..Default::default()
            },
            PilotPhase::Cruise => {
                let error = s.cruise_altitude - jet.position().y;
                PilotCommand {
                    input: ControlInput {
                        yaw: s.cruise_yaw,
                        throttle_up: error > s.altitude_band,
                        throttle_down: error < -s.altitude_band,
                        ..Default::default()
                    },
                    auto_level: true,
                    ..Default::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use physics::FlightTuning;

    const DT: f32 = 1.0 / 60.0;

    fn fly(pilot: &mut ScriptedPilot, jet: &mut FlightController, seconds: f32) {
        let ticks = (seconds / DT) as usize;
        for _ in 0..ticks {
            let cmd = pilot.command(DT, jet);
            jet.update(DT, &cmd.input, cmd.brake, cmd.auto_level);
        }
    }

    fn parked_jet() -> FlightController {
        let mut jet = FlightController::new(FlightTuning::default(), Vec3::new(0.0, 2.0, -124.0)).unwrap();
        jet.reset();
        jet
    }

    #[test]
    fn holds_brakes_then_rolls() {
        let mut pilot = ScriptedPilot::new(PilotSettings::default());
        let mut jet = parked_jet();
        fly(&mut pilot, &mut jet, 0.5);
        assert_eq!(pilot.phase(), PilotPhase::Holding);
        assert_eq!(jet.speed(), 0.0);

        fly(&mut pilot, &mut jet, 1.0);
        assert_eq!(pilot.phase(), PilotPhase::TakeoffRoll);
        assert!(jet.throttle() > 0.0);
    }

    #[test]
    fn takes_off_and_climbs_to_cruise() {
        let settings = PilotSettings {
            cruise_altitude: 40.0,
            ..Default::default()
        };
        let mut pilot = ScriptedPilot::new(settings);
        let mut jet = parked_jet();
        let mut left_ground = false;
        for _ in 0..(120.0 / DT) as usize {
            let cmd = pilot.command(DT, &jet);
            jet.update(DT, &cmd.input, cmd.brake, cmd.auto_level);
            left_ground |= jet.position().y > 10.0;
            if pilot.phase() == PilotPhase::Cruise {
                break;
            }
        }
        assert!(left_ground, "never climbed: {:?}", jet.position());
        assert_eq!(pilot.phase(), PilotPhase::Cruise);
    }

    #[test]
    fn cruise_trims_throttle_around_altitude() {
        let mut pilot = ScriptedPilot::new(PilotSettings::default());
        pilot.phase = PilotPhase::Cruise;
        let mut jet = FlightController::new(FlightTuning::default(), Vec3::new(0.0, 200.0, 0.0)).unwrap();
        let high = pilot.command(DT, &jet);
        assert!(high.input.throttle_down && !high.input.throttle_up);
        assert!(high.auto_level);

        jet.set_position(Vec3::new(0.0, 50.0, 0.0));
        let low = pilot.command(DT, &jet);
        assert!(low.input.throttle_up && !low.input.throttle_down);
    }
}
