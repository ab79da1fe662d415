//! HUD readout, minimap marker and cockpit stick pose.
//! Everything here is derived from the controller's public state each tick.

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use physics::{ControlInput, FlightController};
use procgen::Minimap;
use std::path::Path;

/// Half-width of the world square the minimap covers (metres).
pub const MINIMAP_WORLD_EXTENT: f32 = 1000.0;
/// Stick deflection per unit of pitch/roll input (radians).
pub const STICK_TRAVEL: f32 = 0.18;
/// Aircraft marker radius in minimap pixels.
pub const MARKER_RADIUS: f32 = 5.0;

const WATER_COLOR: [u8; 3] = [0x2b, 0x5f, 0xa6];
const LAND_COLOR: [u8; 3] = [0x38, 0xa0, 0x49];
const MARKER_COLOR: [u8; 3] = [0xd9, 0x4a, 0x3a];

/// Round half up to a whole number for display.
pub fn format_number(value: f32) -> String {
    ((value + 0.5).floor() as i64).to_string()
}

/// All HUD text for a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HudData {
    pub speed: String,
    pub altitude: String,
    pub throttle: String,
    /// `PAUSED` and/or `BRAKE ON`, joined with ` | `; empty when neither applies.
    pub status: String,
}

impl HudData {
    pub fn new(speed: f32, altitude: f32, throttle: f32, paused: bool, brake_engaged: bool) -> Self {
        let mut status_parts = Vec::new();
        if paused {
            status_parts.push("PAUSED");
        }
        if brake_engaged {
            status_parts.push("BRAKE ON");
        }
        Self {
            speed: format!("Speed: {} m/s", format_number(speed)),
            altitude: format!("Altitude: {} m", format_number(altitude)),
            throttle: format!("Throttle: {}%", format_number(throttle * 100.0)),
            status: status_parts.join(" | "),
        }
    }

    pub fn from_flight(jet: &FlightController, paused: bool, brake_engaged: bool) -> Self {
        Self::new(jet.speed(), jet.position().y, jet.throttle(), paused, brake_engaged)
    }

    /// Single console line for the log.
    pub fn console_line(&self) -> String {
        let mut line = format!("{}  {}  {}", self.speed, self.altitude, self.throttle);
        if !self.status.is_empty() {
            line.push_str("  [");
            line.push_str(&self.status);
            line.push(']');
        }
        line
    }
}

/// Map a world position onto a `map_size` pixel minimap, clamping to the covered square.
pub fn minimap_marker(x: f32, z: f32, map_size: f32) -> (f32, f32) {
    let to_map = |c: f32| {
        let clamped = c.clamp(-MINIMAP_WORLD_EXTENT, MINIMAP_WORLD_EXTENT);
        (clamped / (MINIMAP_WORLD_EXTENT * 2.0) + 0.5) * map_size
    };
    (to_map(x), to_map(z))
}

/// Cockpit stick deflection, following the pilot's pitch and roll input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CockpitStick {
    /// Rotation about the stick's lateral axis.
    pub pitch: f32,
    /// Rotation about the stick's forward axis.
    pub roll: f32,
}

impl CockpitStick {
    pub fn from_input(input: &ControlInput) -> Self {
        Self {
            pitch: -input.pitch * STICK_TRAVEL,
            roll: -input.roll * STICK_TRAVEL,
        }
    }
}

fn blend(a: [u8; 3], b: [u8; 3], t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    Rgb([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
}

/// Draw the minimap: water blended towards land by each cell's shore value,
/// with the aircraft marker on top.
pub fn render_minimap(minimap: &Minimap, aircraft: Option<(f32, f32)>, map_size: u32) -> RgbImage {
    let map_size = map_size.max(1);
    let scale = MINIMAP_WORLD_EXTENT * 2.0 / map_size as f32;
    let marker = aircraft.map(|(x, z)| minimap_marker(x, z, map_size as f32));

    RgbImage::from_fn(map_size, map_size, |px, py| {
        let cx = px as f32 + 0.5;
        let cy = py as f32 + 0.5;
        if let Some((mx, my)) = marker {
            if (cx - mx).powi(2) + (cy - my).powi(2) <= MARKER_RADIUS * MARKER_RADIUS {
                return Rgb(MARKER_COLOR);
            }
        }
        let world_x = cx * scale - MINIMAP_WORLD_EXTENT;
        let world_z = cy * scale - MINIMAP_WORLD_EXTENT;
        let land = minimap
            .cell_at_world(f64::from(world_x), f64::from(world_z))
            .unwrap_or(0.0);
        blend(WATER_COLOR, LAND_COLOR, land)
    })
}

/// Render the minimap and write it as a PNG.
pub fn save_minimap_png(
    minimap: &Minimap,
    aircraft: Option<(f32, f32)>,
    map_size: u32,
    path: &Path,
) -> Result<()> {
    render_minimap(minimap, aircraft, map_size)
        .save(path)
        .with_context(|| format!("failed to write minimap to {}", path.display()))?;
    log::info!("Minimap written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_half_up() {
        assert_eq!(format_number(12.5), "13");
        assert_eq!(format_number(12.49), "12");
        assert_eq!(format_number(-0.5), "0");
        assert_eq!(format_number(-1.6), "-2");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn readout_text_and_status() {
        let hud = HudData::new(27.6, 118.2, 0.76, false, false);
        assert_eq!(hud.speed, "Speed: 28 m/s");
        assert_eq!(hud.altitude, "Altitude: 118 m");
        assert_eq!(hud.throttle, "Throttle: 76%");
        assert_eq!(hud.status, "");
        assert_eq!(hud.console_line(), "Speed: 28 m/s  Altitude: 118 m  Throttle: 76%");

        assert_eq!(HudData::new(0.0, 2.0, 0.0, true, true).status, "PAUSED | BRAKE ON");
        assert_eq!(HudData::new(0.0, 2.0, 0.0, false, true).status, "BRAKE ON");
        assert_eq!(HudData::new(0.0, 2.0, 0.0, true, false).status, "PAUSED");
    }

    #[test]
    fn marker_maps_and_clamps() {
        assert_eq!(minimap_marker(0.0, 0.0, 200.0), (100.0, 100.0));
        assert_eq!(minimap_marker(-1000.0, 500.0, 200.0), (0.0, 150.0));
        assert_eq!(minimap_marker(5000.0, -5000.0, 200.0), (200.0, 0.0));
    }

    #[test]
    fn stick_deflects_against_input() {
        let input = ControlInput {
            pitch: 1.0,
            roll: -0.5,
            ..Default::default()
        };
        let stick = CockpitStick::from_input(&input);
        assert!((stick.pitch + 0.18).abs() < 1e-6);
        assert!((stick.roll - 0.09).abs() < 1e-6);
        assert_eq!(CockpitStick::from_input(&ControlInput::default()), CockpitStick::default());
    }

    #[test]
    fn minimap_image_shows_land_water_and_marker() {
        // 3x3 map over the minimap square with only the middle cell dry.
        let mut cells = vec![0.0; 9];
        cells[4] = 1.0;
        let minimap = Minimap {
            resolution: 3,
            world_size: 2.0 * f64::from(MINIMAP_WORLD_EXTENT),
            cells,
        };
        let image = render_minimap(&minimap, Some((0.0, 0.0)), 64);
        assert_eq!(image.dimensions(), (64, 64));
        // Aircraft at the origin sits on the centre pixel.
        assert_eq!(*image.get_pixel(32, 32), Rgb(MARKER_COLOR));
        // Corners are open ocean.
        assert_eq!(*image.get_pixel(0, 0), Rgb(WATER_COLOR));
        // Just off the marker, the middle cell is land.
        assert_eq!(*image.get_pixel(32, 40), Rgb(LAND_COLOR));
    }
}
