//! Run configuration (scenario, pacing, outputs). Loaded from config.ron at startup.

use physics::{CarrierSpec, FlightTuning};
use procgen::TerrainConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::pilot::PilotSettings;
use crate::scenario::ScenarioKind;

/// Persistent run settings. Loaded from `config.ron` in the current directory
/// unless another path is given on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// World preset to fly in.
    #[serde(default)]
    pub scenario: ScenarioKind,
    /// Simulated flight time in seconds.
    #[serde(default = "default_sim_seconds")]
    pub sim_seconds: f32,
    /// Ticks per simulated second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    /// Pace ticks against the wall clock instead of running flat out.
    #[serde(default)]
    pub realtime: bool,
    /// Ground mesh grid cells per side.
    #[serde(default = "default_terrain_subdivisions")]
    pub terrain_subdivisions: u32,
    /// Minimap samples per side.
    #[serde(default = "default_minimap_resolution")]
    pub minimap_resolution: usize,
    /// Write the minimap (with the final aircraft position) to this PNG.
    #[serde(default)]
    pub minimap_png: Option<PathBuf>,
    /// Edge length of the exported minimap in pixels.
    #[serde(default = "default_minimap_png_size")]
    pub minimap_png_size: u32,
    /// Seconds between HUD log lines.
    #[serde(default = "default_hud_interval")]
    pub hud_interval: f32,
    /// Replace the preset's world seed.
    #[serde(default)]
    pub world_seed: Option<f64>,
    /// Replace the preset terrain entirely.
    #[serde(default)]
    pub terrain: Option<TerrainConfig>,
    /// Replace the stock aircraft tuning.
    #[serde(default)]
    pub flight: Option<FlightTuning>,
    #[serde(default)]
    pub carrier: CarrierSpec,
    #[serde(default)]
    pub pilot: PilotSettings,
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Engine sound output. Off by default so headless runs need no device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Directory holding loop.wav, start.wav and end.wav.
    #[serde(default = "default_sound_dir")]
    pub sound_dir: PathBuf,
    #[serde(default = "default_master_volume")]
    pub master_volume: f64,
}

fn default_sim_seconds() -> f32 {
    60.0
}
fn default_tick_rate() -> f64 {
    60.0
}
fn default_terrain_subdivisions() -> u32 {
    256
}
fn default_minimap_resolution() -> usize {
    64
}
fn default_minimap_png_size() -> u32 {
    256
}
fn default_hud_interval() -> f32 {
    1.0
}
fn default_sound_dir() -> PathBuf {
    PathBuf::from("assets/sounds")
}
fn default_master_volume() -> f64 {
    1.0
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sound_dir: default_sound_dir(),
            master_volume: default_master_volume(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioKind::default(),
            sim_seconds: default_sim_seconds(),
            tick_rate: default_tick_rate(),
            realtime: false,
            terrain_subdivisions: default_terrain_subdivisions(),
            minimap_resolution: default_minimap_resolution(),
            minimap_png: None,
            minimap_png_size: default_minimap_png_size(),
            hud_interval: default_hud_interval(),
            world_seed: None,
            terrain: None,
            flight: None,
            carrier: CarrierSpec::default(),
            pilot: PilotSettings::default(),
            audio: AudioConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load config from `path` (or `config.ron`). If the file is missing or invalid, returns default config.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        match std::fs::read_to_string(&path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(_) => {
                log::info!("No config at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Terrain for this run: the explicit override, else the scenario preset,
    /// with the world seed applied last.
    pub fn terrain_config(&self) -> TerrainConfig {
        let base = self
            .terrain
            .clone()
            .unwrap_or_else(|| self.scenario.terrain_preset());
        match self.world_seed {
            Some(seed) => base.with_world_seed(seed),
            None => base,
        }
    }

    pub fn flight_tuning(&self) -> FlightTuning {
        self.flight.clone().unwrap_or_default()
    }

    /// Number of ticks covering `sim_seconds`.
    pub fn total_ticks(&self) -> u64 {
        if self.tick_rate <= 0.0 || !self.tick_rate.is_finite() {
            return 0;
        }
        (f64::from(self.sim_seconds.max(0.0)) * self.tick_rate).round() as u64
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}
