//! Simulation state for one run: world, aircraft, collaborators and toggles.

use anyhow::{Context, Result};
use audio::{EngineAudio, EngineSound};
use engine_core::Time;
use glam::Vec3;
use physics::{CarrierDeck, FlightController, PhysicsWorld};
use procgen::{find_spawn_point, land_mask_at, shore_blend, Minimap, TerrainData, DRY_LAND_BLEND};

use crate::config::GameConfig;
use crate::hud::CockpitStick;
use crate::pilot::{PilotCommand, ScriptedPilot};
use crate::scenario::{Scenario, SpawnSite};

/// Clearance kept between the aircraft floor and the carrier deck.
pub const DECK_CLEARANCE: f32 = 0.3;
/// Search radius and spacing for relocating a runway spawn that ended up in water.
const SPAWN_SEARCH_RADIUS: f64 = 2000.0;
const SPAWN_SEARCH_STEP: f64 = 25.0;

/// Everything the host loop advances each tick.
pub struct GameState {
    pub scenario: Scenario,
    pub terrain: TerrainData,
    pub minimap: Minimap,
    pub physics: PhysicsWorld,
    pub carrier: Option<CarrierDeck>,
    pub jet: FlightController,
    pub pilot: ScriptedPilot,
    pub engine_sound: EngineSound,
    pub audio: Option<EngineAudio>,
    pub time: Time,
    pub stick: CockpitStick,
    pub brake_engaged: bool,
    pub auto_level: bool,
    pub paused: bool,
    /// Seconds between HUD log lines (0 disables them).
    pub hud_interval: f32,
    pub hud_timer: f32,
}

impl GameState {
    /// Build the world for `config`: terrain, collision, optional carrier, aircraft.
    pub fn new(config: &GameConfig) -> Result<Self> {
        let terrain_config = config.terrain_config();
        terrain_config.validate().context("invalid terrain config")?;
        let tuning = config.flight_tuning();
        tuning.validate().context("invalid flight tuning")?;

        let scenario = Scenario::with_terrain(config.scenario, terrain_config);
        log::info!("Building scenario: {}", scenario.kind.label());

        let terrain = TerrainData::generate(scenario.terrain.clone(), config.terrain_subdivisions);
        log::info!(
            "Terrain: {} vertices, {:.0}% land, peak {:.1} m",
            terrain.vertices.len(),
            terrain.land_fraction() * 100.0,
            terrain.max_height()
        );

        let mut physics = PhysicsWorld::new();
        let size = scenario.terrain.size as f32;
        physics
            .add_terrain_heightfield(&terrain.heightmap, terrain.resolution, terrain.resolution, size, size)
            .context("failed to build terrain collider")?;
        physics.update_query_pipeline();

        let minimap = Minimap::sample(&scenario.terrain, config.minimap_resolution);
        log::info!(
            "Minimap: {}x{} cells, {:.0}% land",
            minimap.resolution,
            minimap.resolution,
            minimap.land_fraction() * 100.0
        );

        let (mut jet, carrier) = match scenario.spawn {
            SpawnSite::Runway(position) => {
                let position = dry_spawn(&scenario, position);
                (FlightController::new(tuning, position)?, None)
            }
            SpawnSite::CarrierDeck { ocean_y } => {
                let deck = CarrierDeck::build(&mut physics, &config.carrier, ocean_y);
                let jet = FlightController::new(tuning, deck.start_position)?
                    .with_spawn_rotation(deck.launch_rotation());
                (jet, Some(deck))
            }
        };
        jet.reset();
        if let Some(deck) = &carrier {
            jet.raise_floor_to(deck.deck_height + DECK_CLEARANCE);
        }

        let audio = if config.audio.enabled {
            match EngineAudio::new(&config.audio.sound_dir) {
                Ok(mut player) => {
                    player.set_master_volume(config.audio.master_volume);
                    Some(player)
                }
                Err(e) => {
                    log::warn!("Engine audio unavailable, continuing silently: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut time = Time::new();
        time.set_fixed_rate(config.tick_rate);

        Ok(Self {
            scenario,
            terrain,
            minimap,
            physics,
            carrier,
            jet,
            pilot: ScriptedPilot::new(config.pilot.clone()),
            engine_sound: EngineSound::new(),
            audio,
            time,
            stick: CockpitStick::default(),
            brake_engaged: true,
            auto_level: false,
            paused: false,
            hud_interval: config.hud_interval,
            hud_timer: 0.0,
        })
    }

    /// Ask the scripted pilot for this tick's controls.
    pub fn pilot_command(&mut self, dt: f32) -> PilotCommand {
        self.pilot.command(dt, &self.jet)
    }

    /// Height of the aircraft above the terrain surface below it, if over the patch.
    pub fn height_above_terrain(&self) -> Option<f32> {
        let p = self.jet.position();
        let ceiling = p.y.max(self.terrain.max_height()) + 10.0;
        self.physics
            .ground_height_at(p.x, p.z, ceiling)
            .map(|ground| p.y - ground)
    }
}

/// Keep a runway spawn if it is on dry land, else move it to the nearest dry grid point.
fn dry_spawn(scenario: &Scenario, position: Vec3) -> Vec3 {
    let config = &scenario.terrain;
    let (x, z) = (f64::from(position.x), f64::from(position.z));
    if shore_blend(land_mask_at(x, z, config), config) >= DRY_LAND_BLEND {
        return position;
    }
    match find_spawn_point(config, SPAWN_SEARCH_RADIUS, SPAWN_SEARCH_STEP) {
        Some([sx, sz]) => {
            log::warn!(
                "Runway spawn ({:.0}, {:.0}) is over water, moving to ({:.0}, {:.0})",
                x,
                z,
                sx,
                sz
            );
            Vec3::new(sx as f32, position.y, sz as f32)
        }
        None => {
            log::warn!("No dry land within {:.0} m, spawning over water", SPAWN_SEARCH_RADIUS);
            position
        }
    }
}
