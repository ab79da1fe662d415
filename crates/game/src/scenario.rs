//! Scenario presets: which world to build and where the aircraft starts.

use glam::Vec3;
use procgen::TerrainConfig;
use serde::{Deserialize, Serialize};

/// Runway length of the stock island strip.
pub const RUNWAY_LENGTH: f32 = 260.0;
/// Length the airport runway is scaled to.
pub const AIRPORT_RUNWAY_LENGTH: f32 = 320.0;
/// Height of the ocean surface above the sea floor.
pub const OCEAN_SURFACE_OFFSET: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Rolling island chain with a runway at the centre.
    #[default]
    Basic,
    /// Wide flattened plateau hosting an airport.
    Airport,
    /// Open sea with sparse islands and an anchored carrier.
    Carrier,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [Self::Basic, Self::Airport, Self::Carrier];

    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Island Runway",
            Self::Airport => "Airport",
            Self::Carrier => "Carrier Ops",
        }
    }

    pub fn terrain_preset(self) -> TerrainConfig {
        match self {
            Self::Basic => TerrainConfig::basic(),
            Self::Airport => TerrainConfig::airport(),
            Self::Carrier => TerrainConfig::carrier(),
        }
    }
}

/// Resolved scenario: terrain plus how the aircraft is placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub terrain: TerrainConfig,
    pub spawn: SpawnSite,
}

/// Where the aircraft starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnSite {
    /// Fixed runway threshold on the ground.
    Runway(Vec3),
    /// On the carrier deck; the exact spot comes from the deck geometry.
    CarrierDeck {
        /// Ocean surface the carrier floats on.
        ocean_y: f32,
    },
}

impl Scenario {
    pub fn from_kind(kind: ScenarioKind) -> Self {
        Self::with_terrain(kind, kind.terrain_preset())
    }

    /// Scenario placement with caller-supplied terrain.
    pub fn with_terrain(kind: ScenarioKind, terrain: TerrainConfig) -> Self {
        let spawn = match kind {
            ScenarioKind::Basic => SpawnSite::Runway(Vec3::new(0.0, 2.0, -RUNWAY_LENGTH / 2.0 + 6.0)),
            ScenarioKind::Airport => {
                let threshold = (AIRPORT_RUNWAY_LENGTH * 0.12).max(20.0);
                SpawnSite::Runway(Vec3::new(0.0, 2.0, -AIRPORT_RUNWAY_LENGTH / 2.0 + threshold))
            }
            ScenarioKind::Carrier => SpawnSite::CarrierDeck {
                ocean_y: terrain.sea_floor_height as f32 + OCEAN_SURFACE_OFFSET,
            },
        };
        Self {
            kind,
            terrain,
            spawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runway_spawns() {
        let basic = Scenario::from_kind(ScenarioKind::Basic);
        assert_eq!(basic.spawn, SpawnSite::Runway(Vec3::new(0.0, 2.0, -124.0)));
        assert_eq!(basic.terrain, TerrainConfig::basic());

        let airport = Scenario::from_kind(ScenarioKind::Airport);
        match airport.spawn {
            SpawnSite::Runway(p) => assert!((p.z - (-160.0 + 38.4)).abs() < 1e-3),
            other => panic!("airport should start on a runway, got {:?}", other),
        }
    }

    #[test]
    fn carrier_floats_on_sea_surface() {
        let carrier = Scenario::from_kind(ScenarioKind::Carrier);
        let expected = carrier.terrain.sea_floor_height as f32 + 0.2;
        assert_eq!(carrier.spawn, SpawnSite::CarrierDeck { ocean_y: expected });
    }

    #[test]
    fn every_kind_has_a_valid_preset() {
        for kind in ScenarioKind::ALL {
            assert!(kind.terrain_preset().validate().is_ok(), "{}", kind.label());
        }
    }
}
