//! Aircraft carrier deck: static collision boxes, launch spot and deck-height sampling.
//!
//! The carrier is a hull box with an island superstructure on the starboard
//! side. Deck heights come from downward ray casts against the carrier
//! colliders only, so the terrain never interferes.

use glam::{Quat, Vec2, Vec3};
use rapier3d::prelude::ColliderHandle;
use serde::{Deserialize, Serialize};

use crate::{CollisionGroup, PhysicsWorld};

/// Hits with a flatter normal than this are walls, not deck.
const DECK_NORMAL_MIN_Y: f32 = 0.45;
/// Looser slope limit for the whole-deck median.
const MEDIAN_NORMAL_MIN_Y: f32 = 0.35;
/// Clearance between the deck and the aircraft at spawn.
pub const SPAWN_CLEARANCE: f32 = 0.6;
/// Ray length for every deck query.
const RAY_LENGTH: f32 = 200.0;

/// Horizontal axis the hull runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CarrierAxis {
    X,
    #[default]
    Z,
}

/// End of the deck the aircraft launches from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LaunchEnd {
    #[default]
    Min,
    Max,
}

/// Carrier dimensions in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierSpec {
    /// Overall hull length.
    pub length: f32,
    pub beam: f32,
    /// Keel to flight deck.
    pub hull_height: f32,
    /// Island superstructure size (across, up, along).
    pub island_size: Vec3,
    /// Island centre relative to the deck centre (across, along).
    pub island_offset: Vec2,
    pub axis: CarrierAxis,
    pub launch_end: LaunchEnd,
    /// Share of the total height that sits below the waterline.
    pub waterline_fraction: f32,
}

impl Default for CarrierSpec {
    fn default() -> Self {
        Self {
            length: 330.0,
            beam: 78.0,
            hull_height: 24.0,
            island_size: Vec3::new(12.0, 20.0, 36.0),
            island_offset: Vec2::new(-27.0, 35.0),
            axis: CarrierAxis::Z,
            launch_end: LaunchEnd::Min,
            waterline_fraction: 0.3,
        }
    }
}

/// World-space axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// A carrier placed in the collision world.
#[derive(Debug, Clone)]
pub struct CarrierDeck {
    pub bounds: Bounds,
    pub is_z_axis: bool,
    pub launch_end: LaunchEnd,
    pub colliders: Vec<ColliderHandle>,
    /// Deck height at the launch spot.
    pub deck_height: f32,
    /// Median deck height, used when the local ray fan misses.
    pub fallback_deck_height: f32,
    pub start_position: Vec3,
    pub launch_yaw: f32,
}

impl CarrierDeck {
    /// Add the carrier colliders to `world` with the waterline on `ocean_y`,
    /// then find the launch spot.
    pub fn build(world: &mut PhysicsWorld, spec: &CarrierSpec, ocean_y: f32) -> Self {
        let is_z_axis = spec.axis == CarrierAxis::Z;
        let total_height = spec.hull_height + spec.island_size.y;
        let keel_y = ocean_y - total_height * spec.waterline_fraction;

        // (across, along) -> world (x, z)
        let to_world = |across: f32, along: f32| {
            if is_z_axis {
                (across, along)
            } else {
                (along, across)
            }
        };

        let (hull_hx, hull_hz) = to_world(spec.beam * 0.5, spec.length * 0.5);
        let hull = Bounds {
            min: Vec3::new(-hull_hx, keel_y, -hull_hz),
            max: Vec3::new(hull_hx, keel_y + spec.hull_height, hull_hz),
        };
        let (island_x, island_z) = to_world(spec.island_offset.x, spec.island_offset.y);
        let (island_hx, island_hz) = to_world(spec.island_size.x * 0.5, spec.island_size.z * 0.5);
        let island_center = Vec3::new(island_x, hull.max.y + spec.island_size.y * 0.5, island_z);
        let island_half = Vec3::new(island_hx, spec.island_size.y * 0.5, island_hz);
        let island = Bounds {
            min: island_center - island_half,
            max: island_center + island_half,
        };

        let colliders = [hull, island]
            .iter()
            .map(|b| world.add_static_cuboid(b.center(), 0.0, b.size() * 0.5, CollisionGroup::Carrier))
            .collect();
        world.update_query_pipeline();

        let bounds = hull.union(island);
        let mut deck = Self {
            bounds,
            is_z_axis,
            launch_end: spec.launch_end,
            colliders,
            deck_height: hull.max.y,
            fallback_deck_height: 0.0,
            start_position: Vec3::ZERO,
            launch_yaw: launch_yaw(is_z_axis, spec.launch_end),
        };

        deck.fallback_deck_height = deck.median_deck_height(world);
        let launch = deck.find_launch_point(world);
        deck.deck_height = launch.map_or(deck.fallback_deck_height, |p| p.y);
        let center = bounds.center();
        deck.start_position = match launch {
            Some(p) => Vec3::new(p.x, deck.deck_height + SPAWN_CLEARANCE, p.z),
            None => {
                log::warn!("No flat launch spot on the carrier deck, spawning at its centre");
                Vec3::new(center.x, deck.deck_height + SPAWN_CLEARANCE, center.z)
            }
        };

        log::info!(
            "Carrier placed: {:.0} m long, deck at {:.2} m, launch at ({:.1}, {:.1})",
            if is_z_axis { bounds.size().z } else { bounds.size().x },
            deck.deck_height,
            deck.start_position.x,
            deck.start_position.z
        );
        deck
    }

    /// Launch heading as a rotation about world up.
    pub fn launch_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.launch_yaw)
    }

    fn length_and_width(&self) -> (f32, f32) {
        let size = self.bounds.size();
        if self.is_z_axis {
            (size.z, size.x)
        } else {
            (size.x, size.z)
        }
    }

    /// Highest flat carrier surface under a 5x5 ray fan around `(x, z)`.
    pub fn deck_height_at(&self, world: &PhysicsWorld, x: f32, z: f32) -> Option<f32> {
        let size = self.bounds.size();
        let span = size.x.min(size.z) * 0.08;
        let offsets = [-span, -span * 0.5, 0.0, span * 0.5, span];
        let ray_start_y = self.bounds.max.y + 80.0;

        let mut best: Option<f32> = None;
        for dx in offsets {
            for dz in offsets {
                let Some(y) = deck_hit(world, x + dx, z + dz, ray_start_y, DECK_NORMAL_MIN_Y) else {
                    continue;
                };
                best = Some(best.map_or(y, |b| b.max(y)));
            }
        }
        best
    }

    /// Deck height to hold the aircraft above: the local fan, else the median.
    pub fn floor_height_at(&self, world: &PhysicsWorld, x: f32, z: f32) -> f32 {
        self.deck_height_at(world, x, z).unwrap_or(self.fallback_deck_height)
    }

    /// Median of a 9x5 grid of deck samples over the middle of the ship.
    fn median_deck_height(&self, world: &PhysicsWorld) -> f32 {
        let (length, width) = self.length_and_width();
        let center = self.bounds.center();
        let ray_start_y = self.bounds.max.y + 50.0;
        let (length_steps, width_steps) = (9, 5);

        let mut samples = Vec::with_capacity(length_steps * width_steps);
        for i in 0..length_steps {
            let u = -0.45 + 0.9 * i as f32 / (length_steps - 1) as f32;
            for j in 0..width_steps {
                let v = -0.35 + 0.7 * j as f32 / (width_steps - 1) as f32;
                let (x, z) = if self.is_z_axis {
                    (center.x + v * width, center.z + u * length)
                } else {
                    (center.x + u * length, center.z + v * width)
                };
                if let Some(y) = deck_hit(world, x, z, ray_start_y, MEDIAN_NORMAL_MIN_Y) {
                    samples.push(y);
                }
            }
        }

        if samples.is_empty() {
            return self.bounds.min.y + self.bounds.size().y * 0.72;
        }
        samples.sort_by(f32::total_cmp);
        samples[samples.len() / 2]
    }

    /// Best flat spot on a 7x9 grid over the launch end of the deck.
    ///
    /// Candidates score `axis * 2 - |offset|`, favouring the centreline.
    fn find_launch_point(&self, world: &PhysicsWorld) -> Option<Vec3> {
        let (length, width) = self.length_and_width();
        let center = self.bounds.center();
        let (axis_min, axis_max) = if self.is_z_axis {
            (self.bounds.min.z, self.bounds.max.z)
        } else {
            (self.bounds.min.x, self.bounds.max.x)
        };
        let end_span = (length * 0.12).max(20.0);
        let width_span = (width * 0.45).max(12.0);
        let ray_start_y = self.bounds.max.y + 80.0;
        let (axis_steps, width_steps) = (7, 9);

        let mut best: Option<(f32, Vec3)> = None;
        for i in 0..axis_steps {
            let t = i as f32 / (axis_steps - 1) as f32;
            let axis_coord = match self.launch_end {
                LaunchEnd::Min => axis_min + t * end_span,
                LaunchEnd::Max => axis_max - t * end_span,
            };
            for j in 0..width_steps {
                let offset = (j as f32 / (width_steps - 1) as f32 - 0.5) * width_span;
                let (x, z) = if self.is_z_axis {
                    (center.x + offset, axis_coord)
                } else {
                    (axis_coord, center.z + offset)
                };
                let Some(y) = deck_hit(world, x, z, ray_start_y, DECK_NORMAL_MIN_Y) else {
                    continue;
                };
                let score = axis_coord * 2.0 - offset.abs();
                if best.map_or(true, |(s, _)| score > s) {
                    best = Some((score, Vec3::new(x, y, z)));
                }
            }
        }
        best.map(|(_, point)| point)
    }
}

/// Heading that points the nose down the deck from `end`.
pub fn launch_yaw(is_z_axis: bool, end: LaunchEnd) -> f32 {
    use std::f32::consts::{FRAC_PI_2, PI};
    match (is_z_axis, end) {
        (true, LaunchEnd::Min) => 0.0,
        (true, LaunchEnd::Max) => PI,
        (false, LaunchEnd::Min) => FRAC_PI_2,
        (false, LaunchEnd::Max) => -FRAC_PI_2,
    }
}

fn deck_hit(world: &PhysicsWorld, x: f32, z: f32, start_y: f32, min_normal_y: f32) -> Option<f32> {
    let hit = world.raycast_in(
        Vec3::new(x, start_y, z),
        Vec3::NEG_Y,
        RAY_LENGTH,
        CollisionGroup::Carrier,
    )?;
    (hit.normal.y > min_normal_y).then_some(hit.point.y)
}
