//! Island landmass: land mask, heightfield sculpting and shoreline colouring.
//!
//! Everything here is a pure function of `(x, z, &TerrainConfig)`. The same
//! config always yields the same mask and heights, so the mask can be
//! re-evaluated at any resolution (mesh build, minimap, spawn search) and from
//! any number of threads.

use noise::NoiseFn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value_noise::{lerp, smoothstep, Fbm};

/// Base RGB of land vertices; alpha carries the shore blend.
pub const LAND_COLOR: [f32; 3] = [0.18, 0.56, 0.22];

/// World seed the stock presets are derived from.
pub const DEFAULT_WORLD_SEED: f64 = 42.0;

const LARGE_ISLAND_LAYER: Fbm = Fbm::new(201.0, 3, 2.0, 0.5);
const SMALL_ISLAND_LAYER: Fbm = Fbm::new(401.0, 2, 2.1, 0.55);
const COAST_LAYER: Fbm = Fbm::new(701.0, 3, 2.2, 0.5);
const HILL_LAYER: Fbm = Fbm::new(0.0, 4, 2.1, 0.5);
const MOUNTAIN_LAYER: Fbm = Fbm::new(101.0, 4, 2.2, 0.55);

/// Distance metric for the edge-of-patch fade to open water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RadialFalloff {
    /// `max(|x|, |z|)`: the fade follows the square patch outline.
    #[default]
    Chebyshev,
    /// `sqrt(x² + z²)`: round fade, corners are always water.
    Euclidean,
}

/// Tunables for one landmass generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World-space edge length of the square patch centred on the origin.
    pub size: f64,
    pub seed: f64,
    /// Added to both coordinates before scaling, shifting the noise phase.
    pub seed_offset: f64,

    pub island_scale_large: f64,
    pub island_scale_small: f64,
    pub large_threshold: f64,
    pub large_falloff: f64,
    pub small_threshold: f64,
    pub small_falloff: f64,
    pub small_weight: f64,
    pub coast_scale: f64,
    pub coast_threshold: f64,
    pub coast_falloff: f64,
    pub coast_cut: f64,
    /// Radius of the guaranteed-land dome at the origin. Zero disables it.
    pub center_radius: f64,
    pub radial_falloff: RadialFalloff,

    pub shore_start: f64,
    pub shore_width: f64,
    pub hill_scale: f64,
    pub hill_height: f64,
    pub mountain_scale: f64,
    pub mountain_height: f64,
    /// Mountain noise below this contributes nothing; above it the excess is squared.
    pub ridge_threshold: f64,
    pub base_height: f64,
    pub sea_floor_height: f64,
    /// Radius around the origin where hills and mountains are damped flat. Zero disables it.
    pub flatten_center_radius: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self::basic()
    }
}

/// Invalid terrain configuration, reported at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainConfigError {
    #[error("terrain field `{field}` is not finite ({value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("terrain size must be positive, got {0}")]
    NonPositiveSize(f64),
    #[error("terrain field `{field}` is used as a divisor and must be non-zero")]
    ZeroDivisor { field: &'static str },
}

impl TerrainConfig {
    /// Rolling island chain with a flattened runway area (the stock world).
    pub fn basic() -> Self {
        Self {
            size: 5000.0,
            seed: DEFAULT_WORLD_SEED + 11.0,
            seed_offset: DEFAULT_WORLD_SEED * 0.4,
            island_scale_large: 800.0,
            island_scale_small: 350.0,
            large_threshold: 0.5,
            large_falloff: 0.2,
            small_threshold: 0.58,
            small_falloff: 0.22,
            small_weight: 0.7,
            coast_scale: 225.0,
            coast_threshold: 0.45,
            coast_falloff: 0.35,
            coast_cut: 0.35,
            center_radius: 550.0,
            radial_falloff: RadialFalloff::Chebyshev,
            shore_start: 0.3,
            shore_width: 0.14,
            hill_scale: 150.0,
            hill_height: 8.0,
            mountain_scale: 450.0,
            mountain_height: 80.0,
            ridge_threshold: 0.48,
            base_height: 2.0,
            sea_floor_height: -6.0,
            flatten_center_radius: 350.0,
        }
    }

    /// Large central island around an airport with low hills.
    pub fn airport() -> Self {
        Self {
            hill_height: 4.0,
            mountain_height: 45.0,
            flatten_center_radius: 1000.0,
            center_radius: 1400.0,
            large_threshold: 0.54,
            small_threshold: 0.6,
            coast_cut: 0.25,
            shore_start: 0.26,
            shore_width: 0.18,
            ..Self::basic()
        }
    }

    /// Open ocean with sparse, ragged islands and no land at the origin.
    pub fn carrier() -> Self {
        Self {
            size: 6000.0,
            hill_height: 3.0,
            mountain_height: 22.0,
            flatten_center_radius: 0.0,
            island_scale_large: 1500.0,
            island_scale_small: 800.0,
            large_threshold: 0.64,
            large_falloff: 0.18,
            small_threshold: 0.72,
            small_falloff: 0.2,
            small_weight: 0.35,
            coast_scale: 320.0,
            coast_threshold: 0.52,
            coast_falloff: 0.25,
            coast_cut: 0.55,
            center_radius: 0.0,
            shore_start: 0.22,
            shore_width: 0.1,
            base_height: 1.2,
            sea_floor_height: -1.8,
            ..Self::basic()
        }
    }

    /// Re-derive `seed` and `seed_offset` from a single world seed.
    pub fn with_world_seed(mut self, world_seed: f64) -> Self {
        self.seed = world_seed + 11.0;
        self.seed_offset = world_seed * 0.4;
        self
    }

    /// Reject configurations that would produce non-finite output.
    pub fn validate(&self) -> Result<(), TerrainConfigError> {
        for (field, value) in self.numeric_fields() {
            if !value.is_finite() {
                return Err(TerrainConfigError::NonFinite { field, value });
            }
        }
        if self.size <= 0.0 {
            return Err(TerrainConfigError::NonPositiveSize(self.size));
        }
        let divisors = [
            ("island_scale_large", self.island_scale_large),
            ("island_scale_small", self.island_scale_small),
            ("coast_scale", self.coast_scale),
            ("hill_scale", self.hill_scale),
            ("mountain_scale", self.mountain_scale),
            ("large_falloff", self.large_falloff),
            ("small_falloff", self.small_falloff),
            ("coast_falloff", self.coast_falloff),
            ("shore_width", self.shore_width),
        ];
        for (field, value) in divisors {
            if value == 0.0 {
                return Err(TerrainConfigError::ZeroDivisor { field });
            }
        }
        Ok(())
    }

    /// Land mask view of this config usable as a `noise` source.
    pub fn land_mask(&self) -> LandMask<'_> {
        LandMask { config: self }
    }

    fn numeric_fields(&self) -> [(&'static str, f64); 25] {
        [
            ("size", self.size),
            ("seed", self.seed),
            ("seed_offset", self.seed_offset),
            ("island_scale_large", self.island_scale_large),
            ("island_scale_small", self.island_scale_small),
            ("large_threshold", self.large_threshold),
            ("large_falloff", self.large_falloff),
            ("small_threshold", self.small_threshold),
            ("small_falloff", self.small_falloff),
            ("small_weight", self.small_weight),
            ("coast_scale", self.coast_scale),
            ("coast_threshold", self.coast_threshold),
            ("coast_falloff", self.coast_falloff),
            ("coast_cut", self.coast_cut),
            ("center_radius", self.center_radius),
            ("shore_start", self.shore_start),
            ("shore_width", self.shore_width),
            ("hill_scale", self.hill_scale),
            ("hill_height", self.hill_height),
            ("mountain_scale", self.mountain_scale),
            ("mountain_height", self.mountain_height),
            ("ridge_threshold", self.ridge_threshold),
            ("base_height", self.base_height),
            ("sea_floor_height", self.sea_floor_height),
            ("flatten_center_radius", self.flatten_center_radius),
        ]
    }
}

/// Borrowed land mask, sampled with `mask.get([x, z])`.
#[derive(Debug, Clone, Copy)]
pub struct LandMask<'a> {
    config: &'a TerrainConfig,
}

impl NoiseFn<f64, 2> for LandMask<'_> {
    fn get(&self, point: [f64; 2]) -> f64 {
        land_mask_at(point[0], point[1], self.config)
    }
}

/// `smoothstep(clamp((value - threshold) / falloff))`; a zero falloff is a hard step.
#[inline]
fn ramp(value: f64, threshold: f64, falloff: f64) -> f64 {
    if falloff == 0.0 {
        return if value >= threshold { 1.0 } else { 0.0 };
    }
    smoothstep(((value - threshold) / falloff).clamp(0.0, 1.0))
}

/// Noise-space coordinate; a zero scale collapses to a constant sample.
#[inline]
fn scaled(coord: f64, offset: f64, scale: f64) -> f64 {
    if scale == 0.0 {
        0.0
    } else {
        (coord + offset) / scale
    }
}

#[inline]
fn layer_sample(layer: Fbm, x: f64, z: f64, scale: f64, config: &TerrainConfig) -> f64 {
    layer.offset_seed(config.seed).sample(
        scaled(x, config.seed_offset, scale),
        scaled(z, config.seed_offset, scale),
    )
}

/// Fade from 1 at the origin to 0 at `size / 2`. Non-positive sizes are all water.
pub fn radial_falloff(x: f64, z: f64, config: &TerrainConfig) -> f64 {
    let half_size = config.size * 0.5;
    if half_size <= 0.0 || !half_size.is_finite() {
        return 0.0;
    }
    let dist = match config.radial_falloff {
        RadialFalloff::Chebyshev => x.abs().max(z.abs()),
        RadialFalloff::Euclidean => (x * x + z * z).sqrt(),
    };
    smoothstep(((half_size - dist) / half_size).clamp(0.0, 1.0))
}

/// Fractional "landness" at a world coordinate: 0 is open water, 1 solid land.
///
/// The centre disc lifts the mask to at least `smoothstep(1 - d / center_radius)`
/// times the radial fade. That is exactly 1 only at the origin (about 0.84 at a
/// quarter of the radius, 0.5 at half), so with the stock presets dry land is
/// guaranteed within `center_radius / 4` rather than across the whole disc.
pub fn land_mask_at(x: f64, z: f64, config: &TerrainConfig) -> f64 {
    let radial = radial_falloff(x, z, config);

    let large_noise = layer_sample(LARGE_ISLAND_LAYER, x, z, config.island_scale_large, config);
    let small_noise = layer_sample(SMALL_ISLAND_LAYER, x, z, config.island_scale_small, config);
    let large_mask = ramp(large_noise, config.large_threshold, config.large_falloff);
    let small_mask = ramp(small_noise, config.small_threshold, config.small_falloff);

    let mut island = large_mask.max(small_mask * config.small_weight);

    let coast_noise = layer_sample(COAST_LAYER, x, z, config.coast_scale, config);
    let coast_mask = ramp(coast_noise, config.coast_threshold, config.coast_falloff);
    island = (island - (1.0 - coast_mask) * config.coast_cut).clamp(0.0, 1.0);

    if config.center_radius > 0.0 {
        let center_dist = (x * x + z * z).sqrt();
        let center_mask = smoothstep((1.0 - center_dist / config.center_radius).clamp(0.0, 1.0));
        island = island.max(center_mask);
    }

    (island * radial).clamp(0.0, 1.0)
}

/// Beach transition derived from a land mask value: 0 under water, 1 on dry land.
pub fn shore_blend(mask: f64, config: &TerrainConfig) -> f64 {
    ramp(mask, config.shore_start, config.shore_width)
}

/// Everything the generator knows about one world point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    pub land_mask: f64,
    pub shore_blend: f64,
    pub height: f64,
}

impl TerrainSample {
    /// Per-vertex RGBA: land colour, transparent over water.
    pub fn color(&self) -> [f32; 4] {
        [LAND_COLOR[0], LAND_COLOR[1], LAND_COLOR[2], self.shore_blend as f32]
    }
}

/// Sculpted terrain height and shoreline blend at a world coordinate.
pub fn terrain_sample_at(x: f64, z: f64, config: &TerrainConfig) -> TerrainSample {
    let hill_noise = layer_sample(HILL_LAYER, x, z, config.hill_scale, config);
    let mut height = (hill_noise - 0.5) * config.hill_height;

    let mountain_noise = layer_sample(MOUNTAIN_LAYER, x, z, config.mountain_scale, config);
    let ridge = (mountain_noise - config.ridge_threshold).max(0.0);
    height += ridge * ridge * config.mountain_height;

    let land_mask = land_mask_at(x, z, config);
    let blend = shore_blend(land_mask, config);

    if config.flatten_center_radius > 0.0 {
        let dist = (x * x + z * z).sqrt();
        let flat = (1.0 - dist / config.flatten_center_radius).clamp(0.0, 1.0);
        height *= 1.0 - smoothstep(flat);
    }

    TerrainSample {
        land_mask,
        shore_blend: blend,
        height: lerp(config.sea_floor_height, config.base_height + height, blend),
    }
}

/// Heights and shore blends for a set of `(x, z)` points, index-aligned with the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heightfield {
    pub heights: Vec<f64>,
    pub shore_blends: Vec<f64>,
}

impl Heightfield {
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

/// Evaluate the terrain at every point in parallel.
pub fn generate_heightfield(points: &[[f64; 2]], config: &TerrainConfig) -> Heightfield {
    let samples: Vec<TerrainSample> = points
        .par_iter()
        .map(|&[x, z]| terrain_sample_at(x, z, config))
        .collect();
    log::debug!("Sampled heightfield at {} points", samples.len());
    let (heights, shore_blends): (Vec<f64>, Vec<f64>) =
        samples.iter().map(|s| (s.height, s.shore_blend)).unzip();
    Heightfield {
        heights,
        shore_blends,
    }
}

/// Displace vertex heights and write land colours in place.
///
/// `positions` are `[x, y, z]` in the landmass's local frame; only `y` is written.
/// `colors` receives `LAND_COLOR` with the shore blend as alpha. Extra entries in
/// the longer of the two buffers are left untouched.
pub fn apply_landmass_terrain(
    positions: &mut [[f32; 3]],
    colors: &mut [[f32; 4]],
    config: &TerrainConfig,
) {
    debug_assert_eq!(positions.len(), colors.len());
    positions
        .par_iter_mut()
        .zip(colors.par_iter_mut())
        .for_each(|(position, color)| {
            let sample = terrain_sample_at(f64::from(position[0]), f64::from(position[2]), config);
            position[1] = sample.height as f32;
            *color = sample.color();
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn grid(extent: f64, steps: usize) -> impl Iterator<Item = (f64, f64)> {
        let step = 2.0 * extent / steps as f64;
        (0..=steps).flat_map(move |i| {
            (0..=steps).map(move |j| (-extent + i as f64 * step, -extent + j as f64 * step))
        })
    }

    #[test]
    fn land_mask_is_deterministic() {
        let config = TerrainConfig::basic();
        for (x, z) in grid(2500.0, 20) {
            let a = land_mask_at(x, z, &config);
            let b = land_mask_at(x, z, &config.clone());
            assert_eq!(a.to_bits(), b.to_bits(), "mask differs at ({}, {})", x, z);
        }
    }

    #[test]
    fn land_mask_bounded_over_dense_grid() {
        for config in [TerrainConfig::basic(), TerrainConfig::airport(), TerrainConfig::carrier()] {
            let extent = config.size;
            for (x, z) in grid(extent, 80) {
                let m = land_mask_at(x, z, &config);
                assert!((0.0..=1.0).contains(&m), "mask {} out of range at ({}, {})", m, x, z);
            }
        }
    }

    #[test]
    fn edge_fades_to_water_without_center_disc() {
        let config = TerrainConfig {
            center_radius: 0.0,
            ..TerrainConfig::basic()
        };
        let half = config.size * 0.5;
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let along = rng.gen_range(-half..half);
            assert_eq!(land_mask_at(half, along, &config), 0.0);
            assert_eq!(land_mask_at(along, -half, &config), 0.0);
            assert_eq!(land_mask_at(half * 1.5, along, &config), 0.0);
            assert!(land_mask_at(half * 0.995, along, &config) < 1e-3);
        }
    }

    #[test]
    fn euclidean_falloff_makes_corners_water() {
        let config = TerrainConfig {
            radial_falloff: RadialFalloff::Euclidean,
            ..TerrainConfig::basic()
        };
        let half = config.size * 0.5;
        assert_eq!(land_mask_at(half * 0.9, half * 0.9, &config), 0.0);
    }

    #[test]
    fn origin_is_solid_land_for_any_seed() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..50 {
            let config = TerrainConfig::basic().with_world_seed(rng.gen_range(0.0..10_000.0));
            assert_eq!(land_mask_at(0.0, 0.0, &config), 1.0);
            let r = config.center_radius;
            for (x, z) in grid(r * 0.25, 8) {
                if (x * x + z * z).sqrt() <= r * 0.25 {
                    let blend = shore_blend(land_mask_at(x, z, &config), &config);
                    assert_eq!(blend, 1.0, "spawn area not dry at ({}, {})", x, z);
                }
            }
        }
    }

    #[test]
    fn center_disc_is_dry_within_a_quarter_radius() {
        for config in [TerrainConfig::basic(), TerrainConfig::airport()] {
            let quarter = config.center_radius * 0.25;
            for (x, z) in grid(quarter / std::f64::consts::SQRT_2, 8) {
                let blend = shore_blend(land_mask_at(x, z, &config), &config);
                assert!(blend >= 0.999, "({}, {}) blend {}", x, z, blend);
            }
            // The disc itself fades: away from the origin the mask is below 1.
            assert_eq!(land_mask_at(0.0, 0.0, &config), 1.0);
            assert!(land_mask_at(config.center_radius * 0.5, 0.0, &config) < 1.0);
        }
    }

    #[test]
    fn larger_center_radius_never_removes_land() {
        let small = TerrainConfig {
            center_radius: 300.0,
            ..TerrainConfig::basic()
        };
        let large = TerrainConfig {
            center_radius: 900.0,
            ..small.clone()
        };
        for (x, z) in grid(1200.0, 40) {
            assert!(land_mask_at(x, z, &large) >= land_mask_at(x, z, &small));
        }
    }

    #[test]
    fn degenerate_config_stays_finite() {
        let config = TerrainConfig {
            size: 0.0,
            large_falloff: 0.0,
            coast_scale: 0.0,
            shore_width: 0.0,
            ..TerrainConfig::basic()
        };
        assert!(config.validate().is_err());
        for (x, z) in grid(100.0, 10) {
            let sample = terrain_sample_at(x, z, &config);
            assert_eq!(sample.land_mask, 0.0);
            assert!(sample.height.is_finite());
        }
    }

    #[test]
    fn validate_reports_offending_field() {
        let config = TerrainConfig {
            hill_scale: 0.0,
            ..TerrainConfig::basic()
        };
        assert_eq!(
            config.validate(),
            Err(TerrainConfigError::ZeroDivisor { field: "hill_scale" })
        );
        let config = TerrainConfig {
            coast_cut: f64::NAN,
            ..TerrainConfig::basic()
        };
        assert!(matches!(
            config.validate(),
            Err(TerrainConfigError::NonFinite { field: "coast_cut", .. })
        ));
        assert!(TerrainConfig::carrier().validate().is_ok());
    }

    #[test]
    fn flattened_center_sits_at_base_height() {
        let config = TerrainConfig::basic();
        let sample = terrain_sample_at(0.0, 0.0, &config);
        assert_eq!(sample.shore_blend, 1.0);
        assert!((sample.height - config.base_height).abs() < 1e-9);
    }

    #[test]
    fn open_water_sits_on_sea_floor() {
        let config = TerrainConfig::basic();
        let edge = config.size * 0.5;
        let sample = terrain_sample_at(edge, 0.0, &config);
        assert_eq!(sample.shore_blend, 0.0);
        assert_eq!(sample.height, config.sea_floor_height);
        assert_eq!(sample.color()[3], 0.0);
    }

    #[test]
    fn heightfield_matches_pointwise_samples() {
        let config = TerrainConfig::airport();
        let points: Vec<[f64; 2]> = grid(1800.0, 12).map(|(x, z)| [x, z]).collect();
        let field = generate_heightfield(&points, &config);
        assert_eq!(field.len(), points.len());
        for (i, &[x, z]) in points.iter().enumerate() {
            let s = terrain_sample_at(x, z, &config);
            assert_eq!(field.heights[i], s.height);
            assert_eq!(field.shore_blends[i], s.shore_blend);
        }
    }

    #[test]
    fn apply_landmass_writes_heights_and_alpha_in_place() {
        let config = TerrainConfig::basic();
        let mut positions = vec![[0.0_f32, 99.0, 0.0], [2500.0, 99.0, 0.0], [40.0, 99.0, -12.0]];
        let mut colors = vec![[0.0_f32; 4]; 3];
        apply_landmass_terrain(&mut positions, &mut colors, &config);
        assert!((positions[0][1] - 2.0).abs() < 1e-5);
        assert_eq!(positions[1][1], -6.0);
        assert_eq!(positions[2][0], 40.0);
        assert_eq!(colors[0], [0.18, 0.56, 0.22, 1.0]);
        assert_eq!(colors[1][3], 0.0);
    }

    #[test]
    fn land_mask_noise_fn_matches_free_function() {
        let config = TerrainConfig::carrier();
        let mask = config.land_mask();
        assert_eq!(mask.get([120.0, -800.0]), land_mask_at(120.0, -800.0, &config));
    }
}
