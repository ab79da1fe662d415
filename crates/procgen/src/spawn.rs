//! Search for a dry-land spawn point near the origin.

use crate::landmass::{land_mask_at, shore_blend, TerrainConfig};

/// Shore blend a candidate must reach to count as dry land.
pub const DRY_LAND_BLEND: f64 = 0.999;

/// Walk square rings of `step`-spaced samples outwards from the origin and
/// return the first fully dry point, or `None` within `max_radius`.
///
/// Points on a ring are visited in a fixed order so the result only depends on
/// the config.
pub fn find_spawn_point(config: &TerrainConfig, max_radius: f64, step: f64) -> Option<[f64; 2]> {
    let is_dry = |x: f64, z: f64| shore_blend(land_mask_at(x, z, config), config) >= DRY_LAND_BLEND;

    if is_dry(0.0, 0.0) {
        return Some([0.0, 0.0]);
    }
    if step <= 0.0 || !step.is_finite() || !max_radius.is_finite() || max_radius < step {
        return None;
    }

    let rings = (max_radius / step).floor() as i64;
    for ring in 1..=rings {
        for (i, j) in ring_cells(ring) {
            let (x, z) = (i as f64 * step, j as f64 * step);
            if is_dry(x, z) {
                log::debug!("Spawn point found on ring {} at ({:.1}, {:.1})", ring, x, z);
                return Some([x, z]);
            }
        }
    }
    log::warn!("No dry land within {} of the origin", max_radius);
    None
}

/// Lattice cells with Chebyshev distance `ring` from the origin.
fn ring_cells(ring: i64) -> impl Iterator<Item = (i64, i64)> {
    let top = (-ring..=ring).map(move |i| (i, -ring));
    let bottom = (-ring..=ring).map(move |i| (i, ring));
    let left = (-ring + 1..ring).map(move |j| (-ring, j));
    let right = (-ring + 1..ring).map(move |j| (ring, j));
    top.chain(bottom).chain(left).chain(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_wins_when_center_disc_is_on() {
        assert_eq!(find_spawn_point(&TerrainConfig::basic(), 500.0, 25.0), Some([0.0, 0.0]));
    }

    #[test]
    fn ring_has_expected_cell_count() {
        assert_eq!(ring_cells(1).count(), 8);
        assert_eq!(ring_cells(3).count(), 24);
        assert!(ring_cells(2).all(|(i, j)| i.abs().max(j.abs()) == 2));
    }

    fn is_dry(x: f64, z: f64, config: &TerrainConfig) -> bool {
        shore_blend(land_mask_at(x, z, config), config) >= DRY_LAND_BLEND
    }

    #[test]
    fn wet_origin_walks_out_to_the_nearest_dry_ring() {
        const STEP: f64 = 50.0;
        const RADIUS: f64 = 1500.0;
        let rings = (RADIUS / STEP) as i64;
        let ring_is_dry = |config: &TerrainConfig, ring: i64| {
            ring_cells(ring).any(|(i, j)| is_dry(i as f64 * STEP, j as f64 * STEP, config))
        };

        // No centre disc, and a noise phase that leaves the origin in water with land in range.
        let config = (0..64)
            .map(|k| TerrainConfig {
                center_radius: 0.0,
                seed_offset: 173.0 * k as f64,
                ..TerrainConfig::basic()
            })
            .find(|c| !is_dry(0.0, 0.0, c) && (1..=rings).any(|r| ring_is_dry(c, r)))
            .expect("some noise phase has a wet origin near land");

        let [x, z] = find_spawn_point(&config, RADIUS, STEP).expect("dry land within the radius");
        assert_eq!(x % STEP, 0.0);
        assert_eq!(z % STEP, 0.0);
        let ring = (x.abs().max(z.abs()) / STEP).round() as i64;
        assert!((1..=rings).contains(&ring), "ring {}", ring);
        assert!(is_dry(x, z, &config));
        assert!((1..ring).all(|r| !ring_is_dry(&config, r)));
    }

    #[test]
    fn all_water_world_has_no_spawn() {
        let config = TerrainConfig {
            size: 0.0,
            ..TerrainConfig::basic()
        };
        assert_eq!(find_spawn_point(&config, 1000.0, 10.0), None);
    }

    #[test]
    fn invalid_step_only_checks_origin() {
        let config = TerrainConfig {
            center_radius: 0.0,
            size: 0.0,
            ..TerrainConfig::basic()
        };
        assert_eq!(find_spawn_point(&config, 1000.0, 0.0), None);
        assert_eq!(find_spawn_point(&TerrainConfig::basic(), 1000.0, -5.0), Some([0.0, 0.0]));
    }
}
