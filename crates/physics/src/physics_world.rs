//! Static collision world with Rapier3D, used for ground and deck queries.
//!
//! Nothing here is simulated: the flight model integrates its own state and
//! only asks the world "what is below this point".

use crate::collision::CollisionGroup;
use anyhow::{ensure, Result};
use engine_core::Vec3;
use rapier3d::na::{Isometry3, Vector3};
use rapier3d::prelude::*;

/// Collider storage plus the query pipeline for ray casts.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub island_manager: IslandManager,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Rebuild the query acceleration structure. Call after adding colliders.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a static cuboid collider. No parent body; collider is fixed in world.
    /// `translation`: world position of center. `rotation_y_rad`: rotation around Y axis in radians.
    /// `half_extents`: half sizes in local X, Y, Z (after rotation).
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation_y_rad: f32,
        half_extents: Vec3,
        group: CollisionGroup,
    ) -> ColliderHandle {
        let tra = vector![translation.x, translation.y, translation.z];
        let axisangle = Vector3::y_axis().into_inner() * (rotation_y_rad as Real);
        let position = Isometry3::new(tra, axisangle);
        let collider = ColliderBuilder::cuboid(
            half_extents.x as Real,
            half_extents.y as Real,
            half_extents.z as Real,
        )
        .position(position)
        .collision_groups(group.membership())
        .build();
        self.collider_set.insert(collider)
    }

    /// Add a heightfield collider matching the terrain mesh.
    /// - `heights`: flat slice of height values in world Y, row-major order (index = z * ncols + x).
    /// - `nrows`, `ncols`: grid dimensions (must match terrain resolution).
    /// - `size_x`, `size_z`: total extent in world units (terrain spans -size/2 to +size/2 in X and Z).
    ///
    /// Heights are used as-is (scale_y = 1), so they must already be in world space.
    pub fn add_terrain_heightfield(
        &mut self,
        heights: &[f32],
        nrows: usize,
        ncols: usize,
        size_x: f32,
        size_z: f32,
    ) -> Result<ColliderHandle> {
        ensure!(
            nrows >= 2 && ncols >= 2,
            "terrain heightfield needs at least 2 rows and columns, got {}x{}",
            nrows,
            ncols
        );
        ensure!(
            heights.len() >= nrows * ncols,
            "heights slice too small for {}x{} grid ({} values)",
            nrows,
            ncols,
            heights.len()
        );
        ensure!(
            size_x > 0.0 && size_z > 0.0,
            "terrain heightfield extent must be positive, got {} x {}",
            size_x,
            size_z
        );

        let heights_matrix = DMatrix::from_fn(nrows, ncols, |i, j| heights[i * ncols + j] as Real);
        let scale = vector![size_x, 1.0, size_z];

        let collider = ColliderBuilder::heightfield(heights_matrix, scale)
            .collision_groups(CollisionGroup::Terrain.membership())
            .build();
        log::debug!("Added terrain heightfield collider ({}x{})", nrows, ncols);
        Ok(self.collider_set.insert(collider))
    }

    /// Remove a collider by its handle.
    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.collider_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            true,
        );
    }

    /// Number of colliders in the world.
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    /// Terrain surface height below `(x, z)`, if the heightfield covers it.
    pub fn ground_height_at(&self, x: f32, z: f32, ceiling: f32) -> Option<f32> {
        let origin = Vec3::new(x, ceiling, z);
        self.raycast_in(origin, Vec3::NEG_Y, 1.0e5, CollisionGroup::Terrain)
            .map(|hit| hit.point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_heights(res: usize) -> Vec<f32> {
        (0..res * res).map(|i| (i % res) as f32).collect()
    }

    #[test]
    fn heightfield_reports_ground_under_point() {
        let mut world = PhysicsWorld::new();
        // Flat 5 m plateau spanning 100 m.
        let heights = vec![5.0; 9];
        world.add_terrain_heightfield(&heights, 3, 3, 100.0, 100.0).unwrap();
        world.update_query_pipeline();

        let h = world.ground_height_at(10.0, -20.0, 500.0).unwrap();
        assert!((h - 5.0).abs() < 1e-3);
        assert!(world.ground_height_at(80.0, 0.0, 500.0).is_none());
    }

    #[test]
    fn heightfield_rows_follow_z_columns_follow_x() {
        let mut world = PhysicsWorld::new();
        let res = 5;
        world
            .add_terrain_heightfield(&ramp_heights(res), res, res, 40.0, 40.0)
            .unwrap();
        world.update_query_pipeline();

        // Column index grows with X: height 0 at x = -20, 4 at x = +20.
        let west = world.ground_height_at(-19.0, 0.0, 100.0).unwrap();
        let east = world.ground_height_at(19.0, 0.0, 100.0).unwrap();
        assert!(east > west + 3.0, "west {} east {}", west, east);
    }

    #[test]
    fn degenerate_heightfield_is_rejected() {
        let mut world = PhysicsWorld::new();
        assert!(world.add_terrain_heightfield(&[1.0], 1, 1, 10.0, 10.0).is_err());
        assert!(world.add_terrain_heightfield(&[1.0; 3], 2, 2, 10.0, 10.0).is_err());
        assert!(world.add_terrain_heightfield(&[1.0; 4], 2, 2, 0.0, 10.0).is_err());
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn remove_collider_drops_it() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_static_cuboid(Vec3::ZERO, 0.0, Vec3::ONE, CollisionGroup::Carrier);
        assert_eq!(world.collider_count(), 1);
        world.remove_collider(handle);
        assert_eq!(world.collider_count(), 0);
    }
}
