//! Raycasting for ground and deck queries.

use crate::{CollisionGroup, PhysicsWorld};
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

impl PhysicsWorld {
    /// Cast a ray and return the first hit.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        self.cast_with_filter(origin, direction, max_distance, QueryFilter::default())
    }

    /// Cast a ray that only sees colliders in `group`.
    pub fn raycast_in(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        group: CollisionGroup,
    ) -> Option<RaycastHit> {
        self.cast_with_filter(origin, direction, max_distance, group.query_filter())
    }

    fn cast_with_filter(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter,
    ) -> Option<RaycastHit> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_top_of_cuboid_with_up_normal() {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(
            Vec3::new(0.0, 5.0, 0.0),
            0.0,
            Vec3::new(10.0, 5.0, 10.0),
            CollisionGroup::Carrier,
        );
        world.update_query_pipeline();

        let hit = world
            .raycast(Vec3::new(2.0, 50.0, -3.0), Vec3::NEG_Y, 200.0)
            .unwrap();
        assert!((hit.point.y - 10.0).abs() < 1e-4);
        assert!((hit.distance - 40.0).abs() < 1e-4);
        assert!(hit.normal.y > 0.99);
    }

    #[test]
    fn group_filter_hides_other_layers() {
        let mut world = PhysicsWorld::new();
        world.add_static_cuboid(Vec3::ZERO, 0.0, Vec3::splat(4.0), CollisionGroup::Terrain);
        world.update_query_pipeline();

        let down = Vec3::NEG_Y;
        let origin = Vec3::new(0.0, 20.0, 0.0);
        assert!(world.raycast_in(origin, down, 100.0, CollisionGroup::Terrain).is_some());
        assert!(world.raycast_in(origin, down, 100.0, CollisionGroup::Carrier).is_none());
        assert!(world.raycast(origin, down, 10.0).is_none());
    }
}
