//! Collision groups and filtering.

use rapier3d::prelude::*;

/// Collision groups for the static world.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Island heightfield and sea floor
    Terrain = 1 << 0,
    /// Carrier hull and superstructure
    Carrier = 1 << 1,
}

impl CollisionGroup {
    pub fn bits(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// Groups for a collider that belongs to `self` and is visible to every query.
    pub fn membership(self) -> InteractionGroups {
        InteractionGroups::new(self.bits(), Group::ALL)
    }

    /// Query filter that only reports colliders in `self`.
    pub fn query_filter(self) -> QueryFilter<'static> {
        QueryFilter::default().groups(InteractionGroups::new(Group::ALL, self.bits()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_do_not_overlap() {
        let terrain = CollisionGroup::Terrain.membership();
        let carrier = CollisionGroup::Carrier.membership();
        assert!(terrain.memberships & carrier.memberships == Group::empty());
    }

    #[test]
    fn carrier_filter_excludes_terrain() {
        let query = InteractionGroups::new(Group::ALL, CollisionGroup::Carrier.bits());
        assert!(query.test(CollisionGroup::Carrier.membership()));
        assert!(!query.test(CollisionGroup::Terrain.membership()));
    }
}
