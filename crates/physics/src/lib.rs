//! Flight dynamics and static collision queries for Island Flight.

pub mod carrier;
pub mod collision;
pub mod flight;
pub mod physics_world;
pub mod raycast;

pub use carrier::*;
pub use collision::*;
pub use flight::*;
pub use physics_world::*;
pub use raycast::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

pub use rapier3d::prelude::ColliderHandle;
