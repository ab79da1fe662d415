//! Procedural island generation: noise, land mask, terrain mesh, minimap and spawn search.
//!
//! Everything here is a pure function of [`TerrainConfig`], so two runs with the
//! same config produce bit-identical worlds.

pub mod landmass;
pub mod minimap;
pub mod spawn;
pub mod terrain;
pub mod value_noise;

pub use landmass::*;
pub use minimap::*;
pub use spawn::*;
pub use terrain::*;
pub use value_noise::*;
