//! Coarse land/water grid for overview maps.

use rayon::prelude::*;

use crate::landmass::{land_mask_at, shore_blend, TerrainConfig};

/// Shore blends sampled on a regular grid covering the whole landmass patch.
///
/// Cell `(i, j)` sits at world `((i / (res - 1)) - 0.5) * size` on X and the
/// same mapping of `j` on Z, so the outer cells land exactly on the patch edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimap {
    pub resolution: usize,
    pub world_size: f64,
    /// Row-major (`z * resolution + x`), 0 = water, 1 = dry land.
    pub cells: Vec<f32>,
}

impl Minimap {
    /// Sample the minimap in parallel. A resolution of 0 is treated as 1.
    pub fn sample(config: &TerrainConfig, resolution: usize) -> Self {
        let resolution = resolution.max(1);
        let world_size = config.size;
        let cells = (0..resolution * resolution)
            .into_par_iter()
            .map(|i| {
                let x = cell_to_world(i % resolution, resolution, world_size);
                let z = cell_to_world(i / resolution, resolution, world_size);
                shore_blend(land_mask_at(x, z, config), config) as f32
            })
            .collect();
        Self {
            resolution,
            world_size,
            cells,
        }
    }

    /// Cell value by grid index.
    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        if x >= self.resolution || z >= self.resolution {
            return None;
        }
        self.cells.get(z * self.resolution + x).copied()
    }

    /// Nearest cell to a world position, `None` outside the patch.
    pub fn cell_at_world(&self, x: f64, z: f64) -> Option<f32> {
        let ix = world_to_cell(x, self.resolution, self.world_size)?;
        let iz = world_to_cell(z, self.resolution, self.world_size)?;
        self.get(ix, iz)
    }

    /// Share of cells that are mostly land.
    pub fn land_fraction(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let land = self.cells.iter().filter(|&&c| c >= 0.5).count();
        land as f32 / self.cells.len() as f32
    }
}

fn cell_to_world(index: usize, resolution: usize, size: f64) -> f64 {
    if resolution < 2 {
        return 0.0;
    }
    (index as f64 / (resolution - 1) as f64 - 0.5) * size
}

fn world_to_cell(coord: f64, resolution: usize, size: f64) -> Option<usize> {
    if resolution < 2 || size <= 0.0 {
        return (resolution == 1).then_some(0);
    }
    let t = coord / size + 0.5;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    Some((t * (resolution - 1) as f64).round() as usize)
}
