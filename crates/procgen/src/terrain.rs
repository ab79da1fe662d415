//! Ground mesh for the landmass: a regular grid displaced by the island terrain.
//!
//! **Seed-based determinism:** vertex heights come straight from
//! [`terrain_sample_at`](crate::landmass::terrain_sample_at), so the same config
//! always produces the same mesh, heightmap and colours.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::landmass::{apply_landmass_terrain, TerrainConfig};

/// Vertex for terrain mesh (includes shoreline color).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Land colour with the shore blend in alpha (transparent over water).
    pub color: [f32; 4],
}

/// Generated terrain data.
#[derive(Debug)]
pub struct TerrainData {
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
    pub heightmap: Vec<f32>,
    pub config: TerrainConfig,
    /// Vertices per side.
    pub resolution: usize,
}

impl TerrainData {
    /// Build a `(subdivisions + 1)²` grid spanning `config.size`, centred on the
    /// origin, and sculpt it with the landmass terrain.
    pub fn generate(config: TerrainConfig, subdivisions: u32) -> Self {
        let subdivisions = subdivisions.max(1) as usize;
        let res = subdivisions + 1;
        let size = config.size as f32;
        let half_size = size / 2.0;
        let step = size / subdivisions as f32;

        let mut positions = Vec::with_capacity(res * res);
        for z in 0..res {
            for x in 0..res {
                positions.push([x as f32 * step - half_size, 0.0, z as f32 * step - half_size]);
            }
        }
        let mut colors = vec![[0.0; 4]; positions.len()];
        apply_landmass_terrain(&mut positions, &mut colors, &config);

        let mut vertices: Vec<TerrainVertex> = positions
            .iter()
            .zip(colors.iter())
            .enumerate()
            .map(|(i, (&position, &color))| TerrainVertex {
                position,
                normal: [0.0, 1.0, 0.0],
                uv: [
                    (i % res) as f32 / subdivisions as f32,
                    (i / res) as f32 / subdivisions as f32,
                ],
                color,
            })
            .collect();
        let heightmap: Vec<f32> = positions.iter().map(|p| p[1]).collect();

        Self::calculate_normals(&mut vertices, res);

        // Generate indices for the grid
        let mut indices = Vec::with_capacity(subdivisions * subdivisions * 6);
        for z in 0..subdivisions {
            for x in 0..subdivisions {
                let top_left = (z * res + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * res + x) as u32;
                let bottom_right = bottom_left + 1;

                indices.push(top_left);
                indices.push(bottom_left);
                indices.push(top_right);

                indices.push(top_right);
                indices.push(bottom_left);
                indices.push(bottom_right);
            }
        }

        log::debug!(
            "Generated landmass mesh: {} vertices, {} triangles",
            vertices.len(),
            indices.len() / 3
        );

        Self {
            vertices,
            indices,
            heightmap,
            config,
            resolution: res,
        }
    }

    /// Sample height at a world position (clamped to the grid).
    pub fn sample_height(&self, x: f32, z: f32) -> f32 {
        let res = self.resolution;
        let size = self.config.size as f32;
        let half_size = size / 2.0;
        let step = size / (res - 1) as f32;
        if step <= 0.0 || !step.is_finite() {
            return self.heightmap[0];
        }

        // Convert to grid coordinates
        let gx = ((x + half_size) / step).max(0.0);
        let gz = ((z + half_size) / step).max(0.0);

        let x0 = (gx.floor() as usize).min(res - 2);
        let z0 = (gz.floor() as usize).min(res - 2);

        let fx = (gx - x0 as f32).clamp(0.0, 1.0);
        let fz = (gz - z0 as f32).clamp(0.0, 1.0);

        // Heights at four corners of the grid cell
        let h00 = self.heightmap[z0 * res + x0]; // top-left
        let h10 = self.heightmap[z0 * res + x0 + 1]; // top-right
        let h01 = self.heightmap[(z0 + 1) * res + x0]; // bottom-left
        let h11 = self.heightmap[(z0 + 1) * res + x0 + 1]; // bottom-right

        // Triangle-based interpolation matching the actual mesh triangulation.
        // The mesh diagonal goes from bottom-left (x0,z1) to top-right (x1,z0).
        // Triangle 1: top-left, bottom-left, top-right  (when fx + fz <= 1)
        // Triangle 2: top-right, bottom-left, bottom-right (when fx + fz > 1)
        if fx + fz <= 1.0 {
            h00 + fx * (h10 - h00) + fz * (h01 - h00)
        } else {
            h11 + (1.0 - fx) * (h01 - h11) + (1.0 - fz) * (h10 - h11)
        }
    }

    /// Check if a world position is within the patch bounds.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let half = self.config.size as f32 / 2.0;
        x >= -half && x <= half && z >= -half && z <= half
    }

    /// Fraction of vertices that are fully dry land.
    pub fn land_fraction(&self) -> f32 {
        if self.vertices.is_empty() {
            return 0.0;
        }
        let dry = self.vertices.iter().filter(|v| v.color[3] >= 1.0).count();
        dry as f32 / self.vertices.len() as f32
    }

    /// Highest vertex in the mesh.
    pub fn max_height(&self) -> f32 {
        self.heightmap.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    fn calculate_normals(vertices: &mut [TerrainVertex], resolution: usize) {
        // Calculate face normals and accumulate
        let mut normals: Vec<Vec3> = vec![Vec3::ZERO; vertices.len()];

        for z in 0..(resolution - 1) {
            for x in 0..(resolution - 1) {
                let i0 = z * resolution + x;
                let i1 = i0 + 1;
                let i2 = (z + 1) * resolution + x;
                let i3 = i2 + 1;

                let v0: Vec3 = vertices[i0].position.into();
                let v1: Vec3 = vertices[i1].position.into();
                let v2: Vec3 = vertices[i2].position.into();
                let v3: Vec3 = vertices[i3].position.into();

                // First triangle
                let n1 = (v2 - v0).cross(v1 - v0).normalize_or_zero();
                normals[i0] += n1;
                normals[i2] += n1;
                normals[i1] += n1;

                // Second triangle
                let n2 = (v2 - v1).cross(v3 - v1).normalize_or_zero();
                normals[i1] += n2;
                normals[i2] += n2;
                normals[i3] += n2;
            }
        }

        // Degenerate (zero-area) patches keep the flat up normal.
        for (i, vertex) in vertices.iter_mut().enumerate() {
            let n = normals[i].try_normalize().unwrap_or(Vec3::Y);
            vertex.normal = [n.x, n.y, n.z];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmass::terrain_sample_at;

    /// Same seed and grid must produce identical heightmaps (replayability).
    #[test]
    fn terrain_deterministic_same_seed() {
        let config = TerrainConfig::basic();
        let a = TerrainData::generate(config.clone(), 40);
        let b = TerrainData::generate(config, 40);
        assert_eq!(a.heightmap.len(), b.heightmap.len());
        for (i, (&ha, &hb)) in a.heightmap.iter().zip(b.heightmap.iter()).enumerate() {
            assert_eq!(ha, hb, "heightmap[{}] should match for same seed", i);
        }
    }

    /// Different seeds must produce different terrain.
    #[test]
    fn terrain_different_seed_different_heights() {
        let a = TerrainData::generate(TerrainConfig::basic().with_world_seed(1.0), 40);
        let b = TerrainData::generate(TerrainConfig::basic().with_world_seed(2.0), 40);
        assert_ne!(a.heightmap, b.heightmap);
    }

    #[test]
    fn grid_layout_and_indices() {
        let data = TerrainData::generate(TerrainConfig::carrier(), 10);
        assert_eq!(data.resolution, 11);
        assert_eq!(data.vertices.len(), 121);
        assert_eq!(data.indices.len(), 10 * 10 * 6);
        assert!(data.indices.iter().all(|&i| (i as usize) < data.vertices.len()));
        assert_eq!(data.vertices[0].position[0], -3000.0);
        assert_eq!(data.vertices[120].position[2], 3000.0);
    }

    #[test]
    fn sample_height_matches_vertices_and_clamps_outside() {
        let data = TerrainData::generate(TerrainConfig::airport(), 50);
        let v = data.vertices[26 * 51 + 13].position;
        assert!((data.sample_height(v[0], v[2]) - v[1]).abs() < 1e-3);

        let corner = data.heightmap[0];
        assert_eq!(data.sample_height(-1.0e6, -1.0e6), corner);
        assert!(data.contains(0.0, 0.0));
        assert!(!data.contains(0.0, 2600.0));
    }

    #[test]
    fn vertex_heights_follow_terrain_samples() {
        let config = TerrainConfig::basic();
        let data = TerrainData::generate(config.clone(), 20);
        for v in data.vertices.iter().step_by(37) {
            let s = terrain_sample_at(f64::from(v.position[0]), f64::from(v.position[2]), &config);
            assert_eq!(v.position[1], s.height as f32);
            assert_eq!(v.color[3], s.shore_blend as f32);
            assert!(v.normal[1] > 0.0);
        }
    }

    #[test]
    fn flattened_center_normals_point_up() {
        let data = TerrainData::generate(TerrainConfig::basic(), 100);
        let center = 50 * data.resolution + 50;
        let n = data.vertices[center].normal;
        assert!(n[1] > 0.95, "center normal should be near vertical: {:?}", n);
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_size_keeps_up_normals() {
        let config = TerrainConfig {
            size: 0.0,
            ..TerrainConfig::basic()
        };
        let data = TerrainData::generate(config, 4);
        assert!(data.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert_eq!(data.land_fraction(), 0.0);
        assert_eq!(data.sample_height(10.0, 10.0), data.heightmap[0]);
    }
}
