//! # Terrain Generator
//!
//! Builds the initial world once at startup: a square footprint of voxel columns
//! whose heights follow 2D Perlin noise. Columns are solid from the floor layer
//! (`y = 0`) up to their height, so the protected floor layer always exists under
//! every column.
//!
//! Generation is fully deterministic for a given set of `WorldParams`.

use log::info;
use noise::{NoiseFn, Perlin};
use serde::Deserialize;

use crate::engine_state::rendering::RenderSurface;

use super::{block::MaterialKind, grid_key::GridKey, registry::VoxelRegistry};

/// Parameters controlling the generated world.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Seed for both the height noise and the material speckle
    pub seed: u32,
    /// Columns span `[-half_extent, half_extent)` on X and Z
    pub half_extent: i32,
    /// Height of a column where the noise is zero
    pub base_height: i32,
    /// Maximum deviation of a column from `base_height`
    pub amplitude: f64,
    /// Scale applied to world coordinates before sampling the noise
    pub noise_scale: f64,
    /// Columns are never taller than this
    pub max_height: i32,
    /// Columns at or below this height are topped with sand instead of grass
    pub sand_level: i32,
    /// Number of dirt voxels under the top voxel
    pub dirt_depth: i32,
    /// Probability that a voxel in the dirt band is stone instead
    pub stone_speckle: f32,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            seed: 0,
            half_extent: 16,
            base_height: 4,
            amplitude: 3.0,
            noise_scale: 0.08,
            max_height: 16,
            sand_level: 2,
            dirt_depth: 2,
            stone_speckle: 0.1,
        }
    }
}

impl WorldParams {
    /// A flat world where every column has exactly `height`.
    pub fn flat(half_extent: i32, height: i32) -> Self {
        Self {
            half_extent,
            base_height: height,
            amplitude: 0.0,
            max_height: height.max(0),
            sand_level: -1,
            stone_speckle: 0.0,
            ..Self::default()
        }
    }
}

/// Procedural generator for the startup world.
pub struct TerrainGenerator {
    params: WorldParams,
    perlin: Perlin,
}

impl TerrainGenerator {
    /// Creates a generator for the given parameters.
    pub fn new(params: WorldParams) -> Self {
        let perlin = Perlin::new(params.seed);
        Self { params, perlin }
    }

    /// Height of the column at `(x, z)`, clamped to `[0, max_height]`.
    pub fn column_height(&self, x: i32, z: i32) -> i32 {
        let scale = self.params.noise_scale;
        let sample = self.perlin.get([x as f64 * scale, z as f64 * scale]);
        let height = self.params.base_height + (sample * self.params.amplitude).round() as i32;
        height.clamp(0, self.params.max_height.max(0))
    }

    /// Populates a new registry with the terrain, drawing every voxel on `surface`.
    ///
    /// # Returns
    /// The populated registry; ownership of every voxel passes to the caller.
    pub fn generate<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> VoxelRegistry {
        let extent = self.params.half_extent.max(0);
        let side = (2 * extent) as usize;
        let depth = self.params.base_height.max(0) as usize + 1;
        let mut registry = VoxelRegistry::with_capacity(side * side * depth);
        let mut rng = fastrand::Rng::with_seed(self.params.seed as u64);

        for x in -extent..extent {
            for z in -extent..extent {
                let height = self.column_height(x, z);
                for y in 0..=height {
                    let material = self.material_at(y, height, &mut rng);
                    registry.insert(GridKey::new(x, y, z), material, surface);
                }
            }
        }

        info!(
            "Generated terrain: {} voxels over {}x{} columns (seed {})",
            registry.size(),
            side,
            side,
            self.params.seed
        );

        registry
    }

    /// Material of the voxel at height `y` in a column of `height`.
    fn material_at(&self, y: i32, height: i32, rng: &mut fastrand::Rng) -> MaterialKind {
        if y == height {
            if height <= self.params.sand_level {
                MaterialKind::Sand
            } else {
                MaterialKind::Grass
            }
        } else if y >= height - self.params.dirt_depth {
            if rng.f32() < self.params.stone_speckle {
                MaterialKind::Stone
            } else {
                MaterialKind::Dirt
            }
        } else {
            MaterialKind::Stone
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::recording_surface::RecordingSurface;

    fn snapshot(registry: &VoxelRegistry) -> Vec<(GridKey, MaterialKind)> {
        let mut voxels: Vec<_> = registry
            .iter()
            .map(|record| (record.position, record.material))
            .collect();
        voxels.sort_by_key(|(key, _)| *key);
        voxels
    }

    #[test]
    fn generation_is_deterministic() {
        let generator = TerrainGenerator::new(WorldParams::default());
        let first = generator.generate(&mut RecordingSurface::new());
        let second = generator.generate(&mut RecordingSurface::new());
        assert_eq!(snapshot(&first), snapshot(&second));
    }

    #[test]
    fn flat_world_has_exact_voxel_count() {
        let mut surface = RecordingSurface::new();
        let registry = TerrainGenerator::new(WorldParams::flat(8, 4)).generate(&mut surface);

        // 16 x 16 columns, 5 voxels each (y = 0..=4)
        assert_eq!(registry.size(), 16 * 16 * 5);
        assert_eq!(surface.live_primitives(), registry.size());
        assert_eq!(
            registry.get(GridKey::new(5, 4, 5)).unwrap().material,
            MaterialKind::Grass
        );
        assert_eq!(
            registry.get(GridKey::new(5, 3, 5)).unwrap().material,
            MaterialKind::Dirt
        );
        assert_eq!(
            registry.get(GridKey::new(5, 0, 5)).unwrap().material,
            MaterialKind::Stone
        );
        assert!(!registry.contains(GridKey::new(5, 5, 5)));
        assert!(!registry.contains(GridKey::new(8, 0, 0)));
        assert!(registry.contains(GridKey::new(-8, 0, -8)));
    }

    #[test]
    fn every_column_reaches_the_floor_and_stays_in_bounds() {
        let params = WorldParams::default();
        let generator = TerrainGenerator::new(params.clone());
        let registry = generator.generate(&mut RecordingSurface::new());

        for x in -params.half_extent..params.half_extent {
            for z in -params.half_extent..params.half_extent {
                let height = generator.column_height(x, z);
                assert!((0..=params.max_height).contains(&height));
                for y in 0..=height {
                    assert!(registry.contains(GridKey::new(x, y, z)));
                }
                assert!(!registry.contains(GridKey::new(x, height + 1, z)));
            }
        }
    }

    #[test]
    fn heights_vary_with_amplitude() {
        let params = WorldParams {
            amplitude: 6.0,
            ..WorldParams::default()
        };
        let generator = TerrainGenerator::new(params);
        let mut heights = std::collections::HashSet::new();
        for x in -16..16 {
            for z in -16..16 {
                heights.insert(generator.column_height(x, z));
            }
        }
        assert!(heights.len() > 1);
    }

    #[test]
    fn low_columns_are_topped_with_sand() {
        let params = WorldParams {
            sand_level: 3,
            ..WorldParams::flat(2, 3)
        };
        let registry = TerrainGenerator::new(params).generate(&mut RecordingSurface::new());
        assert_eq!(
            registry.get(GridKey::new(0, 3, 0)).unwrap().material,
            MaterialKind::Sand
        );
    }
}
