//! # Voxel Registry
//!
//! The sparse world-state container. Every occupied cell is one entry keyed by its
//! `GridKey`; an absent key is air. The registry owns the render handle of every
//! voxel and is the only place that creates or releases them, so the set of cubes on
//! the render surface always mirrors the set of keys in the map.
//!
//! All lookups and edits are hash map operations (O(1) amortized).

use std::collections::{hash_map::Entry, HashMap};

use log::trace;

use crate::engine_state::rendering::{RenderHandle, RenderSurface};

use super::{block::MaterialKind, grid_key::GridKey};

/// One occupied cell of the world.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VoxelRecord {
    /// Cell the voxel occupies
    pub position: GridKey,
    /// Material the voxel is made of
    pub material: MaterialKind,
    /// Handle of the cube drawn for this voxel
    pub render_handle: RenderHandle,
}

/// Result of an insert.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A new voxel was stored and drawn
    Inserted,
    /// The cell already held a voxel; nothing changed
    Occupied,
}

/// Sparse map from cell to voxel.
#[derive(Debug, Default)]
pub struct VoxelRegistry {
    voxels: HashMap<GridKey, VoxelRecord>,
}

impl VoxelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            voxels: HashMap::new(),
        }
    }

    /// Creates an empty registry with room for `capacity` voxels.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            voxels: HashMap::with_capacity(capacity),
        }
    }

    /// Stores a voxel of `material` at `key` and draws it on `surface`.
    ///
    /// A cell holds at most one voxel: if `key` is already present nothing is drawn
    /// and `Placement::Occupied` is returned.
    pub fn insert<S: RenderSurface + ?Sized>(
        &mut self,
        key: GridKey,
        material: MaterialKind,
        surface: &mut S,
    ) -> Placement {
        match self.voxels.entry(key) {
            Entry::Occupied(_) => Placement::Occupied,
            Entry::Vacant(slot) => {
                let render_handle = surface.add_cube(key, material);
                slot.insert(VoxelRecord {
                    position: key,
                    material,
                    render_handle,
                });
                trace!("Inserted {} voxel at {}", material, key);
                Placement::Inserted
            }
        }
    }

    /// Deletes the voxel at `key` and releases its cube on `surface`.
    ///
    /// # Returns
    /// The removed record, or `None` if the cell was already empty.
    pub fn remove<S: RenderSurface + ?Sized>(
        &mut self,
        key: GridKey,
        surface: &mut S,
    ) -> Option<VoxelRecord> {
        let record = self.voxels.remove(&key)?;
        surface.remove_cube(record.render_handle);
        trace!("Removed {} voxel at {}", record.material, key);
        Some(record)
    }

    /// Looks up the voxel at `key`.
    pub fn get(&self, key: GridKey) -> Option<&VoxelRecord> {
        self.voxels.get(&key)
    }

    /// Whether the cell at `key` is occupied.
    pub fn contains(&self, key: GridKey) -> bool {
        self.voxels.contains_key(&key)
    }

    /// Number of voxels in the world.
    pub fn size(&self) -> usize {
        self.voxels.len()
    }

    /// Whether the world holds no voxels at all.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Iterates over every voxel in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &VoxelRecord> {
        self.voxels.values()
    }

    /// Releases every cube on `surface` and empties the registry.
    pub fn release_all<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        for (_, record) in self.voxels.drain() {
            surface.remove_cube(record.render_handle);
        }
    }
}
