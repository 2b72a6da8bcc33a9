//! # Render Surface
//!
//! The boundary between the simulation core and whatever draws it. The core only
//! issues commands (add a cube, remove a cube, move the camera) and keeps the opaque
//! handles it is given; the logical world state lives in the voxel registry.

use crate::engine_state::{
    camera_state::camera::Camera,
    voxels::{block::MaterialKind, grid_key::GridKey},
};

/// Opaque identifier of a drawable primitive owned by a render surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u32);

/// A drawing backend that the simulation core can command.
pub trait RenderSurface {
    /// Creates a unit cube centred on `key` and returns its handle.
    fn add_cube(&mut self, key: GridKey, material: MaterialKind) -> RenderHandle;

    /// Releases the primitive behind `handle`. Unknown handles are ignored.
    fn remove_cube(&mut self, handle: RenderHandle);

    /// Updates the camera pose used for the next draw.
    fn set_camera(&mut self, camera: &Camera);

    /// Number of primitives currently alive on the surface.
    fn live_primitives(&self) -> usize;
}
