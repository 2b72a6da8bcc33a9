//! In-memory render surface used by unit tests. It keeps the primitives it was asked
//! to draw so tests can check the registry and the scene never drift apart.

use std::collections::HashMap;

use crate::engine_state::{
    camera_state::camera::Camera,
    voxels::{block::MaterialKind, grid_key::GridKey},
};

use super::{RenderHandle, RenderSurface};

#[derive(Default)]
pub struct RecordingSurface {
    next_handle: u32,
    pub primitives: HashMap<RenderHandle, (GridKey, MaterialKind)>,
    pub released: Vec<RenderHandle>,
    pub camera_updates: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cube_at(&self, key: GridKey) -> Option<MaterialKind> {
        self.primitives
            .values()
            .find(|(cube_key, _)| *cube_key == key)
            .map(|(_, material)| *material)
    }
}

impl RenderSurface for RecordingSurface {
    fn add_cube(&mut self, key: GridKey, material: MaterialKind) -> RenderHandle {
        let handle = RenderHandle(self.next_handle);
        self.next_handle += 1;
        self.primitives.insert(handle, (key, material));
        handle
    }

    fn remove_cube(&mut self, handle: RenderHandle) {
        if self.primitives.remove(&handle).is_some() {
            self.released.push(handle);
        }
    }

    fn set_camera(&mut self, _camera: &Camera) {
        self.camera_updates += 1;
    }

    fn live_primitives(&self) -> usize {
        self.primitives.len()
    }
}
