//! # Picking & Edit Engine
//!
//! Casts the camera's view ray into the world, finds the nearest voxel it hits,
//! and applies block edits relative to that hit:
//! - Remove deletes the hit voxel unless it belongs to the protected floor layer
//! - Add places a voxel in the empty cell on the other side of the face that was hit
//!
//! Every voxel is treated as the axis-aligned unit cube centred on its key. The ray is
//! slab-tested against all of them; the hit with the smallest entry distance wins and
//! equal distances are resolved by the smaller `GridKey`. Cubes that contain the ray
//! origin are skipped since their faces point away from the viewer.

use std::cmp::Ordering;

use cgmath::{InnerSpace, Point3, Vector3};
use log::debug;
use serde::Deserialize;

use crate::engine_state::{
    camera_state::camera::Camera,
    rendering::RenderSurface,
    voxels::{
        block::{BlockSide, MaterialKind},
        grid_key::GridKey,
        registry::{Placement, VoxelRegistry},
    },
};

/// Half the edge length of a voxel cube.
const HALF_EXTENT: f32 = 0.5;

/// Direction components smaller than this are treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Tunables for picking and editing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Hits further away than this are ignored
    pub max_distance: f32,
    /// Voxels at or below this height cannot be removed, and nothing is placed below it
    pub protected_floor_y: i32,
    /// Nothing is placed above this height
    pub max_build_height: i32,
    /// Material used when the voxel a new block is placed against cannot be found
    pub default_material: MaterialKind,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            max_distance: 64.0,
            protected_floor_y: 0,
            max_build_height: 64,
            default_material: MaterialKind::Grass,
        }
    }
}

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray
    pub origin: Point3<f32>,
    /// Normalized direction of the ray
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// The ray from the camera's eye along its view direction.
    pub fn from_camera(camera: &Camera) -> Self {
        Self::new(camera.position, camera.forward())
    }

    /// Slab test against the voxel cube at `key`.
    ///
    /// # Returns
    /// The entry distance and the face that was entered, or `None` if the ray misses
    /// the cube or starts inside it.
    fn intersect_voxel(&self, key: GridKey) -> Option<(f32, BlockSide)> {
        let center = key.center();
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut entry_side = None;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let min = center[axis] - HALF_EXTENT;
            let max = center[axis] + HALF_EXTENT;

            if direction.abs() < PARALLEL_EPSILON {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let t_min = (min - origin) / direction;
            let t_max = (max - origin) / direction;
            // Entering through the min face means travelling in +axis, i.e. hitting the
            // face whose normal points in -axis.
            let (near, far, entered_positive_face) = if t_min < t_max {
                (t_min, t_max, false)
            } else {
                (t_max, t_min, true)
            };

            if near > t_enter {
                t_enter = near;
                entry_side = BlockSide::from_axis(axis, entered_positive_face);
            }
            t_exit = t_exit.min(far);

            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 {
            return None;
        }

        entry_side.map(|side| (t_enter, side))
    }
}

/// The voxel under the crosshair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Key of the voxel that was hit
    pub key: GridKey,
    /// Face of the voxel the ray entered through
    pub face: BlockSide,
    /// Distance from the ray origin to the entry point
    pub distance: f32,
}

impl Hit {
    /// Outward normal of the face that was hit.
    pub fn face_normal(&self) -> Vector3<i32> {
        self.face.normal()
    }
}

/// Finds the nearest voxel hit by `ray` within `max_distance`.
pub fn pick(ray: &Ray, registry: &VoxelRegistry, max_distance: f32) -> Option<Hit> {
    registry
        .iter()
        .filter_map(|record| {
            ray.intersect_voxel(record.position)
                .filter(|(distance, _)| *distance <= max_distance)
                .map(|(distance, face)| Hit {
                    key: record.position,
                    face,
                    distance,
                })
        })
        .min_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        })
}

/// Result of a block edit. None of these are errors; rejected edits leave the world
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Nothing was under the crosshair
    NoTarget,
    /// The voxel was removed
    Removed(GridKey),
    /// A voxel was placed at the given key
    Placed(GridKey),
    /// The hit voxel belongs to the protected floor layer
    Protected,
    /// The target cell already holds a voxel
    Occupied,
    /// The target cell lies outside the buildable height range
    OutOfBounds,
    /// The hit voxel no longer exists in the registry
    Missing,
}

impl EditOutcome {
    /// Whether the edit changed the world.
    pub fn changed_world(&self) -> bool {
        matches!(self, EditOutcome::Removed(_) | EditOutcome::Placed(_))
    }
}

/// Applies remove/add edits to the registry.
#[derive(Debug, Clone)]
pub struct EditEngine {
    config: PickingConfig,
}

impl EditEngine {
    /// Creates an edit engine.
    pub fn new(config: PickingConfig) -> Self {
        Self { config }
    }

    /// Current tunables.
    pub fn config(&self) -> &PickingConfig {
        &self.config
    }

    /// Picks the voxel under the camera's crosshair.
    pub fn pick_from_camera(&self, camera: &Camera, registry: &VoxelRegistry) -> Option<Hit> {
        pick(&Ray::from_camera(camera), registry, self.config.max_distance)
    }

    /// Removes the voxel that was hit, unless it is part of the protected floor.
    pub fn remove_at<S: RenderSurface + ?Sized>(
        &self,
        hit: Option<Hit>,
        registry: &mut VoxelRegistry,
        surface: &mut S,
    ) -> EditOutcome {
        let Some(hit) = hit else {
            return EditOutcome::NoTarget;
        };

        if hit.key.y <= self.config.protected_floor_y {
            debug!("Refusing to remove floor voxel at {}", hit.key);
            return EditOutcome::Protected;
        }

        match registry.remove(hit.key, surface) {
            Some(record) => {
                debug!("Removed {} voxel at {}", record.material, hit.key);
                EditOutcome::Removed(hit.key)
            }
            None => EditOutcome::Missing,
        }
    }

    /// Places a voxel in the cell adjacent to the face that was hit.
    ///
    /// The new voxel copies the material of the voxel it is placed against.
    pub fn add_adjacent_to<S: RenderSurface + ?Sized>(
        &self,
        hit: Option<Hit>,
        registry: &mut VoxelRegistry,
        surface: &mut S,
    ) -> EditOutcome {
        let Some(hit) = hit else {
            return EditOutcome::NoTarget;
        };

        let Some(target) = hit.key.offset(hit.face_normal()) else {
            return EditOutcome::OutOfBounds;
        };
        if target.y < self.config.protected_floor_y || target.y > self.config.max_build_height {
            return EditOutcome::OutOfBounds;
        }

        let material = registry
            .get(hit.key)
            .map(|record| record.material)
            .unwrap_or(self.config.default_material);

        match registry.insert(target, material, surface) {
            Placement::Inserted => {
                debug!("Placed {} voxel at {}", material, target);
                EditOutcome::Placed(target)
            }
            Placement::Occupied => EditOutcome::Occupied,
        }
    }
}
