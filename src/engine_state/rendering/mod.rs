//! Rendering system for the voxel sandbox.
//!
//! The simulation core talks to rendering only through the `RenderSurface` trait.
//! `CubeRenderer` is the WebGPU implementation: every voxel becomes one instance
//! of a shared unit cube mesh, and the whole world is drawn with a single
//! instanced draw call.

use wgpu::{util::DeviceExt, Device, Queue, Surface, SurfaceConfiguration};

use pipeline_manager::PipelineManager;

use super::{
    camera_state::camera::{self, Camera, CameraUniform},
    voxels::{block::MaterialKind, grid_key::GridKey},
};

mod instances;
mod pipeline_manager;
#[cfg(test)]
pub(crate) mod recording_surface;
mod render_surface;
mod texture;
mod vertex;

// Re-export commonly used types
pub use instances::InstanceSet;
pub use render_surface::{RenderHandle, RenderSurface};
pub use vertex::{CubeInstance, CubeVertex};

/// The cube shader, compiled into the binary.
pub const CUBE_SHADER: &str = include_str!("../../../assets/shaders/cube_shader.wgsl");

/// Vertical field of view of the player camera, in degrees.
const FOVY_DEGREES: f32 = 70.0;
const ZNEAR: f32 = 0.1;
const ZFAR: f32 = 1000.0;

/// Draws the voxel world with WebGPU.
pub struct CubeRenderer {
    /// The WebGPU surface being rendered to
    surface: Surface<'static>,
    /// Configuration for the surface (size, format, etc.)
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    /// Pipeline, buffers and depth texture
    pipeline_manager: PipelineManager,
    /// CPU copy of the instance buffer
    instances: InstanceSet,
    /// Camera projection settings
    camera_projection: camera::Projection,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
}

impl CubeRenderer {
    /// Creates a new `CubeRenderer`.
    ///
    /// # Arguments
    /// * `surface` - The WebGPU surface to render to
    /// * `surface_config` - Configuration for the surface
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
    ) -> Self {
        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let pipeline_manager = PipelineManager::new(
            &device,
            &surface_config,
            surface_config.format,
            CUBE_SHADER,
            &camera_buffer,
        );

        let camera_projection = camera::Projection::new(
            surface_config.width,
            surface_config.height,
            cgmath::Deg(FOVY_DEGREES),
            ZNEAR,
            ZFAR,
        );

        Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
            instances: InstanceSet::new(),
            camera_projection,
            camera_uniform,
            camera_buffer,
        }
    }

    /// Handles window resize events.
    ///
    /// Updates the surface configuration, camera projection, and depth texture
    /// to match the new window size. Zero-sized windows are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);

        self.camera_projection.resize(width, height);
        self.pipeline_manager.resize(&self.device, &self.surface_config);
    }

    /// Renders a new frame, uploading instances first if they changed.
    pub fn render(&mut self) {
        if let Some(instances) = self.instances.take_dirty() {
            self.pipeline_manager
                .upload_instances(&self.device, &self.queue, instances);
        }
        self.pipeline_manager
            .render(&self.surface, &self.device, &self.queue);
    }
}

impl RenderSurface for CubeRenderer {
    fn add_cube(&mut self, key: GridKey, material: MaterialKind) -> RenderHandle {
        self.instances.insert(CubeInstance::new(key, material))
    }

    fn remove_cube(&mut self, handle: RenderHandle) {
        if !self.instances.remove(handle) {
            log::warn!("Release of unknown render handle {:?}", handle);
        }
    }

    fn set_camera(&mut self, camera: &Camera) {
        self.camera_uniform
            .update_view_proj_and_pos(camera, &self.camera_projection);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    fn live_primitives(&self) -> usize {
        self.instances.len()
    }
}
