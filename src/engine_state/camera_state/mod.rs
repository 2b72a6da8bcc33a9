//! # Camera State Management
//!
//! This module owns everything that moves the player's point of view:
//! - Camera position and orientation
//! - Mouse look while the pointer is locked
//! - Per-tick movement physics (gravity, jumping, friction, sprint)
//!
//! ## Core Components
//! - `Camera`: The camera's position and orientation in 3D space
//! - `LookController`: Turns mouse motion into yaw/pitch
//! - `MovementIntegrator`: Integrates velocity and moves the camera
//! - `Projection` / `CameraUniform`: Data handed to the renderer

use cgmath::{Point3, Rad};
use web_time::Duration;

use camera::{Camera, LookConfig, LookController};
use movement::{GroundState, MovementConfig, MovementIntegrator, MovementIntent, VelocityState};

pub mod camera;
pub mod movement;

/// The player's camera together with the systems that move it.
pub struct CameraState {
    /// The current camera position and orientation
    pub camera: Camera,
    /// Handles mouse look
    look_controller: LookController,
    /// Handles movement physics
    movement: MovementIntegrator,
}

impl CameraState {
    /// Creates a camera at `spawn` looking along `yaw`/`pitch`, at rest.
    pub fn new(
        spawn: Point3<f32>,
        yaw: Rad<f32>,
        pitch: Rad<f32>,
        look_config: LookConfig,
        movement_config: MovementConfig,
    ) -> Self {
        Self {
            camera: Camera::new(spawn, yaw, pitch),
            look_controller: LookController::new(look_config),
            movement: MovementIntegrator::new(movement_config),
        }
    }

    /// Applies a pointer-lock mouse delta in pixels.
    pub fn intake_look(&mut self, delta: (f64, f64)) {
        self.look_controller.apply(&mut self.camera, delta);
    }

    /// Advances movement by one tick.
    pub fn update(&mut self, intent: &MovementIntent, dt: Duration) {
        self.movement.step(intent, &mut self.camera, dt);
    }

    /// Zeroes all velocity.
    pub fn stop(&mut self) {
        self.movement.reset();
    }

    /// Current velocity.
    pub fn velocity(&self) -> VelocityState {
        self.movement.velocity()
    }

    /// Whether the player rests on the floor.
    pub fn ground_state(&self) -> GroundState {
        self.movement.ground_state(&self.camera)
    }
}
