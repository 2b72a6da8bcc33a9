//! # Movement Integrator
//!
//! Per-tick player physics on a flat world. Each tick reads the movement intent,
//! injects horizontal velocity, integrates gravity, moves the camera along its local
//! right/forward axes, clamps to the floor plane, then damps horizontal velocity.
//!
//! Horizontal intent injects velocity directly (`v -= intent * speed * dt`) rather
//! than acting as an acceleration, and friction removes `v * damping * dt` after the
//! move. The resulting steady-state speed is `speed / damping` but the approach to it
//! depends slightly on the frame rate. This is the intended feel of the sandbox.
//!
//! There is no collision with voxels: the only obstacle is the floor plane at
//! `floor_height`.

use cgmath::{InnerSpace, Vector2, Vector3};
use serde::Deserialize;
use web_time::Duration;

use super::camera::Camera;

/// Tunables for the movement integrator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Velocity injected per second of held movement input
    pub base_speed: f32,
    /// Multiplier applied to `base_speed` while sprinting
    pub sprint_multiplier: f32,
    /// Downward acceleration in units per second squared
    pub gravity: f32,
    /// Vertical velocity set by a jump
    pub jump_speed: f32,
    /// Largest downward speed reachable by falling
    pub terminal_velocity: f32,
    /// Fraction of horizontal velocity removed per second
    pub damping: f32,
    /// Height of the ground plane the camera rests on
    pub floor_height: f32,
    /// Vertical speed below which the player counts as resting and may jump
    pub jump_rest_threshold: f32,
    /// Longest time step integrated in one tick, in seconds
    pub max_dt: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 40.0,
            sprint_multiplier: 2.0,
            gravity: 30.0,
            jump_speed: 10.0,
            terminal_velocity: 50.0,
            damping: 10.0,
            floor_height: 10.0,
            jump_rest_threshold: 0.01,
            max_dt: 0.05,
        }
    }
}

/// Current velocity of the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityState {
    /// Velocity along the camera's right axis (negated, see module docs)
    pub x: f32,
    /// Vertical velocity
    pub y: f32,
    /// Velocity along the camera's heading (negated, see module docs)
    pub z: f32,
}

impl Default for VelocityState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// Movement requested by the player for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    /// Move along the heading
    pub forward: bool,
    /// Move against the heading
    pub backward: bool,
    /// Strafe left
    pub left: bool,
    /// Strafe right
    pub right: bool,
    /// Apply the sprint multiplier
    pub sprint: bool,
    /// Start a jump if standing on the floor
    pub jump: bool,
}

impl MovementIntent {
    /// Normalized horizontal direction as `(right, forward)` components.
    ///
    /// Zero if nothing is held or opposite flags cancel out.
    pub fn direction(&self) -> Vector2<f32> {
        let axis = |positive: bool, negative: bool| positive as i8 as f32 - negative as i8 as f32;
        let direction = Vector2::new(
            axis(self.right, self.left),
            axis(self.forward, self.backward),
        );
        if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            direction
        }
    }
}

/// Whether the player is standing on the floor plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundState {
    /// Resting on the floor plane with no vertical velocity
    Grounded,
    /// Above the floor or moving vertically
    Airborne,
}

/// Integrates player movement and owns the velocity state.
#[derive(Debug, Clone)]
pub struct MovementIntegrator {
    config: MovementConfig,
    velocity: VelocityState,
}

impl MovementIntegrator {
    /// Creates an integrator at rest.
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            velocity: VelocityState::default(),
        }
    }

    /// Current tunables.
    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Current velocity.
    pub fn velocity(&self) -> VelocityState {
        self.velocity
    }

    /// Zeroes the velocity (used when the pointer lock is released).
    pub fn reset(&mut self) {
        self.velocity = VelocityState::default();
    }

    /// Reports whether `camera` is resting on the floor.
    pub fn ground_state(&self, camera: &Camera) -> GroundState {
        if camera.position.y <= self.config.floor_height && self.velocity.y == 0.0 {
            GroundState::Grounded
        } else {
            GroundState::Airborne
        }
    }

    /// Starts a jump if the player stands on the floor at (nearly) vertical rest.
    ///
    /// The apex of a jump is also a point of zero vertical speed, so being at rest
    /// alone is not enough.
    ///
    /// # Returns
    /// `true` if the vertical velocity was set to the jump speed.
    pub fn try_jump(&mut self, camera: &Camera) -> bool {
        let on_floor = camera.position.y <= self.config.floor_height;
        if on_floor && self.velocity.y.abs() <= self.config.jump_rest_threshold {
            self.velocity.y = self.config.jump_speed;
            true
        } else {
            false
        }
    }

    /// Advances the simulation by `dt` (clamped to `max_dt`) and moves `camera`.
    pub fn step(&mut self, intent: &MovementIntent, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32().min(self.config.max_dt);

        if intent.jump {
            self.try_jump(camera);
        }

        let direction = intent.direction();
        let speed = if intent.sprint {
            self.config.base_speed * self.config.sprint_multiplier
        } else {
            self.config.base_speed
        };

        self.velocity.x -= direction.x * speed * dt;
        self.velocity.z -= direction.y * speed * dt;

        self.velocity.y =
            (self.velocity.y - self.config.gravity * dt).max(-self.config.terminal_velocity);

        camera.move_right(-self.velocity.x * dt);
        camera.move_forward(-self.velocity.z * dt);
        camera.position += Vector3::new(0.0, self.velocity.y * dt, 0.0);

        if camera.position.y < self.config.floor_height {
            self.velocity.y = 0.0;
            camera.position.y = self.config.floor_height;
        }

        let damping = self.config.damping * dt;
        self.velocity.x -= self.velocity.x * damping;
        self.velocity.z -= self.velocity.z * damping;
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Point3, Rad};

    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn camera_at(y: f32) -> Camera {
        Camera::new(Point3::new(0.0, y, 0.0), Rad(0.0), Rad(0.0))
    }

    #[test]
    fn falling_settles_exactly_on_the_floor() {
        let mut integrator = MovementIntegrator::new(MovementConfig::default());
        let mut camera = camera_at(25.0);

        for _ in 0..600 {
            integrator.step(&MovementIntent::default(), &mut camera, FRAME);
            assert!(camera.position.y >= integrator.config().floor_height);
        }

        assert_eq!(camera.position.y, integrator.config().floor_height);
        assert_eq!(integrator.velocity().y, 0.0);
        assert_eq!(integrator.ground_state(&camera), GroundState::Grounded);
    }

    #[test]
    fn falling_speed_is_capped_at_terminal_velocity() {
        let config = MovementConfig {
            floor_height: -1.0e6,
            ..MovementConfig::default()
        };
        let mut integrator = MovementIntegrator::new(config.clone());
        let mut camera = camera_at(0.0);

        for _ in 0..1_000 {
            integrator.step(&MovementIntent::default(), &mut camera, FRAME);
            assert!(integrator.velocity().y >= -config.terminal_velocity);
        }
        assert_eq!(integrator.velocity().y, -config.terminal_velocity);
    }

    #[test]
    fn jump_at_rest_sets_the_exact_jump_speed() {
        let mut integrator = MovementIntegrator::new(MovementConfig::default());
        let camera = camera_at(integrator.config().floor_height);
        assert!(integrator.try_jump(&camera));
        assert_eq!(integrator.velocity().y, integrator.config().jump_speed);
    }

    #[test]
    fn jump_in_flight_has_no_effect() {
        let mut integrator = MovementIntegrator::new(MovementConfig::default());
        let mut camera = camera_at(10.0);
        integrator.step(
            &MovementIntent {
                jump: true,
                ..MovementIntent::default()
            },
            &mut camera,
            FRAME,
        );
        let rising = integrator.velocity().y;
        assert!(rising > integrator.config().jump_rest_threshold);

        assert!(!integrator.try_jump(&camera));
        assert_eq!(integrator.velocity().y, rising);
    }

    #[test]
    fn jump_at_the_apex_has_no_effect() {
        let mut integrator = MovementIntegrator::new(MovementConfig::default());
        let camera = camera_at(integrator.config().floor_height + 1.5);

        assert_eq!(integrator.velocity().y, 0.0);
        assert!(!integrator.try_jump(&camera));
        assert_eq!(integrator.velocity().y, 0.0);
    }

    #[test]
    fn holding_jump_never_climbs_above_one_jump() {
        let config = MovementConfig::default();
        let mut integrator = MovementIntegrator::new(config.clone());
        let mut camera = camera_at(config.floor_height);
        let jump = MovementIntent {
            jump: true,
            ..MovementIntent::default()
        };
        let peak = config.floor_height + config.jump_speed.powi(2) / (2.0 * config.gravity);

        let mut landings = 0;
        for _ in 0..600 {
            let was_airborne = camera.position.y > config.floor_height;
            integrator.step(&jump, &mut camera, Duration::from_secs_f32(1.0 / 30.0));
            assert!(camera.position.y <= peak + 1e-3);
            if was_airborne && camera.position.y == config.floor_height {
                landings += 1;
            }
        }
        assert!(landings > 1);
    }

    #[test]
    fn jumping_leaves_the_floor_and_lands_again() {
        let mut integrator = MovementIntegrator::new(MovementConfig::default());
        let floor = integrator.config().floor_height;
        let mut camera = camera_at(floor);
        let jump = MovementIntent {
            jump: true,
            ..MovementIntent::default()
        };

        integrator.step(&jump, &mut camera, FRAME);
        assert!(camera.position.y > floor);
        assert_eq!(integrator.ground_state(&camera), GroundState::Airborne);

        for _ in 0..200 {
            integrator.step(&MovementIntent::default(), &mut camera, FRAME);
        }
        assert_eq!(camera.position.y, floor);
        assert_eq!(integrator.ground_state(&camera), GroundState::Grounded);
    }

    #[test]
    fn forward_input_moves_along_the_heading() {
        let mut integrator = MovementIntegrator::new(MovementConfig::default());
        let mut camera = Camera::new(Point3::new(0.0, 10.0, 0.0), Rad(0.0), Rad(-0.5));
        let forward = MovementIntent {
            forward: true,
            ..MovementIntent::default()
        };

        for _ in 0..60 {
            integrator.step(&forward, &mut camera, FRAME);
        }

        assert!(camera.position.x > 1.0);
        assert!(camera.position.z.abs() < 1e-4);
        assert_eq!(camera.position.y, 10.0);
    }

    #[test]
    fn strafing_moves_along_the_right_axis() {
        let mut integrator = MovementIntegrator::new(MovementConfig::default());
        let mut camera = camera_at(10.0);
        let right = MovementIntent {
            right: true,
            ..MovementIntent::default()
        };

        for _ in 0..60 {
            integrator.step(&right, &mut camera, FRAME);
        }

        assert!(camera.position.z > 1.0);
        assert!(camera.position.x.abs() < 1e-4);
    }

    #[test]
    fn opposite_inputs_cancel() {
        let intent = MovementIntent {
            forward: true,
            backward: true,
            left: true,
            right: true,
            ..MovementIntent::default()
        };
        assert_eq!(intent.direction(), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let intent = MovementIntent {
            forward: true,
            right: true,
            ..MovementIntent::default()
        };
        assert!((intent.direction().magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn horizontal_speed_approaches_speed_over_damping() {
        let config = MovementConfig::default();
        let mut integrator = MovementIntegrator::new(config.clone());
        let mut camera = camera_at(10.0);
        let forward = MovementIntent {
            forward: true,
            ..MovementIntent::default()
        };
        for _ in 0..1_000 {
            integrator.step(&forward, &mut camera, FRAME);
        }

        // Steady state of v = (v + s*dt) * (1 - d*dt) is s*(1 - d*dt)/d
        let dt = FRAME.as_secs_f32();
        let expected = config.base_speed * (1.0 - config.damping * dt) / config.damping;
        assert!((-integrator.velocity().z - expected).abs() < 1e-3);
    }

    #[test]
    fn sprinting_doubles_steady_speed() {
        let config = MovementConfig::default();
        let steady = |sprint: bool| {
            let mut integrator = MovementIntegrator::new(config.clone());
            let mut camera = camera_at(10.0);
            let intent = MovementIntent {
                forward: true,
                sprint,
                ..MovementIntent::default()
            };
            for _ in 0..1_000 {
                integrator.step(&intent, &mut camera, FRAME);
            }
            -integrator.velocity().z
        };
        let ratio = steady(true) / steady(false);
        assert!((ratio - config.sprint_multiplier).abs() < 1e-3);
    }

    /// Velocity injection interacts with damping, so the steady speed shifts with the
    /// tick length. This is the expected behaviour of the model, not a defect.
    #[test]
    fn steady_speed_depends_on_frame_rate() {
        let config = MovementConfig::default();
        let steady = |frame: Duration| {
            let mut integrator = MovementIntegrator::new(config.clone());
            let mut camera = camera_at(10.0);
            let intent = MovementIntent {
                forward: true,
                ..MovementIntent::default()
            };
            for _ in 0..2_000 {
                integrator.step(&intent, &mut camera, frame);
            }
            -integrator.velocity().z
        };
        let fast_frames = steady(Duration::from_millis(8));
        let slow_frames = steady(Duration::from_millis(33));
        assert!(fast_frames > slow_frames);
        assert!((fast_frames - slow_frames) / fast_frames < 0.5);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut clamped = MovementIntegrator::new(MovementConfig::default());
        let mut reference = MovementIntegrator::new(MovementConfig::default());
        let mut camera_a = camera_at(30.0);
        let mut camera_b = camera_at(30.0);

        clamped.step(&MovementIntent::default(), &mut camera_a, Duration::from_secs(2));
        reference.step(&MovementIntent::default(), &mut camera_b, Duration::from_millis(50));

        assert_eq!(camera_a.position, camera_b.position);
        assert_eq!(clamped.velocity(), reference.velocity());
    }

    #[test]
    fn reset_stops_all_motion() {
        let mut integrator = MovementIntegrator::new(MovementConfig::default());
        let camera = camera_at(integrator.config().floor_height);
        assert!(integrator.try_jump(&camera));
        integrator.reset();
        assert_eq!(integrator.velocity(), VelocityState::default());
    }
}
