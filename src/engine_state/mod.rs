//! # Engine State Module
//!
//! The simulation core of the sandbox.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container, advanced once per frame by `tick`
//! * `camera_state` - Camera pose, mouse look and movement physics
//! * `voxels` - The voxel registry and terrain generation
//! * `picking` - View ray picking and block edits
//! * `frame_clock` - Frame timing
//! * `telemetry` - Throttled status publishing
//! * `rendering` - The render surface boundary and its WebGPU implementation
//! * `config` - Engine configuration
//!
//! ## Architecture
//!
//! Window and device events never touch the world directly. They are staged by the
//! application's input manager and handed to `EngineState::set_input_commands` as one
//! snapshot per frame; `EngineState::tick` then consumes that snapshot in a fixed
//! order: look, movement, edits, camera upload, telemetry. The voxel registry is the
//! single source of truth for the world and keeps the render surface in step with it.

use cgmath::Rad;
use log::{debug, info, trace};
use web_time::{Duration, Instant};
use winit::{event::MouseButton, keyboard::KeyCode};

use camera_state::{
    camera::Camera,
    movement::{MovementIntent, VelocityState},
    CameraState,
};
use config::EngineConfig;
use frame_clock::{FrameClock, FrameTiming};
use picking::{EditEngine, EditOutcome};
use rendering::RenderSurface;
use telemetry::{TelemetryPublisher, TelemetrySink, TelemetrySnapshot};
use voxels::{registry::VoxelRegistry, terrain::TerrainGenerator};

use crate::application_state::input_state::ProcessedInputState;

pub mod camera_state;
pub mod config;
pub mod frame_clock;
pub mod picking;
pub mod rendering;
pub mod telemetry;
pub mod voxels;

const FORWARD_KEYS: [KeyCode; 2] = [KeyCode::KeyW, KeyCode::ArrowUp];
const BACKWARD_KEYS: [KeyCode; 2] = [KeyCode::KeyS, KeyCode::ArrowDown];
const LEFT_KEYS: [KeyCode; 2] = [KeyCode::KeyA, KeyCode::ArrowLeft];
const RIGHT_KEYS: [KeyCode; 2] = [KeyCode::KeyD, KeyCode::ArrowRight];

/// A block edit requested by a mouse click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditRequest {
    /// Remove the voxel under the crosshair
    Remove,
    /// Place a voxel against the face under the crosshair
    Add,
}

/// Represents player actions derived from input
///
/// This struct is rebuilt from every input snapshot and consumed by the next tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerAction {
    /// Movement keys, sprint and jump
    pub movement: MovementIntent,
    /// Pointer motion to turn the camera by
    pub rotate_view: Option<(f64, f64)>,
    /// Clicks in the order they happened
    pub edits: Vec<EditRequest>,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Frame timing sampled at the start of the tick
    pub timing: FrameTiming,
    /// Outcome of every edit request, in order
    pub edits: Vec<EditOutcome>,
    /// Whether telemetry was published
    pub telemetry_published: bool,
}

/// The main state container for the voxel sandbox
///
/// # Examples
///
/// ```ignore
/// let mut engine_state = EngineState::new(config, renderer, Box::new(LogTelemetrySink));
/// engine_state.set_pointer_locked(true);
///
/// // Once per frame
/// engine_state.set_input_commands(input_manager.get_and_reset_processed_input());
/// engine_state.tick(web_time::Instant::now());
/// engine_state.surface_mut().render();
/// ```
pub struct EngineState<S: RenderSurface> {
    /// Camera pose, look and movement
    pub camera_state: CameraState,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
    /// The voxel world
    registry: VoxelRegistry,
    /// Where the world is drawn
    surface: S,
    edit_engine: EditEngine,
    frame_clock: FrameClock,
    telemetry: TelemetryPublisher,
    /// Input is only applied while the pointer is locked
    pointer_locked: bool,
}

impl<S: RenderSurface> EngineState<S> {
    /// Creates a new engine state: generates the terrain on `surface` and places the
    /// camera at the spawn point.
    ///
    /// The pointer starts unlocked.
    pub fn new(
        config: EngineConfig,
        mut surface: S,
        telemetry_sink: Box<dyn TelemetrySink>,
    ) -> Self {
        let registry = TerrainGenerator::new(config.world.clone()).generate(&mut surface);

        let camera_state = CameraState::new(
            config.spawn.position(),
            Rad::from(config.spawn.yaw()),
            Rad::from(config.spawn.pitch()),
            config.look.clone(),
            config.movement.clone(),
        );
        surface.set_camera(&camera_state.camera);

        let max_dt = Duration::from_secs_f32(config.movement.max_dt.max(0.0));
        info!(
            "Engine ready: {} voxels, spawn at {:?}",
            registry.size(),
            config.spawn.position
        );

        Self {
            camera_state,
            player_actions: PlayerAction::default(),
            registry,
            surface,
            edit_engine: EditEngine::new(config.picking.clone()),
            frame_clock: FrameClock::new(max_dt),
            telemetry: TelemetryPublisher::new(&config.telemetry, telemetry_sink),
            pointer_locked: false,
        }
    }

    /// Sets the input commands for the next tick.
    ///
    /// # Arguments
    /// * `input` - The processed input state to use for setting commands
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = Self::translate_processed_input(&input);
    }

    /// Translates the processed input state into player actions.
    ///
    /// Movement follows held keys; a jump is only requested on the tick Space goes
    /// down.
    fn translate_processed_input(input: &ProcessedInputState) -> PlayerAction {
        let movement = MovementIntent {
            forward: input.any_active(&FORWARD_KEYS),
            backward: input.any_active(&BACKWARD_KEYS),
            left: input.any_active(&LEFT_KEYS),
            right: input.any_active(&RIGHT_KEYS),
            sprint: input.get_key_state(KeyCode::ShiftLeft).is_active(),
            jump: input.get_key_state(KeyCode::Space).is_just_pressed(),
        };

        let edits = input
            .get_mouse_clicks()
            .iter()
            .filter_map(|button| match button {
                MouseButton::Left => Some(EditRequest::Remove),
                MouseButton::Right => Some(EditRequest::Add),
                _ => None,
            })
            .collect();

        PlayerAction {
            movement,
            rotate_view: input.get_mouse_delta(),
            edits,
        }
    }

    /// Advances the simulation by one frame.
    ///
    /// While the pointer is unlocked only the clock, the camera upload and
    /// telemetry run; pending actions are dropped.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let timing = self.frame_clock.sample(now);
        let actions = std::mem::take(&mut self.player_actions);
        let mut edits = Vec::new();

        if self.pointer_locked {
            if let Some(delta) = actions.rotate_view {
                self.camera_state.intake_look(delta);
            }

            self.camera_state.update(&actions.movement, timing.dt);

            for request in &actions.edits {
                edits.push(self.apply_edit(*request));
            }
        }

        self.surface.set_camera(&self.camera_state.camera);

        let snapshot = TelemetrySnapshot::new(
            timing.raw_dt,
            self.camera_state.camera.position,
            self.registry.size(),
        );
        let telemetry_published = self.telemetry.maybe_publish(now, &snapshot);

        TickReport {
            timing,
            edits,
            telemetry_published,
        }
    }

    fn apply_edit(&mut self, request: EditRequest) -> EditOutcome {
        let hit = self
            .edit_engine
            .pick_from_camera(&self.camera_state.camera, &self.registry);
        let outcome = match request {
            EditRequest::Remove => {
                self.edit_engine
                    .remove_at(hit, &mut self.registry, &mut self.surface)
            }
            EditRequest::Add => {
                self.edit_engine
                    .add_adjacent_to(hit, &mut self.registry, &mut self.surface)
            }
        };
        if outcome.changed_world() {
            debug!("{:?} -> {:?}, {} voxels", request, outcome, self.registry.size());
        } else {
            trace!("{:?} -> {:?}", request, outcome);
        }
        outcome
    }

    /// Locks or releases the pointer.
    ///
    /// Releasing drops any pending actions and stops the player. Locking restarts
    /// the frame clock, so the time spent unlocked is not integrated as one step.
    pub fn set_pointer_locked(&mut self, locked: bool) {
        if self.pointer_locked != locked {
            info!("Pointer {}", if locked { "locked" } else { "released" });
            if locked {
                self.frame_clock.restart();
            }
        }
        self.pointer_locked = locked;
        if !locked {
            self.player_actions = PlayerAction::default();
            self.camera_state.stop();
        }
    }

    /// Whether input is currently being applied.
    pub fn is_pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Releases every voxel from the render surface and empties the world.
    pub fn teardown(&mut self) {
        info!("Releasing {} voxels", self.registry.size());
        self.registry.release_all(&mut self.surface);
    }

    /// The player camera.
    pub fn camera(&self) -> &Camera {
        &self.camera_state.camera
    }

    /// The player's current velocity.
    pub fn velocity(&self) -> VelocityState {
        self.camera_state.velocity()
    }

    /// The voxel world.
    pub fn registry(&self) -> &VoxelRegistry {
        &self.registry
    }

    /// The surface the world is drawn on.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, for rendering and resizing.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application_state::input_manager::InputManager,
        engine_state::{
            config::SpawnConfig,
            rendering::recording_surface::RecordingSurface,
            telemetry::tests::CollectingSink,
            voxels::{grid_key::GridKey, terrain::WorldParams},
        },
    };

    /// A flat 16x16 world, five voxels deep, with the camera on the floor plane
    /// looking straight down at (5, 4, 5).
    fn looking_down_config() -> EngineConfig {
        EngineConfig {
            world: WorldParams::flat(8, 4),
            spawn: SpawnConfig {
                position: [5.0, 10.0, 5.0],
                yaw_degrees: 0.0,
                pitch_degrees: -90.0,
            },
            ..EngineConfig::default()
        }
    }

    fn engine(config: EngineConfig) -> (EngineState<RecordingSurface>, CollectingSink) {
        let sink = CollectingSink::default();
        let engine = EngineState::new(config, RecordingSurface::new(), Box::new(sink.clone()));
        (engine, sink)
    }

    fn click(
        engine: &mut EngineState<RecordingSurface>,
        button: MouseButton,
        now: Instant,
    ) -> TickReport {
        let mut input = InputManager::new();
        input.press_mouse_button(button);
        engine.set_input_commands(input.get_and_reset_processed_input());
        engine.tick(now)
    }

    #[test]
    fn new_engine_draws_the_terrain() {
        let (engine, _) = engine(looking_down_config());
        assert_eq!(engine.registry().size(), 16 * 16 * 5);
        assert_eq!(engine.surface().live_primitives(), engine.registry().size());
        assert_eq!(engine.surface().camera_updates, 1);
        assert!(!engine.is_pointer_locked());
    }

    #[test]
    fn add_then_remove_under_the_crosshair() {
        let (mut engine, _) = engine(looking_down_config());
        engine.set_pointer_locked(true);
        let initial = engine.registry().size();
        let start = Instant::now();

        let report = click(&mut engine, MouseButton::Right, start);
        assert_eq!(report.edits, vec![EditOutcome::Placed(GridKey::new(5, 5, 5))]);
        assert_eq!(engine.registry().size(), initial + 1);
        assert!(engine.registry().contains(GridKey::new(5, 5, 5)));

        let report = click(&mut engine, MouseButton::Left, start + Duration::from_millis(16));
        assert_eq!(report.edits, vec![EditOutcome::Removed(GridKey::new(5, 5, 5))]);
        assert_eq!(engine.registry().size(), initial);

        let report = click(&mut engine, MouseButton::Left, start + Duration::from_millis(32));
        assert_eq!(report.edits, vec![EditOutcome::Removed(GridKey::new(5, 4, 5))]);
        assert_eq!(engine.registry().size(), initial - 1);
        assert!(!engine.registry().contains(GridKey::new(5, 4, 5)));
        assert_eq!(engine.surface().live_primitives(), engine.registry().size());
    }

    #[test]
    fn floor_voxels_survive_removal() {
        let config = EngineConfig {
            world: WorldParams::flat(8, 0),
            ..looking_down_config()
        };
        let (mut engine, _) = engine(config);
        engine.set_pointer_locked(true);
        let initial = engine.registry().size();

        let report = click(&mut engine, MouseButton::Left, Instant::now());

        assert_eq!(report.edits, vec![EditOutcome::Protected]);
        assert_eq!(engine.registry().size(), initial);
    }

    #[test]
    fn input_is_ignored_while_unlocked() {
        let (mut engine, _) = engine(looking_down_config());
        let initial = engine.registry().size();
        let start = Instant::now();

        let mut input = InputManager::new();
        input.press_key(KeyCode::KeyW);
        input.press_mouse_button(MouseButton::Right);
        input.intake_mouse_motion((100.0, 0.0));
        engine.set_input_commands(input.get_and_reset_processed_input());
        engine.tick(start);
        engine.set_input_commands(input.get_and_reset_processed_input());
        let report = engine.tick(start + Duration::from_millis(16));

        assert!(report.edits.is_empty());
        assert_eq!(engine.registry().size(), initial);
        assert_eq!(engine.camera().position, cgmath::Point3::new(5.0, 10.0, 5.0));
        assert_eq!(engine.camera().yaw, Rad(0.0));
        assert_eq!(engine.velocity(), VelocityState::default());
    }

    #[test]
    fn releasing_the_pointer_stops_the_player() {
        let (mut engine, _) = engine(looking_down_config());
        engine.set_pointer_locked(true);
        let start = Instant::now();

        let mut input = InputManager::new();
        input.press_key(KeyCode::KeyD);
        for frame in 0..10 {
            engine.set_input_commands(input.get_and_reset_processed_input());
            engine.tick(start + Duration::from_millis(16 * frame));
        }
        assert!(engine.velocity().x != 0.0);

        engine.set_input_commands(input.get_and_reset_processed_input());
        engine.set_pointer_locked(false);

        assert_eq!(engine.velocity(), VelocityState::default());
        assert_eq!(engine.player_actions, PlayerAction::default());
    }

    #[test]
    fn mouse_motion_turns_the_camera() {
        let (mut engine, _) = engine(looking_down_config());
        engine.set_pointer_locked(true);

        let mut input = InputManager::new();
        input.intake_mouse_motion((50.0, 0.0));
        engine.set_input_commands(input.get_and_reset_processed_input());
        engine.tick(Instant::now());

        assert!((engine.camera().yaw.0 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn arrow_keys_move_like_wasd() {
        let mut input = InputManager::new();
        input.press_key(KeyCode::ArrowUp);
        input.press_key(KeyCode::ShiftLeft);
        input.press_key(KeyCode::Space);
        input.press_mouse_button(MouseButton::Middle);

        let snapshot = input.get_and_reset_processed_input();
        let actions = EngineState::<RecordingSurface>::translate_processed_input(&snapshot);

        assert!(actions.movement.forward);
        assert!(actions.movement.sprint);
        assert!(actions.movement.jump);
        assert!(!actions.movement.left);
        assert!(actions.edits.is_empty());
    }

    #[test]
    fn holding_space_requests_a_single_jump() {
        let mut input = InputManager::new();
        input.press_key(KeyCode::Space);

        let jumps: Vec<bool> = (0..5)
            .map(|_| {
                let snapshot = input.get_and_reset_processed_input();
                EngineState::<RecordingSurface>::translate_processed_input(&snapshot)
                    .movement
                    .jump
            })
            .collect();

        assert_eq!(jumps, vec![true, false, false, false, false]);
    }

    #[test]
    fn relocking_does_not_integrate_the_pause() {
        let (mut engine, _) = engine(looking_down_config());
        let start = Instant::now();
        engine.set_pointer_locked(true);
        engine.tick(start);
        engine.set_pointer_locked(false);
        engine.tick(start + Duration::from_millis(16));

        engine.set_pointer_locked(true);
        let report = engine.tick(start + Duration::from_secs(10));

        assert_eq!(report.timing.dt, Duration::ZERO);
        let report = engine.tick(start + Duration::from_secs(10) + Duration::from_millis(16));
        assert_eq!(report.timing.dt, Duration::from_millis(16));
    }

    #[test]
    fn telemetry_is_published_at_most_every_250ms() {
        let (mut engine, sink) = engine(looking_down_config());
        let start = Instant::now();

        let published = (0..50)
            .filter(|frame| {
                engine
                    .tick(start + Duration::from_millis(20 * frame))
                    .telemetry_published
            })
            .count();

        assert_eq!(published, 4);
        let lines = sink.lines.borrow();
        assert_eq!(lines[0], "FPS: 0 | Position: 5.0, 10.0, 5.0 | Blocks: 1280");
        assert!(lines[1].starts_with("FPS: 50 |"));
    }

    #[test]
    fn teardown_releases_every_voxel() {
        let (mut engine, _) = engine(looking_down_config());
        let count = engine.registry().size();

        engine.teardown();

        assert!(engine.registry().is_empty());
        assert_eq!(engine.surface().live_primitives(), 0);
        assert_eq!(engine.surface().released.len(), count);
    }
}
