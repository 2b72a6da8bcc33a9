//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Pointer lock and input staging
//! - Driving one engine tick per redraw
//! - Teardown when the window closes
//!
//! ## Pointer lock
//!
//! The first click into the window grabs and hides the cursor; that click is not
//! treated as an edit. Escape or losing focus releases the lock, clears all staged
//! input and stops the player. On native targets, Escape while unlocked exits.
//!
//! In the browser, Escape is consumed by the browser itself when it ends the lock, so
//! the document's pointer lock element is checked every frame instead.

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;
#[cfg(any(target_family = "wasm", test))]
pub mod pointer_lock;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, MaybeGraphics};
use input_manager::InputManager;
use log::{info, warn};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::engine_state::{
    config::EngineConfig,
    rendering::CubeRenderer,
    telemetry::{LogTelemetrySink, TelemetrySink},
    EngineState,
};

/// The main application state container that manages the application's lifecycle.
///
/// This struct holds the current state of the application, including graphics resources,
/// input handling, and window management. It implements `ApplicationHandler` to handle
/// window and device events.
pub struct ApplicationState {
    /// The current graphics state, which may be initializing, ready, or moved
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,

    /// Cached window size for web platforms during initialization
    pub web_window_size: Option<PhysicalSize<u32>>,

    /// Configuration handed to the engine once graphics are ready
    pub config: EngineConfig,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The simulation core
    pub engine_state: EngineState<CubeRenderer>,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Stages input between ticks
    pub input_manager: InputManager,

    /// The browser's view of the pointer lock
    #[cfg(target_family = "wasm")]
    pub pointer_lock: pointer_lock::PointerLockTracker,
}

impl InitializedApplicationState {
    /// Grabs and hides the cursor and starts applying input.
    fn lock_pointer(&mut self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));

        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                self.input_manager.reset_inputs();
                self.engine_state.set_pointer_locked(true);
            }
            Err(e) => warn!("Could not lock the pointer: {}", e),
        }
    }

    /// Releases the cursor, drops all staged input and stops the player.
    fn release_pointer(&mut self) {
        if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            warn!("Could not release the pointer: {}", e);
        }
        self.window.set_cursor_visible(true);
        self.input_manager.reset_inputs();
        self.engine_state.set_pointer_locked(false);
    }

    /// Whether a click should request the pointer lock instead of editing.
    fn wants_pointer_lock(&self) -> bool {
        #[cfg(target_family = "wasm")]
        {
            if self.engine_state.is_pointer_locked() && !self.pointer_lock.is_granted() {
                return true;
            }
        }
        !self.engine_state.is_pointer_locked()
    }

    /// Releases the pointer if the browser ended a lock it had granted.
    #[cfg(target_family = "wasm")]
    fn sync_browser_pointer_lock(&mut self) {
        let document_locked = web_sys::window()
            .and_then(|window| window.document())
            .is_some_and(|document| document.pointer_lock_element().is_some());
        let engine_locked = self.engine_state.is_pointer_locked();
        if self.pointer_lock.observe(engine_locked, document_locked) {
            info!("Pointer lock ended by the browser");
            self.release_pointer();
        }
    }

    /// Runs one simulation tick and draws the result.
    fn redraw(&mut self) {
        #[cfg(target_family = "wasm")]
        self.sync_browser_pointer_lock();

        let input = self.input_manager.get_and_reset_processed_input();
        self.engine_state.set_input_commands(input);
        self.engine_state.tick(web_time::Instant::now());
        self.engine_state.surface_mut().render();
    }
}

impl ApplicationState {
    /// Creates the application in its initial, graphics-building state.
    pub fn new(graphics: MaybeGraphics, config: EngineConfig) -> Self {
        Self {
            graphics,
            state: None,
            web_window_size: None,
            config,
        }
    }

    /// Handles window resize events during the initialization phase.
    ///
    /// This method updates the surface configuration and triggers application state initialization
    /// if all required resources are available.
    fn resized(&mut self, size: PhysicalSize<u32>) {
        let MaybeGraphics::Graphics(gfx) = &mut self.graphics else {
            return;
        };
        if size.width == 0 || size.height == 0 {
            return;
        }

        if let (Some(surface), Some(surface_config), Some(device)) =
            (&gfx.surface, &mut gfx.surface_config, &gfx.device)
        {
            surface_config.width = size.width;
            surface_config.height = size.height;
            surface.configure(device, surface_config);
            gfx.is_surface_configured = true;
        }
        self.initialize_application_state();
    }

    /// Initializes the application state with the required graphics resources.
    ///
    /// This method transitions the application from the initialization phase to the running state
    /// by building the renderer and engine from the graphics resources.
    fn initialize_application_state(&mut self) {
        if let MaybeGraphics::Graphics(gfx) = &mut self.graphics {
            let taken_gfx = std::mem::take(gfx);
            let window = taken_gfx.window.expect("Window is missing");
            let renderer = CubeRenderer::new(
                taken_gfx.surface.expect("Surface is missing"),
                taken_gfx
                    .surface_config
                    .expect("Surface configuration is missing"),
                taken_gfx.device.expect("Device is missing"),
                taken_gfx.queue.expect("Queue is missing"),
            );

            let sink = Self::telemetry_sink(&self.config, &window);
            let engine_state = EngineState::new(self.config.clone(), renderer, sink);

            self.state = Some(InitializedApplicationState {
                engine_state,
                window,
                input_manager: InputManager::new(),
                #[cfg(target_family = "wasm")]
                pointer_lock: pointer_lock::PointerLockTracker::new(),
            });

            self.graphics = MaybeGraphics::Moved;
            info!("Click into the window to capture the pointer");
        }
    }

    #[cfg(not(target_family = "wasm"))]
    fn telemetry_sink(config: &EngineConfig, window: &Arc<Window>) -> Box<dyn TelemetrySink> {
        use crate::engine_state::telemetry::WindowTitleTelemetrySink;

        if config.telemetry.log {
            Box::new(LogTelemetrySink)
        } else {
            Box::new(WindowTitleTelemetrySink::new(window.clone(), crate::WINDOW_TITLE))
        }
    }

    #[cfg(target_family = "wasm")]
    fn telemetry_sink(config: &EngineConfig, _window: &Arc<Window>) -> Box<dyn TelemetrySink> {
        use crate::engine_state::telemetry::DomTelemetrySink;

        if config.telemetry.log {
            Box::new(LogTelemetrySink)
        } else {
            Box::new(DomTelemetrySink::new(crate::TELEMETRY_ELEMENT_ID))
        }
    }
}

fn is_escape_press(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::KeyboardInput {
            event: KeyEvent {
                state: ElementState::Pressed,
                physical_key: PhysicalKey::Code(KeyCode::Escape),
                repeat: false,
                ..
            },
            ..
        }
    )
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(state) = &mut self.state {
            match event {
                WindowEvent::Resized(size) => {
                    state
                        .engine_state
                        .surface_mut()
                        .resize(size.width, size.height);
                }
                WindowEvent::Focused(false) => {
                    if state.engine_state.is_pointer_locked() {
                        state.release_pointer();
                    } else {
                        state.input_manager.reset_inputs();
                    }
                }
                WindowEvent::RedrawRequested => state.redraw(),
                WindowEvent::CloseRequested => {
                    state.engine_state.teardown();
                    event_loop.exit();
                }
                ref escape if is_escape_press(escape) => {
                    if state.engine_state.is_pointer_locked() {
                        state.release_pointer();
                    } else if cfg!(not(target_family = "wasm")) {
                        state.engine_state.teardown();
                        event_loop.exit();
                    }
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    ..
                } if state.wants_pointer_lock() => state.lock_pointer(),
                _ => {
                    if state.engine_state.is_pointer_locked() {
                        state.input_manager.intake_input(&event);
                    }
                }
            }
        } else {
            match event {
                WindowEvent::Resized(size) => {
                    self.web_window_size = Some(size);
                    self.resized(size);
                }
                WindowEvent::CloseRequested => event_loop.exit(),
                ref escape if is_escape_press(escape) => event_loop.exit(),
                _ => (),
            }
        }
    }

    /// Handles device-level input events such as mouse motion.
    ///
    /// Motion is only staged while the pointer is locked.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                if state.engine_state.is_pointer_locked() {
                    state.input_manager.intake_mouse_motion(delta);
                }
            }
        }
    }

    /// Called when the application is resumed after being suspended.
    ///
    /// This method triggers the graphics initialization process if the application
    /// is still waiting for its graphics builder.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Handles custom user events, specifically graphics initialization events.
    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        let is_surface_configured = graphics.is_surface_configured;

        self.graphics = MaybeGraphics::Graphics(graphics);

        if is_surface_configured {
            self.initialize_application_state();
        } else if let Some(size) = self.web_window_size {
            self.resized(size);
        }
    }

    /// Called before the event loop goes to sleep; schedules the next frame.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}
