#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Sandbox
//!
//! A first-person voxel sandbox built with Rust and WGPU: walk and jump across a
//! procedurally generated world of unit cubes and add or remove blocks with the mouse.
//! Runs natively and in the browser (WebAssembly).
//!
//! ## Key Modules
//!
//! * `application_state` - Window lifecycle, pointer lock and input staging
//! * `engine_state` - The simulation core: voxel registry, terrain, movement,
//!   picking, telemetry and the cube renderer
//!
//! ## Usage
//!
//! ```no_run
//! // Native application initialization
//! fn main() {
//!     voxel_sandbox::run();
//! }
//! ```
//!
//! For web applications, call `run_web()` from JavaScript once the page has a
//! `<canvas id="wgpu-canvas">` element. Telemetry is written into the element with
//! id `telemetry` if the page provides one.
//!
//! ## Controls
//!
//! * Click - capture the pointer
//! * Mouse - look around
//! * W/A/S/D or arrow keys - move, Left Shift - sprint, Space - jump
//! * Left click - remove the block under the crosshair
//! * Right click - place a block against the face under the crosshair
//! * Escape - release the pointer (press again to quit on native)

use application_state::{
    graphics_resources_builder::{GraphicsBuilder, MaybeGraphics},
    ApplicationState,
};
#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::wasm_bindgen;

use engine_state::config::EngineConfig;
use winit::event_loop::EventLoop;

use log::info;

pub mod application_state;
pub mod engine_state;

/// Id of the canvas element the sandbox renders into on the web.
#[cfg(target_family = "wasm")]
pub const CANVAS_ID: &str = "wgpu-canvas";

/// Id of the page element that receives telemetry on the web.
#[cfg(target_family = "wasm")]
pub const TELEMETRY_ELEMENT_ID: &str = "telemetry";

/// Title of the native window.
pub const WINDOW_TITLE: &str = "Voxel Sandbox";

/// Starts the sandbox in a native window and runs until the window closes.
///
/// Configuration is read from `sandbox.json` in the working directory if present.
#[cfg(not(target_family = "wasm"))]
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
    let config = EngineConfig::load_or_default(engine_state::config::CONFIG_FILE_NAME);

    let event_loop = EventLoop::with_user_event()
        .build()
        .expect("Failed to create event loop");

    let mut state = ApplicationState::new(
        MaybeGraphics::Builder(GraphicsBuilder::new(event_loop.create_proxy())),
        config,
    );

    if let Err(e) = event_loop.run_app(&mut state) {
        log::error!("Event loop terminated with an error: {}", e);
    }
}

/// Starts the sandbox on the page's canvas.
#[cfg(target_family = "wasm")]
#[wasm_bindgen]
pub fn run_web() {
    use winit::platform::web::EventLoopExtWebSys;

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info).expect("Couldn't initialize logger");

    info!("Logger initialized");
    let event_loop = EventLoop::with_user_event()
        .build()
        .expect("Failed to create event loop");

    let state = ApplicationState::new(
        MaybeGraphics::Builder(GraphicsBuilder::new(event_loop.create_proxy())),
        EngineConfig::default(),
    );

    event_loop.spawn_app(state);
}
