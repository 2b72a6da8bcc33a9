//! # Engine Configuration
//!
//! Every tunable of the sandbox in one place. All sections deserialize from JSON
//! with `#[serde(default)]`, so a configuration file only needs the values it
//! changes:
//!
//! ```json
//! {
//!     "world": { "seed": 7, "half_extent": 24 },
//!     "movement": { "base_speed": 30.0 },
//!     "spawn": { "position": [0.0, 14.0, 0.0] }
//! }
//! ```

use cgmath::{Deg, Point3};
use serde::Deserialize;

use super::{
    camera_state::{camera::LookConfig, movement::MovementConfig},
    picking::PickingConfig,
    telemetry::TelemetryConfig,
    voxels::terrain::WorldParams,
};

/// Default name of the configuration file looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "sandbox.json";

/// Where and how the player starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Eye position in world space
    pub position: [f32; 3],
    /// Initial heading in degrees; 0 looks along +X
    pub yaw_degrees: f32,
    /// Initial pitch in degrees; negative looks down
    pub pitch_degrees: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 12.0, 0.0],
            yaw_degrees: 45.0,
            pitch_degrees: -20.0,
        }
    }
}

impl SpawnConfig {
    /// Eye position at startup.
    pub fn position(&self) -> Point3<f32> {
        Point3::from(self.position)
    }

    /// Heading at startup.
    pub fn yaw(&self) -> Deg<f32> {
        Deg(self.yaw_degrees)
    }

    /// Pitch at startup; negative looks down.
    pub fn pitch(&self) -> Deg<f32> {
        Deg(self.pitch_degrees)
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Terrain generated at startup
    pub world: WorldParams,
    /// Movement physics
    pub movement: MovementConfig,
    /// Picking range and edit rules
    pub picking: PickingConfig,
    /// Mouse look
    pub look: LookConfig,
    /// Status publishing
    pub telemetry: TelemetryConfig,
    /// Where the player starts
    pub spawn: SpawnConfig,
}

impl EngineConfig {
    /// Parses a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Like `from_json_str`, but falls back to the defaults with a warning when
    /// the JSON cannot be parsed.
    pub fn from_json_str_or_default(json: &str) -> Self {
        Self::from_json_str(json).unwrap_or_else(|e| {
            log::warn!("Invalid configuration, using defaults: {}", e);
            Self::default()
        })
    }

    /// Loads the configuration file at `path`.
    ///
    /// A missing file silently yields the defaults; an unreadable or invalid
    /// file yields the defaults with a warning.
    #[cfg(not(target_family = "wasm"))]
    pub fn load_or_default(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loading configuration from {}", path.display());
                Self::from_json_str_or_default(&json)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No configuration at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}
