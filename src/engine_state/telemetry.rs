//! # Telemetry
//!
//! Periodic status line with frame rate, player position and block count.
//!
//! The engine builds a `TelemetrySnapshot` every tick and hands it to the
//! `TelemetryPublisher`, which forwards it to its sink at most once per interval.
//! Sinks decide where the text goes: the log, the native window title, or an
//! overlay element on the web page.

use std::fmt;

use cgmath::Point3;
use log::info;
use serde::Deserialize;
use web_time::{Duration, Instant};

/// Publishing more often than this is never allowed.
pub const MIN_PUBLISH_INTERVAL: Duration = Duration::from_millis(250);

/// Telemetry settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Milliseconds between published snapshots; raised to 250 if lower
    pub interval_ms: u64,
    /// Publish to the log instead of the window title or page overlay
    pub log: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_ms: MIN_PUBLISH_INTERVAL.as_millis() as u64,
            log: false,
        }
    }
}

impl TelemetryConfig {
    /// The effective publish interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms).max(MIN_PUBLISH_INTERVAL)
    }
}

/// One line of status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySnapshot {
    /// Frames per second of the most recent tick
    pub fps: f32,
    /// Player eye position
    pub position: Point3<f32>,
    /// Number of voxels in the world
    pub block_count: usize,
}

impl TelemetrySnapshot {
    /// Builds a snapshot, deriving the frame rate from the raw tick delta.
    pub fn new(raw_dt: Duration, position: Point3<f32>, block_count: usize) -> Self {
        let seconds = raw_dt.as_secs_f32();
        let fps = if seconds > 0.0 { 1.0 / seconds } else { 0.0 };
        Self {
            fps,
            position,
            block_count,
        }
    }
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FPS: {} | Position: {:.1}, {:.1}, {:.1} | Blocks: {}",
            self.fps.round() as i64,
            self.position.x,
            self.position.y,
            self.position.z,
            self.block_count
        )
    }
}

/// Somewhere to show telemetry.
pub trait TelemetrySink {
    /// Shows `snapshot`, replacing whatever was shown before.
    fn publish(&mut self, snapshot: &TelemetrySnapshot);
}

/// Writes telemetry to the log at info level.
#[derive(Debug, Default)]
pub struct LogTelemetrySink;

impl TelemetrySink for LogTelemetrySink {
    fn publish(&mut self, snapshot: &TelemetrySnapshot) {
        info!("{}", snapshot);
    }
}

/// Shows telemetry in the title of a native window.
#[cfg(not(target_family = "wasm"))]
pub struct WindowTitleTelemetrySink {
    window: std::sync::Arc<winit::window::Window>,
    prefix: String,
}

#[cfg(not(target_family = "wasm"))]
impl WindowTitleTelemetrySink {
    /// Creates a sink that keeps `prefix` at the start of the title.
    pub fn new(window: std::sync::Arc<winit::window::Window>, prefix: impl Into<String>) -> Self {
        Self {
            window,
            prefix: prefix.into(),
        }
    }
}

#[cfg(not(target_family = "wasm"))]
impl TelemetrySink for WindowTitleTelemetrySink {
    fn publish(&mut self, snapshot: &TelemetrySnapshot) {
        self.window.set_title(&format!("{} | {}", self.prefix, snapshot));
    }
}

/// Writes telemetry into the text of a page element.
#[cfg(target_family = "wasm")]
pub struct DomTelemetrySink {
    element_id: String,
}

#[cfg(target_family = "wasm")]
impl DomTelemetrySink {
    /// Creates a sink targeting the element with id `element_id`.
    pub fn new(element_id: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
        }
    }
}

#[cfg(target_family = "wasm")]
impl TelemetrySink for DomTelemetrySink {
    fn publish(&mut self, snapshot: &TelemetrySnapshot) {
        let element = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&self.element_id));
        match element {
            Some(element) => element.set_text_content(Some(&snapshot.to_string())),
            None => log::debug!("Telemetry element #{} not found", self.element_id),
        }
    }
}

/// Throttles snapshots on their way to a sink.
pub struct TelemetryPublisher {
    sink: Box<dyn TelemetrySink>,
    interval: Duration,
    last_published: Option<Instant>,
}

impl TelemetryPublisher {
    /// Creates a publisher for `sink`.
    pub fn new(config: &TelemetryConfig, sink: Box<dyn TelemetrySink>) -> Self {
        Self {
            sink,
            interval: config.interval(),
            last_published: None,
        }
    }

    /// The effective publish interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Publishes `snapshot` if at least one interval has passed since the last one.
    ///
    /// # Returns
    /// Whether the snapshot was published.
    pub fn maybe_publish(&mut self, now: Instant, snapshot: &TelemetrySnapshot) -> bool {
        let due = self
            .last_published
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if due {
            self.sink.publish(snapshot);
            self.last_published = Some(now);
        }
        due
    }
}
