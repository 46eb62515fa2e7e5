/// Telemetry decoding: byte chunks to lines, lines to channel readings
pub mod telemetry;

/// Threshold mapping from channel readings to brush motion, width and hue
pub mod brush;

/// Retained strokes and PNG export
pub mod canvas;

/// Bounded, timestamped device log
pub mod scrollback;

/// Serial/replay transport running on a background runtime
pub mod serial;

pub mod config;
pub mod error;

/// Application state management
pub mod app_state;

/// Connection management
pub mod connection;

/// Canvas and terminal rendering
pub mod canvas_display;

/// Input handling
pub mod input;

/// Main application loop
pub mod app;

/// Application constants
pub mod constants;

pub use app_state::{LaunchOptions, SketchApp};
pub use error::{SketchError, SketchResult};
