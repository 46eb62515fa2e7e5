//! Application constants for TiltSketch

use egui::Color32;

/// Initial window size
pub const DEFAULT_WINDOW_SIZE: [f32; 2] = [800.0, 600.0];

/// Canvas size assumed until the first layout pass reports the real one
pub const FALLBACK_CANVAS_SIZE: [f32; 2] = [800.0, 400.0];

/// Height of the terminal panel under the canvas
pub const TERMINAL_PANEL_HEIGHT: f32 = 200.0;

/// Upper bound on the frame time fed to the brush, in seconds
pub const MAX_FRAME_DT: f32 = 0.25;

pub const TERMINAL_HEADER: &str = "Terminal Output (Press SPACE to reconnect)";
pub const TERMINAL_HEADER_FONT_SIZE: f32 = 12.0;
pub const TERMINAL_BODY_FONT_SIZE: f32 = 11.0;

pub const CANVAS_PANEL_FILL: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
pub const TERMINAL_PANEL_FILL: Color32 = Color32::from_rgb(0x1e, 0x1e, 0x1e);
pub const TERMINAL_BODY_FILL: Color32 = Color32::from_rgb(0x0a, 0x0a, 0x0a);
pub const TERMINAL_BORDER: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);
pub const TERMINAL_TEXT: Color32 = Color32::from_rgb(0x00, 0xff, 0x00);

// Status messages mirrored into the scrollback
pub const MSG_PORT_OPENED: &str = "Serial port opened";
pub const MSG_CONNECTED: &str = "Connected to device!";
pub const MSG_DISCONNECTED: &str = "Device disconnected";
pub const MSG_POSITION_RESET: &str = "Position reset";
pub const MSG_CALIBRATION_DISABLED: &str = "Calibration disabled: using fixed absolute thresholds.";
pub const MSG_CANVAS_CLEARED: &str = "Canvas cleared";
