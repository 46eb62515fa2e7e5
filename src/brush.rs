//! Brush state and threshold mapping for TiltSketch
//!
//! The X and Y channels steer the brush at a constant speed once they cross fixed voltage
//! limits, the Z channel picks one of three brush widths and the direction of travel picks
//! the hue. There is no calibration: the limits are used exactly as configured.

use egui::{pos2, Pos2, Vec2};

use crate::config::SketchConfig;
use crate::telemetry::Reading;

/// Brush width while Z is unknown
pub const DEFAULT_BRUSH_WIDTH: f32 = 4.0;
/// Brush width below the thin threshold
pub const THIN_BRUSH_WIDTH: f32 = 2.0;
/// Brush width between the thin and thick thresholds
pub const MEDIUM_BRUSH_WIDTH: f32 = 6.0;
/// Brush width above the thick threshold
pub const THICK_BRUSH_WIDTH: f32 = 18.0;
/// Width of the marker shown before the first reading arrives
pub const IDLE_MARKER_WIDTH: f32 = 4.0;

/// Straight (non-premultiplied) 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn white(a: u8) -> Self {
        Self::new(255, 255, 255, a)
    }

    /// Fully saturated, full value color for a hue in degrees
    pub fn from_hue(hue_degrees: f32) -> Self {
        let h = hue_degrees.rem_euclid(360.0) / 60.0;
        let x = 1.0 - (h % 2.0 - 1.0).abs();
        let (r, g, b) = match h as u32 {
            0 => (1.0, x, 0.0),
            1 => (x, 1.0, 0.0),
            2 => (0.0, 1.0, x),
            3 => (0.0, x, 1.0),
            4 => (x, 0.0, 1.0),
            _ => (1.0, 0.0, x),
        };
        let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(to_u8(r), to_u8(g), to_u8(b), 255)
    }
}

impl From<Rgba8> for egui::Color32 {
    fn from(c: Rgba8) -> Self {
        egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
    }
}

/// Fixed voltage cut-points and brush speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub x_left: f64,
    pub x_right: f64,
    pub y_down: f64,
    pub y_up: f64,
    pub z_thin: f64,
    pub z_thick: f64,
    /// Pixels per second while a direction threshold is active
    pub move_speed: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            x_left: 0.420,
            x_right: 0.552,
            y_down: 1.087,
            y_up: 1.513,
            z_thin: 0.900,
            z_thick: 1.594,
            move_speed: 300.0,
        }
    }
}

impl Thresholds {
    /// Read thresholds from configuration, falling back to the built-in limits
    pub fn from_config(cfg: &SketchConfig) -> Self {
        let d = Self::default();
        Self {
            x_left: cfg.get_float_property_or("thresholds.xLeft", d.x_left),
            x_right: cfg.get_float_property_or("thresholds.xRight", d.x_right),
            y_down: cfg.get_float_property_or("thresholds.yDown", d.y_down),
            y_up: cfg.get_float_property_or("thresholds.yUp", d.y_up),
            z_thin: cfg.get_float_property_or("thresholds.zThin", d.z_thin),
            z_thick: cfg.get_float_property_or("thresholds.zThick", d.z_thick),
            move_speed: cfg.get_float_property_or("brush.moveSpeed", d.move_speed as f64) as f32,
        }
    }

    /// Velocity in pixels per second for the current channels.
    ///
    /// Screen y grows downward, so a low Y reading moves the brush down.
    pub fn direction(&self, channels: &Channels) -> Vec2 {
        let mut velocity = Vec2::ZERO;
        if let Some(x) = channels.x {
            if x < self.x_left {
                velocity.x = -self.move_speed;
            } else if x > self.x_right {
                velocity.x = self.move_speed;
            }
        }
        if let Some(y) = channels.y {
            if y < self.y_down {
                velocity.y = self.move_speed;
            } else if y > self.y_up {
                velocity.y = -self.move_speed;
            }
        }
        velocity
    }

    pub fn brush_width(&self, z: Option<f64>) -> f32 {
        match z {
            None => DEFAULT_BRUSH_WIDTH,
            Some(z) if z < self.z_thin => THIN_BRUSH_WIDTH,
            Some(z) if z > self.z_thick => THICK_BRUSH_WIDTH,
            Some(_) => MEDIUM_BRUSH_WIDTH,
        }
    }
}

/// Rainbow color keyed on the direction of travel; white while standing still
pub fn stroke_color(velocity: Vec2) -> Rgba8 {
    if velocity == Vec2::ZERO {
        return Rgba8::white(220);
    }
    let angle = velocity.y.atan2(velocity.x);
    let hue = (angle + std::f32::consts::PI) / std::f32::consts::TAU * 360.0;
    Rgba8::from_hue(hue)
}

/// Most recent value seen on each channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Channels {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub has_data: bool,
}

impl Channels {
    /// Overwrite the channels present in `reading`, keep the rest
    pub fn apply(&mut self, reading: &Reading) {
        if reading.x.is_some() {
            self.x = reading.x;
        }
        if reading.y.is_some() {
            self.y = reading.y;
        }
        if reading.z.is_some() {
            self.z = reading.z;
        }
        if !reading.is_empty() {
            self.has_data = true;
        }
    }
}

/// What a single frame adds to the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mark {
    Dot { at: Pos2, width: f32, color: Rgba8 },
    Segment { from: Pos2, to: Pos2, width: f32, color: Rgba8 },
}

impl Mark {
    pub fn width(&self) -> f32 {
        match *self {
            Mark::Dot { width, .. } | Mark::Segment { width, .. } => width,
        }
    }

    pub fn color(&self) -> Rgba8 {
        match *self {
            Mark::Dot { color, .. } | Mark::Segment { color, .. } => color,
        }
    }

    /// Point where the mark ends
    pub fn end(&self) -> Pos2 {
        match *self {
            Mark::Dot { at, .. } => at,
            Mark::Segment { to, .. } => to,
        }
    }
}

/// Integrated brush position plus the channel readings driving it
#[derive(Debug, Clone)]
pub struct BrushState {
    position: Pos2,
    previous: Option<Pos2>,
    channels: Channels,
    thresholds: Thresholds,
}

impl BrushState {
    /// Brush parked at the center of a canvas of `size`
    pub fn new(thresholds: Thresholds, size: Vec2) -> Self {
        Self {
            position: center_of(size),
            previous: None,
            channels: Channels::default(),
            thresholds,
        }
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn channels(&self) -> &Channels {
        &self.channels
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Merge a parsed line into the channel state
    pub fn ingest(&mut self, reading: &Reading) {
        self.channels.apply(reading);
    }

    /// Put the brush back at the center. The next segment starts from the old spot.
    pub fn recenter(&mut self, size: Vec2) {
        self.position = center_of(size);
    }

    /// Advance the brush by `dt` seconds inside a canvas of `size` and report what to draw
    pub fn step(&mut self, dt: f32, size: Vec2) -> Mark {
        if !self.channels.has_data {
            self.previous = Some(self.position);
            return Mark::Dot {
                at: self.position,
                width: IDLE_MARKER_WIDTH,
                color: Rgba8::white(200),
            };
        }

        let velocity = self.thresholds.direction(&self.channels);
        let moved = self.position + velocity * dt;
        self.position = pos2(
            moved.x.clamp(0.0, size.x.max(0.0)),
            moved.y.clamp(0.0, size.y.max(0.0)),
        );

        let width = self.thresholds.brush_width(self.channels.z);
        let color = stroke_color(velocity);

        let mark = match self.previous {
            Some(from) => Mark::Segment { from, to: self.position, width, color },
            None => Mark::Dot { at: self.position, width, color },
        };
        self.previous = Some(self.position);
        mark
    }
}

fn center_of(size: Vec2) -> Pos2 {
    pos2(size.x / 2.0, size.y / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    fn reading(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Reading {
        Reading { x, y, z }
    }

    #[test]
    fn test_idle_marker_before_data() {
        let mut brush = BrushState::new(Thresholds::default(), vec2(800.0, 400.0));
        let mark = brush.step(0.016, vec2(800.0, 400.0));
        assert_eq!(
            mark,
            Mark::Dot { at: pos2(400.0, 200.0), width: 4.0, color: Rgba8::white(200) }
        );
    }

    #[test]
    fn test_direction_thresholds() {
        let t = Thresholds::default();
        let mut ch = Channels::default();
        ch.apply(&reading(Some(0.1), Some(2.0), None));
        assert_eq!(t.direction(&ch), vec2(-300.0, -300.0));

        ch.apply(&reading(Some(0.9), Some(0.5), None));
        assert_eq!(t.direction(&ch), vec2(300.0, 300.0));

        ch.apply(&reading(Some(0.5), Some(1.2), None));
        assert_eq!(t.direction(&ch), Vec2::ZERO);

        // Exactly on the limit does not move
        ch.apply(&reading(Some(0.420), Some(1.513), None));
        assert_eq!(t.direction(&ch), Vec2::ZERO);
    }

    #[test]
    fn test_brush_width_bands() {
        let t = Thresholds::default();
        assert_eq!(t.brush_width(None), 4.0);
        assert_eq!(t.brush_width(Some(0.5)), 2.0);
        assert_eq!(t.brush_width(Some(1.2)), 6.0);
        assert_eq!(t.brush_width(Some(2.0)), 18.0);
        assert_eq!(t.brush_width(Some(0.900)), 6.0);
    }

    #[test]
    fn test_stroke_color_by_direction() {
        assert_eq!(stroke_color(Vec2::ZERO), Rgba8::white(220));
        // Moving right: angle 0 maps to hue 180 (cyan)
        assert_eq!(stroke_color(vec2(300.0, 0.0)), Rgba8::new(0, 255, 255, 255));
        // Moving left: angle PI maps to hue 360 == red
        assert_eq!(stroke_color(vec2(-300.0, 0.0)), Rgba8::new(255, 0, 0, 255));
        // Moving down on screen: angle PI/2 maps to hue 270 (violet)
        let down = stroke_color(vec2(0.0, 300.0));
        assert!((127..=128).contains(&down.r));
        assert_eq!((down.g, down.b, down.a), (0, 255, 255));
    }

    #[test]
    fn test_step_integrates_and_clamps() {
        let size = vec2(100.0, 100.0);
        let mut brush = BrushState::new(Thresholds::default(), size);
        brush.ingest(&reading(Some(1.0), Some(1.3), Some(1.2)));

        let first = brush.step(0.1, size);
        assert_eq!(
            first,
            Mark::Dot { at: pos2(80.0, 50.0), width: 6.0, color: stroke_color(vec2(300.0, 0.0)) }
        );

        let second = brush.step(1.0, size);
        match second {
            Mark::Segment { from, to, .. } => {
                assert_eq!(from, pos2(80.0, 50.0));
                assert_eq!(to, pos2(100.0, 50.0));
            }
            other => panic!("expected segment, got {other:?}"),
        }
    }

    #[test]
    fn test_idle_step_links_next_segment() {
        let size = vec2(200.0, 200.0);
        let mut brush = BrushState::new(Thresholds::default(), size);
        brush.step(0.016, size);
        brush.ingest(&reading(None, Some(0.2), None));
        match brush.step(0.1, size) {
            Mark::Segment { from, to, .. } => {
                assert_eq!(from, pos2(100.0, 100.0));
                assert_eq!(to, pos2(100.0, 130.0));
            }
            other => panic!("expected segment, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_readings_keep_other_channels() {
        let mut ch = Channels::default();
        ch.apply(&reading(Some(0.3), Some(1.1), Some(1.0)));
        ch.apply(&reading(None, None, Some(2.0)));
        assert_eq!(ch.x, Some(0.3));
        assert_eq!(ch.y, Some(1.1));
        assert_eq!(ch.z, Some(2.0));
        assert!(ch.has_data);

        let mut empty = Channels::default();
        empty.apply(&Reading::default());
        assert!(!empty.has_data);
    }

    #[test]
    fn test_recenter_keeps_previous() {
        let size = vec2(100.0, 100.0);
        let mut brush = BrushState::new(Thresholds::default(), size);
        brush.ingest(&reading(Some(0.0), Some(1.2), None));
        brush.step(0.1, size);
        brush.recenter(size);
        assert_eq!(brush.position(), pos2(50.0, 50.0));

        brush.ingest(&reading(Some(0.5), None, None));
        match brush.step(0.1, size) {
            Mark::Segment { from, to, .. } => {
                assert_eq!(from, pos2(20.0, 50.0));
                assert_eq!(to, pos2(50.0, 50.0));
            }
            other => panic!("expected segment, got {other:?}"),
        }
    }
}
