//! Application state management for TiltSketch
//!
//! This module contains the main application state structure and the per-frame plumbing that
//! connects serial events, the brush and the canvas. Rendering lives in `app` and
//! `canvas_display`, key handling in `input`, connection handling in `connection`.

use std::path::PathBuf;
use std::time::Duration;

use egui::{vec2, Vec2};

use crate::brush::{BrushState, Thresholds};
use crate::canvas::Canvas;
use crate::config::SharedSketchConfig;
use crate::constants::{
    FALLBACK_CANVAS_SIZE, MSG_CONNECTED, MSG_DISCONNECTED, MSG_PORT_OPENED, MAX_FRAME_DT,
};
use crate::scrollback::ScrollbackLog;
use crate::serial::{SerialController, SerialEvent};
use crate::telemetry::{parse_reading, Reading};

/// Per-run overrides collected from the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchOptions {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub replay: Option<PathBuf>,
    pub replay_interval: Option<Duration>,
    /// `Some(false)` suppresses the connection attempt on startup
    pub auto_connect: Option<bool>,
}

/// Main application structure
pub struct SketchApp {
    pub config: SharedSketchConfig,
    pub launch: LaunchOptions,
    pub controller: SerialController,
    pub brush: BrushState,
    pub canvas: Canvas,
    pub scrollback: ScrollbackLog,
    pub last_reading: Reading,
    pub connected: bool,
    pub connecting: bool,
    pub error_message: Option<String>,
    canvas_laid_out: bool,
}

impl SketchApp {
    pub fn new(config: SharedSketchConfig, launch: LaunchOptions) -> Self {
        let (thresholds, max_messages, auto_connect) = match config.lock() {
            Ok(cfg) => (Thresholds::from_config(&cfg), cfg.max_messages(), cfg.auto_connect()),
            Err(_) => {
                log::warn!("Configuration lock poisoned, using defaults");
                (Thresholds::default(), 100, true)
            }
        };
        let auto_connect = launch.auto_connect.unwrap_or(auto_connect);

        let size = vec2(FALLBACK_CANVAS_SIZE[0], FALLBACK_CANVAS_SIZE[1]);
        let mut app = Self {
            config,
            launch,
            controller: SerialController::new(),
            brush: BrushState::new(thresholds, size),
            canvas: Canvas::new(size.x, size.y),
            scrollback: ScrollbackLog::new(max_messages),
            last_reading: Reading::default(),
            connected: false,
            connecting: false,
            error_message: None,
            canvas_laid_out: false,
        };

        if auto_connect {
            app.do_connect();
        }
        app
    }

    /// Log a message to the scrollback. Every message is also scanned for channel readings.
    pub fn add_message(&mut self, message: &str) {
        log::info!("{message}");
        self.scrollback.push(message);

        let reading = parse_reading(message);
        if !reading.is_empty() {
            self.brush.ingest(&reading);
            self.last_reading = reading;
        }
    }

    pub fn handle_serial_event(&mut self, event: SerialEvent) {
        match event {
            SerialEvent::Opened(name) => {
                log::debug!("Transport opened: {name}");
                self.connecting = false;
                self.connected = true;
                self.error_message = None;
                self.add_message(MSG_PORT_OPENED);
                self.add_message(MSG_CONNECTED);
            }
            SerialEvent::Line(line) => self.add_message(&line),
            SerialEvent::Disconnected => {
                self.connecting = false;
                self.connected = false;
                self.add_message(MSG_DISCONNECTED);
            }
            SerialEvent::Error(message) => {
                self.connecting = false;
                self.connected = false;
                self.error_message = Some(message.clone());
                self.add_message(&message);
            }
        }
    }

    /// Drain pending serial events
    pub fn process_serial_events(&mut self) {
        for event in self.controller.poll() {
            self.handle_serial_event(event);
        }
    }

    /// Match the canvas to the space it was given. The first layout also centers the brush.
    pub fn layout_canvas(&mut self, size: Vec2) {
        if size != self.canvas.size() {
            self.canvas.resize(size.x, size.y);
        }
        if !self.canvas_laid_out {
            self.brush.recenter(self.canvas.size());
            self.canvas_laid_out = true;
        }
    }

    /// Advance the brush by one frame and record what it drew
    pub fn advance_frame(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        let mark = self.brush.step(dt, self.canvas.size());
        self.canvas.push(mark);
    }
}
