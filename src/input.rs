//! Input handling for TiltSketch
//!
//! Keyboard shortcuts: Space reconnects, R recenters the brush, C explains that calibration
//! is fixed, S saves a PNG snapshot and Delete wipes the canvas.

use std::path::PathBuf;

use chrono::Local;
use eframe::egui;

use crate::app_state::SketchApp;
use crate::constants::{MSG_CALIBRATION_DISABLED, MSG_CANVAS_CLEARED, MSG_POSITION_RESET};
use crate::error::{ConfigError, SketchResult};

/// Actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Reconnect,
    Recenter,
    CalibrationNotice,
    SaveSnapshot,
    ClearCanvas,
}

impl KeyAction {
    pub fn from_key(key: egui::Key) -> Option<Self> {
        match key {
            egui::Key::Space => Some(KeyAction::Reconnect),
            egui::Key::R => Some(KeyAction::Recenter),
            egui::Key::C => Some(KeyAction::CalibrationNotice),
            egui::Key::S => Some(KeyAction::SaveSnapshot),
            egui::Key::Delete => Some(KeyAction::ClearCanvas),
            _ => None,
        }
    }
}

impl SketchApp {
    /// Collect this frame's key presses and apply them
    pub fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        let actions: Vec<KeyAction> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed: true, repeat: false, modifiers, .. }
                        if modifiers.is_none() =>
                    {
                        KeyAction::from_key(*key)
                    }
                    _ => None,
                })
                .collect()
        });

        for action in actions {
            self.apply_key_action(action);
        }
    }

    pub fn apply_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Reconnect => self.do_connect(),
            KeyAction::Recenter => {
                self.brush.recenter(self.canvas.size());
                self.add_message(MSG_POSITION_RESET);
            }
            KeyAction::CalibrationNotice => self.add_message(MSG_CALIBRATION_DISABLED),
            KeyAction::SaveSnapshot => self.save_snapshot(),
            KeyAction::ClearCanvas => {
                self.canvas.clear();
                self.add_message(MSG_CANVAS_CLEARED);
            }
        }
    }

    /// Save the canvas as a PNG and report where it went
    pub fn save_snapshot(&mut self) {
        match self.write_snapshot() {
            Ok(path) => self.add_message(&format!("Canvas saved to {}", path.display())),
            Err(e) => {
                log::warn!("Snapshot failed: {e}");
                self.add_message(&format!("Error: {e}"));
            }
        }
    }

    /// Rasterize the canvas into the configured snapshot directory
    pub fn write_snapshot(&self) -> SketchResult<PathBuf> {
        let directory = self
            .config
            .lock()
            .map_err(|_| ConfigError::Unavailable)?
            .snapshot_directory();
        Ok(self.canvas.save_snapshot(&directory, Local::now())?)
    }
}
