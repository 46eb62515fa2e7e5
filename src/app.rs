//! Main application loop for TiltSketch
//!
//! This module contains the eframe::App implementation and the per-frame UI update.

use eframe::egui;

use crate::app_state::SketchApp;
use crate::constants::{CANVAS_PANEL_FILL, TERMINAL_BORDER, TERMINAL_PANEL_FILL, TERMINAL_PANEL_HEIGHT};

impl eframe::App for SketchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}

impl SketchApp {
    /// One UI frame: drain serial events, apply keys, draw the canvas and the terminal
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.process_serial_events();
        self.handle_keyboard_input(ctx);

        let dt = ctx.input(|i| i.unstable_dt);

        egui::TopBottomPanel::bottom("terminal_panel")
            .exact_height(TERMINAL_PANEL_HEIGHT)
            .resizable(false)
            .frame(
                egui::Frame::new()
                    .fill(TERMINAL_PANEL_FILL)
                    .stroke(egui::Stroke::new(2.0, TERMINAL_BORDER))
                    .inner_margin(10.0),
            )
            .show(ctx, |ui| {
                self.draw_terminal(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(CANVAS_PANEL_FILL))
            .show(ctx, |ui| {
                self.draw_canvas(ui, dt);
            });

        // The brush integrates over frame time, so keep frames coming
        ctx.request_repaint();
    }
}
