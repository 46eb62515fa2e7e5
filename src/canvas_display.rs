//! Canvas and terminal rendering for TiltSketch
//!
//! Paints the retained marks with round caps and the scrollback underneath.

use eframe::egui;
use egui::{Color32, FontId, Pos2, Rect, RichText, Stroke, Vec2};

use crate::app_state::SketchApp;
use crate::brush::Mark;
use crate::canvas::BACKGROUND_GRAY;
use crate::constants::{
    TERMINAL_BODY_FILL, TERMINAL_BODY_FONT_SIZE, TERMINAL_HEADER, TERMINAL_HEADER_FONT_SIZE,
    TERMINAL_TEXT,
};

/// Paint one mark translated by `origin`
pub fn paint_mark(painter: &egui::Painter, origin: Vec2, mark: &Mark) {
    let radius = mark.width() / 2.0;
    let color: Color32 = mark.color().into();
    match *mark {
        Mark::Dot { at, .. } => {
            painter.circle_filled(at + origin, radius, color);
        }
        Mark::Segment { from, to, width, .. } => {
            let (from, to) = (from + origin, to + origin);
            painter.line_segment([from, to], Stroke::new(width, color));
            painter.circle_filled(from, radius, color);
            painter.circle_filled(to, radius, color);
        }
    }
}

impl SketchApp {
    /// Claim the remaining space for the canvas, advance the brush and paint every mark
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui, dt: f32) {
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
        self.layout_canvas(rect.size());
        self.advance_frame(dt);

        if !ui.is_rect_visible(rect) {
            return;
        }

        let painter = ui.painter_at(rect);
        painter.rect_filled(
            rect,
            egui::CornerRadius::ZERO,
            Color32::from_gray(BACKGROUND_GRAY),
        );

        let origin = rect.min.to_vec2();
        for mark in self.canvas.marks() {
            paint_mark(&painter, origin, mark);
        }

        self.draw_status_overlay(&painter, rect);
    }

    fn draw_status_overlay(&self, painter: &egui::Painter, rect: Rect) {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
        let state = if self.connected {
            "connected"
        } else if self.connecting {
            "connecting"
        } else {
            "offline"
        };
        let text = format!(
            "{state}  X {}  Y {}  Z {}",
            fmt(self.brush.channels().x),
            fmt(self.brush.channels().y),
            fmt(self.brush.channels().z),
        );
        painter.text(
            rect.min + Vec2::new(8.0, 6.0),
            egui::Align2::LEFT_TOP,
            text,
            FontId::monospace(11.0),
            Color32::from_gray(140),
        );

        if let Some(error) = &self.error_message {
            painter.text(
                Pos2::new(rect.min.x + 8.0, rect.min.y + 22.0),
                egui::Align2::LEFT_TOP,
                format!("⚠ {error}"),
                FontId::monospace(11.0),
                Color32::RED,
            );
        }
    }

    /// Header plus the auto-scrolling scrollback body
    pub fn draw_terminal(&mut self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new(TERMINAL_HEADER)
                .strong()
                .color(TERMINAL_TEXT)
                .font(FontId::monospace(TERMINAL_HEADER_FONT_SIZE)),
        );
        ui.add_space(5.0);

        egui::Frame::new()
            .fill(TERMINAL_BODY_FILL)
            .corner_radius(3.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("scrollback")
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        ui.add(
                            egui::Label::new(
                                RichText::new(self.scrollback.render())
                                    .color(TERMINAL_TEXT)
                                    .font(FontId::monospace(TERMINAL_BODY_FONT_SIZE)),
                            )
                            .wrap()
                            .selectable(true),
                        );
                    });
            });
    }
}
