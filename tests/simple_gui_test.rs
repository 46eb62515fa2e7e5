//! GUI smoke tests driving the real application frame through egui_kittest

use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui;
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;

use tiltsketch::config::create_shared_config;
use tiltsketch::constants::{MSG_POSITION_RESET, TERMINAL_HEADER, TERMINAL_PANEL_HEIGHT};
use tiltsketch::scrollback::EMPTY_PLACEHOLDER;
use tiltsketch::serial::SerialEvent;
use tiltsketch::{LaunchOptions, SketchApp};

fn offline_app() -> Rc<RefCell<SketchApp>> {
    let launch = LaunchOptions { auto_connect: Some(false), ..Default::default() };
    Rc::new(RefCell::new(SketchApp::new(
        create_shared_config("gui_test.json".to_string()),
        launch,
    )))
}

fn harness_for(app: &Rc<RefCell<SketchApp>>) -> Harness<'static> {
    let app = Rc::clone(app);
    Harness::builder()
        .with_size(egui::Vec2::new(800.0, 600.0))
        .build(move |ctx| app.borrow_mut().ui(ctx))
}

#[test]
fn test_terminal_panel_renders() {
    let app = offline_app();
    let mut harness = harness_for(&app);
    harness.step();

    assert!(harness.query_by_label(TERMINAL_HEADER).is_some());
    assert!(harness.query_by_label(EMPTY_PLACEHOLDER).is_some());
}

#[test]
fn test_canvas_takes_space_above_terminal() {
    let app = offline_app();
    let mut harness = harness_for(&app);
    harness.step();

    let size = app.borrow().canvas.size();
    assert_eq!(size.x, 800.0);
    assert!(size.y > 0.0);
    assert!(size.y <= 600.0 - TERMINAL_PANEL_HEIGHT);

    // Brush starts in the middle of the laid out canvas
    let position = app.borrow().brush.position();
    assert_eq!(position, egui::pos2(size.x / 2.0, size.y / 2.0));
}

#[test]
fn test_device_line_shows_in_scrollback() {
    let app = offline_app();
    let mut harness = harness_for(&app);

    app.borrow_mut()
        .handle_serial_event(SerialEvent::Line("X: 0.100, Y: 1.300, Z: 2.000".to_string()));
    for _ in 0..3 {
        harness.step();
    }

    let app = app.borrow();
    assert_eq!(app.scrollback.len(), 1);
    assert!(app.brush.channels().has_data);
    // Moving left with the thick brush
    let last = app.canvas.marks().last().copied().expect("a mark was drawn");
    assert_eq!(last.width(), 18.0);
    assert!(app.brush.position().x < app.canvas.size().x / 2.0);
}

#[test]
fn test_r_key_recenters() {
    let app = offline_app();
    let mut harness = harness_for(&app);
    harness.step();

    app.borrow_mut().handle_serial_event(SerialEvent::Line("X: 1.0".to_string()));
    for _ in 0..3 {
        harness.step();
    }

    harness.input_mut().events.push(egui::Event::Key {
        key: egui::Key::R,
        physical_key: None,
        pressed: true,
        repeat: false,
        modifiers: egui::Modifiers::NONE,
    });
    harness.step();

    let app = app.borrow();
    assert!(app.scrollback.entries().any(|e| e.ends_with(MSG_POSITION_RESET)));
}
