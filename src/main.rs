//! Main application entry point for TiltSketch
//!
//! This module parses the command line and starts the GUI.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use eframe::egui;

use tiltsketch::config;
use tiltsketch::constants::DEFAULT_WINDOW_SIZE;
use tiltsketch::serial::{self, PortKind};
use tiltsketch::{LaunchOptions, SketchApp};

enum Command {
    Run(LaunchOptions),
    ListPorts,
    Help,
}

fn print_help() {
    println!("TiltSketch - draw by tilting an accelerometer");
    println!();
    println!("Usage: tiltsketch [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --port <path> or -p <path>      Serial device to open (default: first USB port)");
    println!("  --baud <rate> or -b <rate>      Baud rate (default: 115200, ignored by USB CDC)");
    println!("  --replay <file>                 Play back captured device output instead of a port");
    println!("  --interval <ms>                 Delay between replayed lines (default: 500)");
    println!("  --no-connect                    Do not connect on startup (press SPACE later)");
    println!("  --list-ports                    List serial ports and exit");
    println!("  --help or -h                    Show this help message");
    println!();
    println!("Keys: SPACE reconnect, R recenter, C calibration info, S save PNG, DEL clear");
    println!();
    println!("Config file: {}", config::default_config_path().display());
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut options = LaunchOptions::default();
    let mut i = 0;

    let value_of = |i: usize, flag: &str| -> anyhow::Result<String> {
        args.get(i + 1)
            .cloned()
            .with_context(|| format!("{flag} requires a value"))
    };

    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                options.port = Some(value_of(i, "--port")?);
                i += 1;
            }
            "--baud" | "-b" => {
                let raw = value_of(i, "--baud")?;
                let baud: u32 = raw
                    .parse()
                    .with_context(|| format!("--baud requires a numeric value, got '{raw}'"))?;
                if baud == 0 {
                    bail!("--baud must be greater than zero");
                }
                options.baud_rate = Some(baud);
                i += 1;
            }
            "--replay" => {
                options.replay = Some(PathBuf::from(value_of(i, "--replay")?));
                i += 1;
            }
            "--interval" => {
                let raw = value_of(i, "--interval")?;
                let ms: u64 = raw
                    .parse()
                    .with_context(|| format!("--interval requires milliseconds, got '{raw}'"))?;
                options.replay_interval = Some(Duration::from_millis(ms));
                i += 1;
            }
            "--no-connect" => options.auto_connect = Some(false),
            "--list-ports" => return Ok(Command::ListPorts),
            "--help" | "-h" => return Ok(Command::Help),
            other => log::warn!("Ignoring unknown argument '{other}'"),
        }
        i += 1;
    }

    Ok(Command::Run(options))
}

fn list_ports() -> anyhow::Result<()> {
    let ports = serial::list_ports().context("Failed to enumerate serial ports")?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        match port.kind {
            PortKind::Usb { vid, pid, product } => println!(
                "{}  USB {vid:04x}:{pid:04x}  {}",
                port.name,
                product.unwrap_or_default()
            ),
            PortKind::Other => println!("{}", port.name),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Install panic handler to log panics before crashing
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("!!! PANIC !!!");
        eprintln!("Program panicked: {panic_info}");
        eprintln!("{:?}", std::backtrace::Backtrace::capture());
    }));

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args)? {
        Command::Help => {
            print_help();
            return Ok(());
        }
        Command::ListPorts => return list_ports(),
        Command::Run(options) => options,
    };

    let shared_config = config::load_shared_config();
    match config::ensure_config_file(&shared_config) {
        Ok(true) => log::info!("Wrote default configuration"),
        Ok(false) => {}
        Err(e) => log::warn!("Could not write default configuration: {e}"),
    }
    log::info!(
        "Using configuration {}",
        shared_config
            .lock()
            .map(|cfg| cfg.get_config_resource().to_string())
            .unwrap_or_default()
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("TiltSketch")
            .with_inner_size(DEFAULT_WINDOW_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        "TiltSketch",
        native_options,
        Box::new(move |_cc| Ok(Box::new(SketchApp::new(shared_config, options)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run TiltSketch: {e}"))?;

    log::info!("Application shutdown complete");
    Ok(())
}
