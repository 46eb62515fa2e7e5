//! Connection management for TiltSketch
//!
//! This module resolves which transport to open and handles connecting, reconnecting and
//! disconnecting.

use crate::app_state::SketchApp;
use crate::error::{ConfigError, SerialError, SketchError, SketchResult};
use crate::serial::{self, TransportSpec};

impl SketchApp {
    /// Work out the transport from CLI overrides, configuration and the ports present
    pub fn resolve_transport(&self) -> SketchResult<TransportSpec> {
        let (configured_port, config_baud, config_interval) = {
            let cfg = self.config.lock().map_err(|_| ConfigError::Unavailable)?;
            (cfg.serial_port(), cfg.baud_rate()?, cfg.replay_interval())
        };

        if let Some(path) = &self.launch.replay {
            return Ok(TransportSpec::Replay {
                path: path.clone(),
                interval: self.launch.replay_interval.unwrap_or(config_interval),
            });
        }

        let baud_rate = self.launch.baud_rate.unwrap_or(config_baud);
        let path = match self.launch.port.clone().or(configured_port) {
            Some(path) => path,
            None => {
                let ports = serial::list_ports()?;
                serial::choose_port(None, &ports).ok_or(SerialError::NoPortsAvailable)?
            }
        };

        Ok(TransportSpec::Serial { path, baud_rate })
    }

    /// Open the transport, replacing any running connection
    pub fn do_connect(&mut self) {
        self.error_message = None;

        let spec = match self.resolve_transport() {
            Ok(spec) => spec,
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };

        self.connected = false;
        self.connecting = true;
        log::info!("Connecting to {}", spec.describe());

        if let Err(e) = self.controller.connect(spec) {
            self.report_error(&SketchError::from(e));
        }
    }

    /// Surface a failed connection attempt in the overlay and the scrollback
    fn report_error(&mut self, error: &SketchError) {
        log::warn!("{error}");
        let message = format!("Error: {error}");
        self.connecting = false;
        self.error_message = Some(message.clone());
        self.add_message(&message);
    }

    pub fn do_disconnect(&mut self) {
        self.controller.disconnect();
        self.connecting = false;
        if self.connected {
            self.connected = false;
            self.add_message(crate::constants::MSG_DISCONNECTED);
        }
    }
}
