//! Error types for TiltSketch
//!
//! Structured errors for the serial transport, configuration handling and canvas export.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Top-level error type for TiltSketch operations
#[derive(Debug)]
pub enum SketchError {
    /// Serial transport errors
    Serial(SerialError),
    /// Configuration errors
    Config(ConfigError),
    /// Canvas export errors
    Export(ExportError),
}

/// Serial transport related errors
#[derive(Debug)]
pub enum SerialError {
    /// No serial ports were found on this machine
    NoPortsAvailable,
    /// The port could not be opened
    OpenFailed { path: String, reason: String },
    /// Reading from an open port failed
    ReadFailed { reason: String },
    /// Port enumeration failed
    EnumerationFailed { reason: String },
    /// Replay source could not be read
    ReplayUnavailable { path: String, reason: String },
    /// The async runtime backing the reader could not be started
    RuntimeUnavailable { reason: String },
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file error
    FileError { path: String, error: String },
    /// Configuration could not be serialized or parsed
    Malformed { error: String },
    /// Shared configuration lock was poisoned by a panicking holder
    Unavailable,
}

/// Canvas export errors
#[derive(Debug)]
pub enum ExportError {
    /// Canvas has no drawable area
    EmptyCanvas { width: u32, height: u32 },
    /// PNG encoder failure
    Encoding { message: String },
    /// Output file could not be written
    Io { path: String, error: String },
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchError::Serial(err) => write!(f, "Serial error: {err}"),
            SketchError::Config(err) => write!(f, "Configuration error: {err}"),
            SketchError::Export(err) => write!(f, "Export error: {err}"),
        }
    }
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::NoPortsAvailable =>
                write!(f, "No serial ports found"),
            SerialError::OpenFailed { path, reason } =>
                write!(f, "Failed to open {path}: {reason}"),
            SerialError::ReadFailed { reason } =>
                write!(f, "Read error: {reason}"),
            SerialError::EnumerationFailed { reason } =>
                write!(f, "Failed to list serial ports: {reason}"),
            SerialError::ReplayUnavailable { path, reason } =>
                write!(f, "Cannot replay {path}: {reason}"),
            SerialError::RuntimeUnavailable { reason } =>
                write!(f, "Reader runtime unavailable: {reason}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } =>
                write!(f, "Invalid configuration parameter '{parameter}' = '{value}': {reason}"),
            ConfigError::FileError { path, error } =>
                write!(f, "Configuration file error '{path}': {error}"),
            ConfigError::Malformed { error } =>
                write!(f, "Malformed configuration: {error}"),
            ConfigError::Unavailable =>
                write!(f, "Configuration is unavailable"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::EmptyCanvas { width, height } =>
                write!(f, "Canvas {width}x{height} has nothing to export"),
            ExportError::Encoding { message } =>
                write!(f, "PNG encoding failed: {message}"),
            ExportError::Io { path, error } =>
                write!(f, "Cannot write '{path}': {error}"),
        }
    }
}

impl StdError for SketchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SketchError::Serial(err) => Some(err),
            SketchError::Config(err) => Some(err),
            SketchError::Export(err) => Some(err),
        }
    }
}

impl StdError for SerialError {}
impl StdError for ConfigError {}
impl StdError for ExportError {}

impl From<SerialError> for SketchError {
    fn from(err: SerialError) -> Self {
        SketchError::Serial(err)
    }
}

impl From<ConfigError> for SketchError {
    fn from(err: ConfigError) -> Self {
        SketchError::Config(err)
    }
}

impl From<ExportError> for SketchError {
    fn from(err: ExportError) -> Self {
        SketchError::Export(err)
    }
}

impl From<tokio_serial::Error> for SerialError {
    fn from(err: tokio_serial::Error) -> Self {
        SerialError::EnumerationFailed { reason: err.to_string() }
    }
}

impl From<png::EncodingError> for ExportError {
    fn from(err: png::EncodingError) -> Self {
        ExportError::Encoding { message: err.to_string() }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Malformed { error: err.to_string() }
    }
}

impl From<io::Error> for SerialError {
    fn from(err: io::Error) -> Self {
        SerialError::ReadFailed { reason: err.to_string() }
    }
}

/// Result type alias for TiltSketch operations
pub type SketchResult<T> = Result<T, SketchError>;

/// Specialized result types for different components
pub type SerialResult<T> = Result<T, SerialError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ExportResult<T> = Result<T, ExportError>;
