//! Telemetry decoding for TiltSketch
//!
//! Turns the raw byte stream coming off the device into trimmed text lines and pulls the
//! three labelled channel readings out of each line. The firmware prints lines shaped like
//! `X: 2.871, Y: 2.872, Z: 0.654`, one every half second.

use std::sync::LazyLock;

use regex::Regex;

/// Channel labels in the order they are reported
pub const CHANNEL_LABELS: [char; 3] = ['X', 'Y', 'Z'];

/// `<label>:` followed by optional whitespace and a run of sign, dot and ASCII digits
fn channel_regex(label: char) -> Regex {
    Regex::new(&format!(r"{label}:\s*([-.0-9]+)")).expect("Invalid channel regex")
}

static X_REGEX: LazyLock<Regex> = LazyLock::new(|| channel_regex(CHANNEL_LABELS[0]));
static Y_REGEX: LazyLock<Regex> = LazyLock::new(|| channel_regex(CHANNEL_LABELS[1]));
static Z_REGEX: LazyLock<Regex> = LazyLock::new(|| channel_regex(CHANNEL_LABELS[2]));

/// Channel values found in a single line of device output
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl Reading {
    /// True when the line carried none of the three channels
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

/// Extract the `X:`, `Y:` and `Z:` readings from a line of device output.
///
/// Each label is matched independently. The first occurrence of `<label>:` followed by
/// optional whitespace and a run of `-`, `.` and digits wins; the longest prefix of that run
/// which parses as a number is the value. Channels that are absent, unparsable or not finite
/// come back as `None`.
pub fn parse_reading(line: &str) -> Reading {
    Reading {
        x: parse_channel(line, &X_REGEX),
        y: parse_channel(line, &Y_REGEX),
        z: parse_channel(line, &Z_REGEX),
    }
}

fn parse_channel(line: &str, pattern: &Regex) -> Option<f64> {
    let run = pattern.captures(line)?.get(1)?.as_str();
    parse_numeric_prefix(run)
}

/// Longest prefix of `run` that parses as a finite float.
fn parse_numeric_prefix(run: &str) -> Option<f64> {
    // run only holds ASCII, so every index is a char boundary
    (1..=run.len())
        .rev()
        .find_map(|end| run[..end].parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Incremental line splitter for chunked serial input.
///
/// Bytes are decoded as UTF-8 across chunk boundaries, lines are split on `\n` (a preceding
/// `\r` is dropped by trimming) and blank lines are discarded.
#[derive(Debug, Default)]
pub struct LineDecoder {
    pending: Vec<u8>,
    buffer: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of raw bytes and collect every line it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        self.decode_pending();

        let mut lines = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        lines
    }

    /// Flush whatever is left once the stream has ended
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            self.buffer.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }

        let tail = std::mem::take(&mut self.buffer);
        let trimmed = tail.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Number of bytes and characters still waiting for a line terminator
    pub fn buffered_len(&self) -> usize {
        self.pending.len() + self.buffer.len()
    }

    fn decode_pending(&mut self) {
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // Safe: from_utf8 just validated this prefix
                    if let Ok(text) = std::str::from_utf8(&self.pending[..valid]) {
                        self.buffer.push_str(text);
                    }
                    match e.error_len() {
                        Some(bad) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete sequence at the end, wait for the next chunk
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }
}
