//! Retained drawing surface for TiltSketch
//!
//! egui redraws the whole frame every time, so the strokes laid down by the brush are kept
//! here as a list of marks. Consecutive marks that would not change the picture are merged
//! so a long straight stroke costs one entry.
//!
//! The canvas can also be rasterized into an RGBA framebuffer and saved as PNG.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use egui::{vec2, Pos2, Vec2};

use crate::brush::{Mark, Rgba8};
use crate::error::{ExportError, ExportResult};

/// Gray level of the canvas background
pub const BACKGROUND_GRAY: u8 = 20;

/// Tolerance when deciding whether two segments continue the same line
const COLLINEAR_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone)]
pub struct Canvas {
    size: Vec2,
    marks: Vec<Mark>,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: vec2(width.max(0.0), height.max(0.0)),
            marks: Vec::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Change the drawable area. Existing marks are kept as they are.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = vec2(width.max(0.0), height.max(0.0));
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    /// Add a mark, merging it into the previous one where the result looks identical
    pub fn push(&mut self, mark: Mark) {
        let Some(last) = self.marks.last_mut() else {
            self.marks.push(mark);
            return;
        };

        let same_style = last.width() == mark.width() && last.color() == mark.color();
        if !same_style {
            self.marks.push(mark);
            return;
        }

        let anchor = last.end();
        match mark {
            Mark::Dot { at, .. } if at == anchor => {}
            Mark::Segment { from, to, .. } if from == anchor && to == anchor => {}
            Mark::Segment { from, to, .. } if from == anchor => {
                if let Mark::Segment { from: start, to: end, .. } = last {
                    if continues_line(*start, *end, to) {
                        *end = to;
                        return;
                    }
                }
                self.marks.push(mark);
            }
            _ => self.marks.push(mark),
        }
    }

    /// Render every mark with round caps over the background
    pub fn rasterize(&self) -> ExportResult<Framebuffer> {
        let width = self.size.x.round() as u32;
        let height = self.size.y.round() as u32;
        let mut fb = Framebuffer::new(width, height)?;
        fb.clear(Rgba8::new(BACKGROUND_GRAY, BACKGROUND_GRAY, BACKGROUND_GRAY, 255));

        for mark in &self.marks {
            match *mark {
                Mark::Dot { at, width, color } => fb.stroke_capsule(at, at, width / 2.0, color),
                Mark::Segment { from, to, width, color } => {
                    fb.stroke_capsule(from, to, width / 2.0, color)
                }
            }
        }
        Ok(fb)
    }

    /// Rasterize and write a PNG into `directory`, returning the file path
    pub fn save_snapshot(&self, directory: &Path, time: DateTime<Local>) -> ExportResult<PathBuf> {
        let fb = self.rasterize()?;
        let path = directory.join(snapshot_file_name(time));
        fb.write_png(&path)?;
        Ok(path)
    }
}

/// `tiltsketch-YYYYMMDD-HHMMSS.png`
pub fn snapshot_file_name(time: DateTime<Local>) -> String {
    format!("tiltsketch-{}.png", time.format("%Y%m%d-%H%M%S"))
}

/// True when `next` extends the segment `start -> end` in the same direction
fn continues_line(start: Pos2, end: Pos2, next: Pos2) -> bool {
    let current = end - start;
    let extension = next - end;
    if current.length_sq() == 0.0 {
        return false;
    }
    let cross = current.x * extension.y - current.y * extension.x;
    let scale = current.length() * extension.length();
    cross.abs() <= COLLINEAR_EPSILON * scale.max(1.0) && current.dot(extension) >= 0.0
}

/// Tightly packed RGBA8 pixel buffer
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> ExportResult<Self> {
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyCanvas { width, height });
        }
        Ok(Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        let p = &self.pixels[i..i + 4];
        Some(Rgba8::new(p[0], p[1], p[2], p[3]))
    }

    pub fn clear(&mut self, color: Rgba8) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Fill the capsule of `radius` around `a -> b` with one pixel of antialiasing
    pub fn stroke_capsule(&mut self, a: Pos2, b: Pos2, radius: f32, color: Rgba8) {
        let reach = radius + 1.0;
        let min_x = (a.x.min(b.x) - reach).floor().max(0.0) as u32;
        let min_y = (a.y.min(b.y) - reach).floor().max(0.0) as u32;
        let max_x = ((a.x.max(b.x) + reach).ceil().max(0.0) as u32).min(self.width);
        let max_y = ((a.y.max(b.y) + reach).ceil().max(0.0) as u32).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = distance_to_segment(center, a, b);
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba8, coverage: f32) {
        let alpha = color.a as f32 / 255.0 * coverage;
        let i = self.index(x, y);
        let src = [color.r, color.g, color.b];
        for (c, s) in src.iter().enumerate() {
            let dst = self.pixels[i + c] as f32;
            self.pixels[i + c] = (dst + (*s as f32 - dst) * alpha).round() as u8;
        }
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        self.pixels[i + 3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0).round() as u8;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Encode to PNG bytes
    pub fn to_png_bytes(&self) -> ExportResult<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buffer, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
        }
        Ok(buffer)
    }

    /// Write a PNG file to `path`
    pub fn write_png(&self, path: &Path) -> ExportResult<()> {
        let file = File::create(path).map_err(|e| ExportError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;
        Ok(())
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
