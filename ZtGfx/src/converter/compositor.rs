//! Frame compositing - run-length rows to RGBA surfaces
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::str::FromStr;

use image::RgbaImage;

use crate::error::{Error, PaletteError, Result};
use crate::formats::pal::{Palette, Rgba};
use crate::formats::ztgfx::{Frame, Row};

/// How the runs of a scanline are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Each run skips its transparent pixels and then paints its colors,
    /// continuing from where the previous run stopped.
    #[default]
    Sequential,
    /// Legacy behavior: only the last run's transparent count is used, and
    /// the indices of every run are painted as one span after it.
    LastRunAggregate,
}

impl FromStr for CompositeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" | "seq" => Ok(CompositeMode::Sequential),
            "legacy" | "last-run" | "aggregate" => Ok(CompositeMode::LastRunAggregate),
            _ => Err(format!(
                "Invalid composite mode '{s}'. Valid values: sequential/seq, legacy/last-run/aggregate"
            )),
        }
    }
}

/// A `width x height` grid of RGBA pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Surface {
    /// Create a fully transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x as usize, y as usize)).copied()
    }

    /// All pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// One scanline.
    #[must_use]
    pub fn row(&self, y: u32) -> &[Rgba] {
        if y >= self.height {
            return &[];
        }
        let start = self.index(0, y as usize);
        &self.pixels[start..start + self.width as usize]
    }

    /// Set a pixel. Writes outside the surface are dropped.
    pub fn put(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width as usize && y < self.height as usize {
            let i = self.index(x, y);
            self.pixels[i] = color;
        }
    }

    /// Pixel data as packed RGBA bytes.
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Convert to an `image` buffer.
    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.to_rgba_bytes()).ok_or(Error::ImageBufferFailed)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }
}

/// Composite one frame against a palette.
///
/// The surface starts fully transparent. Rows that paint fewer than `width`
/// pixels keep a transparent remainder; pixels past `width` are dropped.
///
/// # Errors
///
/// Returns [`PaletteError::IndexOutOfRange`] if a painted run references an
/// index the palette does not define.
pub fn composite_frame(
    frame: &Frame,
    palette: &Palette,
    mode: CompositeMode,
) -> std::result::Result<Surface, PaletteError> {
    let mut surface = Surface::new(frame.pixel_width(), frame.pixel_height());
    let width = frame.pixel_width() as usize;

    for (y, row) in frame.rows.iter().enumerate() {
        match mode {
            CompositeMode::Sequential => paint_sequential(&mut surface, y, row, width, palette)?,
            CompositeMode::LastRunAggregate => paint_last_run(&mut surface, y, row, width, palette)?,
        }
    }

    Ok(surface)
}

fn paint_sequential(
    surface: &mut Surface,
    y: usize,
    row: &Row,
    width: usize,
    palette: &Palette,
) -> std::result::Result<(), PaletteError> {
    let mut x = 0usize;
    for run in &row.runs {
        let transparent = usize::from(run.transparent_count);
        // A full-width transparent run ends the row
        if transparent == width {
            break;
        }
        // Transparent pixels are already transparent; the cursor only moves forward.
        x += transparent;
        for &index in &run.indices {
            surface.put(x, y, palette.get(index)?);
            x += 1;
        }
    }
    Ok(())
}

fn paint_last_run(
    surface: &mut Surface,
    y: usize,
    row: &Row,
    width: usize,
    palette: &Palette,
) -> std::result::Result<(), PaletteError> {
    let transparent = row.runs.last().map_or(0, |r| usize::from(r.transparent_count));
    if transparent == width {
        return Ok(());
    }
    for (x, &index) in (transparent..).zip(row.runs.iter().flat_map(|r| &r.indices)) {
        surface.put(x, y, palette.get(index)?);
    }
    Ok(())
}
