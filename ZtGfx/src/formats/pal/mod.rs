//! .pal palette file format
//!
//! A flat table of colors: an `i32` count followed by one 4-byte entry per
//! color, stored as B, G, R, A.

mod reader;

pub use reader::{parse_pal_bytes, read_pal, read_pal_from, read_pal_with_events};

use image::RgbaImage;
use serde::Serialize;

use crate::error::PaletteError;

/// Size of each palette entry on disk
pub const ENTRY_SIZE: usize = 4;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from an on-disk B, G, R, A entry.
    #[must_use]
    pub const fn from_bgra(bgra: [u8; 4]) -> Self {
        Self {
            r: bgra[2],
            g: bgra[1],
            b: bgra[0],
            a: bgra[3],
        }
    }

    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// An ordered color table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    pub colors: Vec<Rgba>,
}

impl Palette {
    #[must_use]
    pub fn new(colors: Vec<Rgba>) -> Self {
        Self { colors }
    }

    /// Number of colors in the palette.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Look up a color by pixel index.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::IndexOutOfRange`] if the palette has no entry at `index`.
    pub fn get(&self, index: u8) -> Result<Rgba, PaletteError> {
        self.colors
            .get(usize::from(index))
            .copied()
            .ok_or(PaletteError::IndexOutOfRange {
                index,
                color_count: self.colors.len(),
            })
    }

    /// Render the palette as a swatch image, one pixel per color, `columns`
    /// colors per row. Unused cells of the last row stay transparent.
    #[must_use]
    pub fn to_swatch(&self, columns: u32) -> RgbaImage {
        let columns = columns.max(1);
        let count = self.colors.len() as u32;
        let rows = count.div_ceil(columns).max(1);
        let width = if count == 0 { 1 } else { columns.min(count) };

        let mut image = RgbaImage::new(width, rows);
        for (i, color) in self.colors.iter().enumerate() {
            let i = i as u32;
            image.put_pixel(i % columns, i / columns, image::Rgba(color.to_array()));
        }
        image
    }
}
