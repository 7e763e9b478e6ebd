//! ZTGFX sprite/animation container
//!
//! A container holds an animation speed, the name of an external palette
//! file, and a table of frames. Each frame stores its scanlines as
//! run-length encoded palette indices.
//!
//! ## Layout
//!
//! ```text
//! [optional] "FATZ" + 5 reserved bytes
//! i32 animation_speed
//! i32 name_length, u8[name_length] palette_file_name (NUL padded)
//! i32 frame_count
//! frame_count x {
//!     i32 byte_size
//!     i16 height, width, row_offset_v, row_offset_h, reserved
//!     height x { u8 run_count, run_count x { u8 transparent, u8 color, u8[color] } }
//! }
//! ```
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

mod reader;

pub use reader::{parse_ztgfx_bytes, read_ztgfx, read_ztgfx_from};
pub(crate) use reader::decode_container;

use serde::Serialize;

/// "FATZ" magic signature of the classic header
pub const FATZ_MAGIC: &[u8; 4] = b"FATZ";

/// Reserved bytes following the classic magic
pub const FATZ_RESERVED_SIZE: usize = 5;

/// Header layout detected from the first four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MagicVariant {
    /// Starts with `FATZ` and 5 reserved bytes.
    ClassicHeader,
    /// No magic; the speed field is at offset 0.
    BareHeader,
}

impl MagicVariant {
    /// Number of bytes preceding the `animation_speed` field.
    #[must_use]
    pub const fn header_len(self) -> usize {
        match self {
            Self::ClassicHeader => FATZ_MAGIC.len() + FATZ_RESERVED_SIZE,
            Self::BareHeader => 0,
        }
    }
}

/// A decoded ZTGFX container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub magic_variant: MagicVariant,
    pub animation_speed: i32,
    /// Palette file name as stored, trailing NULs removed
    pub palette_file_name: String,
    pub frame_count: usize,
    pub frames: Vec<Frame>,
}

/// One animation cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Size of the frame record, excluding its own 4-byte prefix
    pub byte_size: i32,
    /// Stream position right after the size prefix
    pub start_offset: u64,
    pub height: i16,
    pub width: i16,
    pub row_offset_v: i16,
    pub row_offset_h: i16,
    /// One entry per scanline
    pub rows: Vec<Row>,
}

/// One run-length encoded scanline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub runs: Vec<Run>,
}

/// A transparent skip followed by a span of palette indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub transparent_count: u8,
    /// Palette indices, one per colored pixel
    pub indices: Vec<u8>,
}

impl Row {
    /// Number of runs in the scanline as stored on disk.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Pixels this row would cover if every run were painted.
    #[must_use]
    pub fn encoded_width(&self) -> usize {
        self.runs
            .iter()
            .map(|r| usize::from(r.transparent_count) + r.indices.len())
            .sum()
    }
}

impl Run {
    /// Number of colored pixels in the run.
    #[must_use]
    pub fn color_count(&self) -> usize {
        self.indices.len()
    }
}

impl Frame {
    /// Width as an unsigned pixel count.
    #[must_use]
    pub fn pixel_width(&self) -> u32 {
        self.width.max(0) as u32
    }

    /// Height as an unsigned pixel count.
    #[must_use]
    pub fn pixel_height(&self) -> u32 {
        self.height.max(0) as u32
    }

    /// Absolute stream position where the next frame's size field starts,
    /// according to `byte_size`.
    #[must_use]
    pub fn declared_end(&self) -> u64 {
        self.start_offset.saturating_add_signed(i64::from(self.byte_size))
    }
}

/// Serializable overview of a container, for display and export.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerSummary {
    pub variant: MagicVariant,
    pub animation_speed: i32,
    pub palette_file_name: String,
    pub frame_count: usize,
    pub frames: Vec<FrameSummary>,
}

/// Geometry and bookkeeping of one frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub index: usize,
    pub width: i16,
    pub height: i16,
    pub row_offset_v: i16,
    pub row_offset_h: i16,
    pub byte_size: i32,
    pub start_offset: u64,
    pub run_count: usize,
    pub color_pixels: usize,
}

impl Container {
    /// Build a summary of the header and frame table.
    #[must_use]
    pub fn summary(&self) -> ContainerSummary {
        let frames = self
            .frames
            .iter()
            .enumerate()
            .map(|(index, frame)| FrameSummary {
                index,
                width: frame.width,
                height: frame.height,
                row_offset_v: frame.row_offset_v,
                row_offset_h: frame.row_offset_h,
                byte_size: frame.byte_size,
                start_offset: frame.start_offset,
                run_count: frame.rows.iter().map(Row::run_count).sum(),
                color_pixels: frame
                    .rows
                    .iter()
                    .flat_map(|row| &row.runs)
                    .map(Run::color_count)
                    .sum(),
            })
            .collect();

        ContainerSummary {
            variant: self.magic_variant,
            animation_speed: self.animation_speed,
            palette_file_name: self.palette_file_name.clone(),
            frame_count: self.frame_count,
            frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(transparent: u8, indices: &[u8]) -> Run {
        Run {
            transparent_count: transparent,
            indices: indices.to_vec(),
        }
    }

    #[test]
    fn test_header_len() {
        assert_eq!(MagicVariant::ClassicHeader.header_len(), 9);
        assert_eq!(MagicVariant::BareHeader.header_len(), 0);
    }

    #[test]
    fn test_encoded_width() {
        let row = Row {
            runs: vec![run(2, &[1, 2]), run(3, &[4])],
        };
        assert_eq!(row.run_count(), 2);
        assert_eq!(row.encoded_width(), 8);
    }

    #[test]
    fn test_declared_end_saturates() {
        let frame = Frame {
            byte_size: -100,
            start_offset: 20,
            height: 0,
            width: 0,
            row_offset_v: 0,
            row_offset_h: 0,
            rows: Vec::new(),
        };
        assert_eq!(frame.declared_end(), 0);
    }

    #[test]
    fn test_summary_totals() {
        let container = Container {
            magic_variant: MagicVariant::BareHeader,
            animation_speed: 100,
            palette_file_name: "a.pal".into(),
            frame_count: 1,
            frames: vec![Frame {
                byte_size: 10,
                start_offset: 4,
                height: 2,
                width: 4,
                row_offset_v: -1,
                row_offset_h: 3,
                rows: vec![
                    Row { runs: vec![run(1, &[1, 1, 1])] },
                    Row { runs: vec![run(0, &[2]), run(2, &[3])] },
                ],
            }],
        };
        let summary = container.summary();
        assert_eq!(summary.frames.len(), 1);
        assert_eq!(summary.frames[0].run_count, 3);
        assert_eq!(summary.frames[0].color_pixels, 5);
        assert_eq!(summary.frames[0].row_offset_v, -1);
    }
}
