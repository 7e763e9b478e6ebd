//! Frame sinks - hand composited frames to a host
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};

use super::compositor::Surface;
use crate::error::{Error, Result};

/// One composited frame and its placement, borrowed from an animation.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    /// Position in the animation (0-indexed)
    pub index: usize,
    pub row_offset_v: i16,
    pub row_offset_h: i16,
    pub surface: &'a Surface,
}

impl FrameView<'_> {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.surface.height()
    }
}

/// Receives frames in animation order.
pub trait FrameSink {
    /// Accept one frame.
    fn accept(&mut self, frame: &FrameView<'_>) -> Result<()>;
}

/// An owned copy of a frame, as collected by `Vec<OwnedFrame>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFrame {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub row_offset_v: i16,
    pub row_offset_h: i16,
    /// Packed RGBA bytes
    pub pixels: Vec<u8>,
}

impl FrameSink for Vec<OwnedFrame> {
    fn accept(&mut self, frame: &FrameView<'_>) -> Result<()> {
        self.push(OwnedFrame {
            index: frame.index,
            width: frame.width(),
            height: frame.height(),
            row_offset_v: frame.row_offset_v,
            row_offset_h: frame.row_offset_h,
            pixels: frame.surface.to_rgba_bytes(),
        });
        Ok(())
    }
}

/// Encode a surface as PNG bytes
///
/// # Errors
/// Returns an error if the surface has no pixels or encoding fails.
pub fn surface_to_png_bytes(surface: &Surface) -> Result<Vec<u8>> {
    let img = surface.to_image()?;
    let mut png_data = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_data);
    img.write_with_encoder(encoder)
        .map_err(|e| Error::PngEncodeFailed { message: e.to_string() })?;
    Ok(png_data)
}

/// Writes each frame as `<stem>_<index>.png` into a directory.
#[derive(Debug)]
pub struct PngSequenceWriter {
    dir: PathBuf,
    stem: String,
    written: Vec<PathBuf>,
}

impl PngSequenceWriter {
    /// Create a writer; the directory is created on first use.
    pub fn new<P: AsRef<Path>>(dir: P, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            stem: stem.into(),
            written: Vec::new(),
        }
    }

    /// File name used for frame `index`.
    #[must_use]
    pub fn file_name(&self, index: usize) -> String {
        format!("{}_{index:03}.png", self.stem)
    }

    /// Paths written so far, in frame order.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceWriter {
    fn accept(&mut self, frame: &FrameView<'_>) -> Result<()> {
        // Zero-sized frames have no PNG representation
        if frame.width() == 0 || frame.height() == 0 {
            tracing::debug!("Skipping empty frame {}", frame.index);
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(self.file_name(frame.index));
        let png = surface_to_png_bytes(frame.surface)?;
        fs::write(&path, png)?;
        tracing::debug!("Wrote frame {} -> {}", frame.index, path.display());

        self.written.push(path);
        Ok(())
    }
}
