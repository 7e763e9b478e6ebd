//! End-to-end ZTGFX loading
//!
//! Loading a container runs three stages:
//! 1. Decode the container (header, frame table, run-length rows)
//! 2. Decode the palette file it names
//! 3. Composite every frame against the palette
//!
//! Any failure aborts the whole load; no partial animation is returned.

use crate::converter::{CompositeMode, FrameSink, FrameView, Surface, composite_frame};
use crate::error::{Error, Result};
use crate::events::{EventSink, TracingSink};
use crate::formats::pal::{Palette, read_pal_with_events};
use crate::formats::ztgfx::{Container, Frame, MagicVariant, decode_container};
use crate::utils::stored_name_to_path;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options for loading a container
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Use this palette file instead of the one named in the container
    pub palette: Option<PathBuf>,
    /// Resolve the container's palette name relative to this directory
    /// If None, the name is resolved relative to the working directory
    pub palette_root: Option<PathBuf>,
    /// How runs within a scanline are combined
    pub mode: CompositeMode,
    /// Composite frames on the rayon thread pool
    pub parallel: bool,
    /// Checked between frames; when set the load stops with [`Error::Cancelled`]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            palette: None,
            palette_root: None,
            mode: CompositeMode::Sequential,
            parallel: true,
            cancel: None,
        }
    }
}

impl LoadOptions {
    /// Use an explicit palette file
    #[must_use]
    pub fn with_palette(mut self, path: impl Into<PathBuf>) -> Self {
        self.palette = Some(path.into());
        self
    }

    /// Resolve palette names relative to a game/asset root
    #[must_use]
    pub fn with_palette_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.palette_root = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: CompositeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Composite frames one after another on the calling thread
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    #[must_use]
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Path the palette named `name` is loaded from
    #[must_use]
    pub fn resolve_palette_path(&self, name: &str) -> PathBuf {
        if let Some(explicit) = &self.palette {
            return explicit.clone();
        }
        let stored = stored_name_to_path(name);
        match &self.palette_root {
            Some(root) => root.join(stored),
            None => stored,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// A composited frame with its placement offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    pub row_offset_v: i16,
    pub row_offset_h: i16,
    pub surface: Surface,
}

/// A fully loaded animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub variant: MagicVariant,
    pub animation_speed: i32,
    pub palette_file_name: String,
    /// Canvas size, taken from the first frame
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub frames: Vec<AnimationFrame>,
}

/// Serializable description of an exported animation
#[derive(Debug, Clone, Serialize)]
pub struct AnimationManifest {
    pub animation_speed: i32,
    pub palette_file_name: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub frames: Vec<ManifestFrame>,
}

/// One frame entry of an [`AnimationManifest`]
#[derive(Debug, Clone, Serialize)]
pub struct ManifestFrame {
    pub file: String,
    pub width: u32,
    pub height: u32,
    pub row_offset_v: i16,
    pub row_offset_h: i16,
}

impl Animation {
    /// Hand every frame to `sink`, in order
    ///
    /// # Errors
    /// Returns the first error reported by the sink.
    pub fn emit(&self, sink: &mut dyn FrameSink) -> Result<()> {
        for (index, frame) in self.frames.iter().enumerate() {
            sink.accept(&FrameView {
                index,
                row_offset_v: frame.row_offset_v,
                row_offset_h: frame.row_offset_h,
                surface: &frame.surface,
            })?;
        }
        Ok(())
    }

    /// Describe the animation, naming each frame with `file_name`
    pub fn manifest(&self, file_name: impl Fn(usize) -> String) -> AnimationManifest {
        AnimationManifest {
            animation_speed: self.animation_speed,
            palette_file_name: self.palette_file_name.clone(),
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            frames: self
                .frames
                .iter()
                .enumerate()
                .map(|(index, frame)| ManifestFrame {
                    file: file_name(index),
                    width: frame.surface.width(),
                    height: frame.surface.height(),
                    row_offset_v: frame.row_offset_v,
                    row_offset_h: frame.row_offset_h,
                })
                .collect(),
        }
    }
}

/// Load a .ztgfx file with default options
///
/// # Errors
/// Returns [`Error::CorruptFile`] wrapping the cause if any stage fails.
pub fn load_ztgfx<P: AsRef<Path>>(path: P) -> Result<Animation> {
    load_ztgfx_with_options(path, &LoadOptions::default())
}

/// Load a .ztgfx file
///
/// # Errors
/// Returns [`Error::CorruptFile`] wrapping the cause if any stage fails, or
/// [`Error::Cancelled`] if the cancel flag was raised.
pub fn load_ztgfx_with_options<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Animation> {
    load_ztgfx_with_events(path, options, &mut TracingSink)
}

/// Load a .ztgfx file, reporting container and palette decode events to `sink`
///
/// # Errors
/// Same as [`load_ztgfx_with_options`].
pub fn load_ztgfx_with_events<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
    sink: &mut dyn EventSink,
) -> Result<Animation> {
    let path = path.as_ref();
    tracing::info!("Loading ZTGFX: {}", path.display());

    load_file(path, options, sink).map_err(|e| match e {
        Error::Cancelled => Error::Cancelled,
        other => {
            tracing::debug!("Error loading file: {}", other);
            Error::CorruptFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            }
        }
    })
}

/// Load a container held in memory against an already decoded palette
///
/// # Errors
/// Returns the specific decode or compositing error; nothing is wrapped.
pub fn load_ztgfx_bytes(data: &[u8], palette: &Palette, options: &LoadOptions) -> Result<Animation> {
    load_ztgfx_bytes_with_events(data, palette, options, &mut TracingSink)
}

/// In-memory variant of [`load_ztgfx_with_events`]
///
/// # Errors
/// Same as [`load_ztgfx_bytes`].
pub fn load_ztgfx_bytes_with_events(
    data: &[u8],
    palette: &Palette,
    options: &LoadOptions,
    sink: &mut dyn EventSink,
) -> Result<Animation> {
    let container = decode_container(&mut Cursor::new(data), sink, options.cancel.as_deref())?;
    build_animation(container, palette, options)
}

fn load_file(path: &Path, options: &LoadOptions, sink: &mut dyn EventSink) -> Result<Animation> {
    let mut reader = BufReader::new(File::open(path)?);
    let container = decode_container(&mut reader, sink, options.cancel.as_deref())?;

    let palette_path = options.resolve_palette_path(&container.palette_file_name);
    tracing::debug!("Palette path: {}", palette_path.display());
    let palette = read_pal_with_events(&palette_path, sink)?;

    let animation = build_animation(container, &palette, options)?;
    tracing::info!(
        "Loaded {} frames with {} colors",
        animation.frames.len(),
        palette.len()
    );
    Ok(animation)
}

fn build_animation(container: Container, palette: &Palette, options: &LoadOptions) -> Result<Animation> {
    let surfaces = composite_all(&container.frames, palette, options)?;

    let (canvas_width, canvas_height) = container
        .frames
        .first()
        .map_or((0, 0), |f| (f.pixel_width(), f.pixel_height()));

    let frames = container
        .frames
        .iter()
        .zip(surfaces)
        .map(|(frame, surface)| AnimationFrame {
            row_offset_v: frame.row_offset_v,
            row_offset_h: frame.row_offset_h,
            surface,
        })
        .collect();

    Ok(Animation {
        variant: container.magic_variant,
        animation_speed: container.animation_speed,
        palette_file_name: container.palette_file_name,
        canvas_width,
        canvas_height,
        frames,
    })
}

fn composite_all(frames: &[Frame], palette: &Palette, options: &LoadOptions) -> Result<Vec<Surface>> {
    let composite = |frame: &Frame| -> Result<Surface> {
        if options.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(composite_frame(frame, palette, options.mode)?)
    };

    if options.parallel {
        frames.par_iter().map(composite).collect()
    } else {
        frames.iter().map(composite).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::OwnedFrame;
    use crate::error::PaletteError;
    use crate::formats::pal::Rgba;

    fn container_bytes(palette_name: &[u8], frames: &[(i16, i16, &[u8])]) -> Vec<u8> {
        let mut data = 120i32.to_le_bytes().to_vec();
        data.extend_from_slice(&(palette_name.len() as i32).to_le_bytes());
        data.extend_from_slice(palette_name);
        data.extend_from_slice(&(frames.len() as i32).to_le_bytes());
        for (height, width, rows) in frames {
            data.extend_from_slice(&(10 + rows.len() as i32).to_le_bytes());
            for v in [*height, *width, 3, -4, 0] {
                data.extend_from_slice(&v.to_le_bytes());
            }
            data.extend_from_slice(rows);
        }
        data
    }

    fn palette() -> Palette {
        Palette::new(vec![Rgba::new(255, 0, 0, 255), Rgba::new(0, 0, 255, 255)])
    }

    #[test]
    fn test_resolve_palette_path() {
        let options = LoadOptions::default();
        assert_eq!(options.resolve_palette_path("a.pal"), PathBuf::from("a.pal"));

        let options = LoadOptions::default().with_palette_root("/game");
        assert_eq!(options.resolve_palette_path("a.pal"), PathBuf::from("/game/a.pal"));

        let options = options.with_palette("/override.pal");
        assert_eq!(options.resolve_palette_path("a.pal"), PathBuf::from("/override.pal"));
    }

    #[test]
    fn test_bytes_to_animation() {
        let data = container_bytes(b"p.pal", &[(1, 2, &[1, 0, 2, 0, 1]), (1, 3, &[0])]);
        let animation = load_ztgfx_bytes(&data, &palette(), &LoadOptions::default()).unwrap();

        assert_eq!(animation.animation_speed, 120);
        assert_eq!((animation.canvas_width, animation.canvas_height), (2, 1));
        assert_eq!(animation.frames.len(), 2);
        assert_eq!(animation.frames[0].row_offset_v, 3);
        assert_eq!(animation.frames[0].row_offset_h, -4);
        assert_eq!(
            animation.frames[0].surface.row(0),
            &[Rgba::new(255, 0, 0, 255), Rgba::new(0, 0, 255, 255)]
        );
        assert_eq!(animation.frames[1].surface.width(), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data = container_bytes(b"", &[(1, 2, &[1, 1, 1, 1]), (1, 2, &[1, 0, 1, 0]), (0, 0, &[])]);
        let parallel = load_ztgfx_bytes(&data, &palette(), &LoadOptions::default()).unwrap();
        let sequential = load_ztgfx_bytes(&data, &palette(), &LoadOptions::default().sequential()).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_index_error_happens_while_compositing() {
        let data = container_bytes(b"", &[(1, 4, &[1, 0, 1, 200])]);
        // Decoding alone succeeds
        let container = crate::formats::ztgfx::parse_ztgfx_bytes(&data).unwrap();
        assert_eq!(container.frames[0].rows[0].runs[0].indices, vec![200]);

        let result = load_ztgfx_bytes(&data, &palette(), &LoadOptions::default());
        assert!(matches!(
            result,
            Err(Error::Palette(PaletteError::IndexOutOfRange { index: 200, color_count: 2 }))
        ));
    }

    #[test]
    fn test_cancelled_load() {
        let data = container_bytes(b"", &[(1, 1, &[0])]);
        let flag = Arc::new(AtomicBool::new(true));
        let options = LoadOptions::default().with_cancel_flag(flag);
        assert!(matches!(
            load_ztgfx_bytes(&data, &palette(), &options),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn test_emit_in_order() {
        let data = container_bytes(b"", &[(1, 1, &[0]), (2, 1, &[0, 0])]);
        let animation = load_ztgfx_bytes(&data, &palette(), &LoadOptions::default()).unwrap();

        let mut frames: Vec<OwnedFrame> = Vec::new();
        animation.emit(&mut frames).unwrap();
        let indices: Vec<_> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(frames[1].height, 2);

        let manifest = animation.manifest(|i| format!("f{i}.png"));
        assert_eq!(manifest.frames[1].file, "f1.png");
        assert_eq!(manifest.canvas_width, 1);
    }

    #[test]
    fn test_bytes_loader_reports_frame_boundaries() {
        use crate::events::DecodeEvent;

        // Single frame starting at offset 16; its rows end at 27
        let mut padded = container_bytes(b"", &[(1, 1, &[0])]);
        padded[12..16].copy_from_slice(&14i32.to_le_bytes());
        padded.extend_from_slice(&[0; 3]);

        let mut events: Vec<DecodeEvent> = Vec::new();
        load_ztgfx_bytes_with_events(&padded, &palette(), &LoadOptions::default(), &mut events).unwrap();
        assert!(events.contains(&DecodeEvent::FrameResynced { index: 0, from: 27, to: 30 }));

        let mut short = container_bytes(b"", &[(1, 1, &[0])]);
        short[12..16].copy_from_slice(&5i32.to_le_bytes());

        let mut events: Vec<DecodeEvent> = Vec::new();
        load_ztgfx_bytes_with_events(&short, &palette(), &LoadOptions::default(), &mut events).unwrap();
        assert!(events.contains(&DecodeEvent::FrameOverrun {
            index: 0,
            declared_end: 21,
            actual_end: 27,
        }));
    }

    #[test]
    fn test_missing_container_is_corrupt_file() {
        let err = load_ztgfx("no/such/file.ztgfx").unwrap_err();
        assert!(matches!(err, Error::CorruptFile { .. }));
        assert!(matches!(err.root_cause(), Error::Io(_)));
    }
}
