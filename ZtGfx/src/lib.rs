//! # `ZtGfx`
//!
//! A pure-Rust decoder for Zoo Tycoon `.ztgfx` sprite animations.
//!
//! ## Supported Formats
//!
//! - **ZTGFX containers** - Classic (`FATZ`) and bare headers, frame tables,
//!   run-length encoded scanlines
//! - **PAL palettes** - Flat BGRA color tables
//! - **PNG** - Frame export
//!
//! ## Quick Start
//!
//! ### Loading an Animation
//!
//! ```no_run
//! use ztgfx::loader::{LoadOptions, load_ztgfx_with_options};
//!
//! let options = LoadOptions::default().with_palette_root("ZT/");
//! let animation = load_ztgfx_with_options("ZT/animals/lion/walk/N", &options)?;
//! println!("{} frames at speed {}", animation.frames.len(), animation.animation_speed);
//! # Ok::<(), ztgfx::Error>(())
//! ```
//!
//! ### Exporting Frames
//!
//! ```no_run
//! use ztgfx::converter::PngSequenceWriter;
//!
//! let animation = ztgfx::loader::load_ztgfx("N")?;
//! let mut writer = PngSequenceWriter::new("frames/", "N");
//! animation.emit(&mut writer)?;
//! # Ok::<(), ztgfx::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `ztgfx` command-line binary

pub mod error;
pub mod events;
pub mod formats;
pub mod converter;
pub mod loader;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, FormatError, PaletteError, Result};
    pub use crate::events::{DecodeEvent, EventSink, NullSink, TracingSink};
    pub use crate::formats::pal::{Palette, Rgba, read_pal, read_pal_with_events, parse_pal_bytes};
    pub use crate::formats::ztgfx::{
        Container, Frame, MagicVariant, Row, Run,
        read_ztgfx, read_ztgfx_from, parse_ztgfx_bytes,
    };
    pub use crate::converter::{
        CompositeMode, Surface, composite_frame,
        FrameSink, FrameView, OwnedFrame, PngSequenceWriter,
    };
    pub use crate::loader::{
        Animation, AnimationFrame, LoadOptions,
        load_ztgfx, load_ztgfx_with_options, load_ztgfx_with_events,
        load_ztgfx_bytes, load_ztgfx_bytes_with_events,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
