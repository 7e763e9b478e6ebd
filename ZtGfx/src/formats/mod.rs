//! File format handlers for Zoo Tycoon sprite formats

pub mod pal;
pub mod ztgfx;

// Re-export main types
pub use pal::{Palette, Rgba, parse_pal_bytes, read_pal};
pub use ztgfx::{Container, Frame, MagicVariant, Row, Run, parse_ztgfx_bytes, read_ztgfx};
