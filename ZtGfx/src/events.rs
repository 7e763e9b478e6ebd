//! Structured decode events
//!
//! Decoders report milestones to an [`EventSink`] passed in by the caller
//! instead of writing to a shared log. [`TracingSink`] forwards them to
//! `tracing`; a `Vec<DecodeEvent>` records them for inspection.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::formats::ztgfx::MagicVariant;

/// A milestone reached while decoding a container or palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeEvent {
    /// The header variant was detected from the first four bytes.
    VariantDetected {
        /// Detected variant
        variant: MagicVariant,
    },
    /// Fixed header fields were read.
    HeaderRead {
        animation_speed: i32,
        palette_file_name: String,
        frame_count: i32,
    },
    /// A frame record was fully decoded.
    FrameDecoded {
        index: usize,
        byte_size: i32,
        start_offset: u64,
        width: i16,
        height: i16,
    },
    /// The frame's row data ended before its declared size; the cursor was
    /// moved forward to the declared boundary.
    FrameResynced {
        index: usize,
        /// Position where row data ended
        from: u64,
        /// Declared frame end
        to: u64,
    },
    /// The frame's row data ran past its declared size. The cursor is left
    /// where parsing stopped.
    FrameOverrun {
        index: usize,
        /// Declared frame end
        declared_end: u64,
        /// Position where row data ended
        actual_end: u64,
    },
    /// A palette was decoded.
    PaletteLoaded {
        color_count: usize,
    },
}

/// Receiver for [`DecodeEvent`]s.
pub trait EventSink {
    /// Record one event.
    fn record(&mut self, event: DecodeEvent);
}

/// Forwards events to `tracing`. Overruns are logged at `warn`, everything
/// else at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: DecodeEvent) {
        match event {
            DecodeEvent::VariantDetected { variant } => {
                tracing::debug!("Header variant: {:?}", variant);
            }
            DecodeEvent::HeaderRead {
                animation_speed,
                palette_file_name,
                frame_count,
            } => {
                tracing::debug!(
                    "AnimationSpeed: {}, PalFileName: {}, FrameCount: {}",
                    animation_speed,
                    palette_file_name,
                    frame_count
                );
            }
            DecodeEvent::FrameDecoded {
                index,
                byte_size,
                start_offset,
                width,
                height,
            } => {
                tracing::debug!(
                    "Frame {}: size={} offset={} {}x{}",
                    index,
                    byte_size,
                    start_offset,
                    width,
                    height
                );
            }
            DecodeEvent::FrameResynced { index, from, to } => {
                tracing::debug!("Frame {}: skipped {} padding bytes ({} -> {})", index, to - from, from, to);
            }
            DecodeEvent::FrameOverrun {
                index,
                declared_end,
                actual_end,
            } => {
                tracing::warn!(
                    "Frame {}: row data ends at {} past declared end {}; not rewinding",
                    index,
                    actual_end,
                    declared_end
                );
            }
            DecodeEvent::PaletteLoaded { color_count } => {
                tracing::debug!("Palette ColorCount: {}", color_count);
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: DecodeEvent) {}
}

impl EventSink for Vec<DecodeEvent> {
    fn record(&mut self, event: DecodeEvent) {
        self.push(event);
    }
}

