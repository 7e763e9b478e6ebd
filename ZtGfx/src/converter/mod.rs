//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! Frame conversion utilities
//!
//! This module turns decoded frames into pixels and hands them on:
//! - Run-length rows + palette → RGBA surfaces
//! - Surfaces → PNG sequences or in-memory frame collections

pub mod compositor;
pub mod frame_sink;

pub use compositor::{CompositeMode, Surface, composite_frame};
pub use frame_sink::{FrameSink, FrameView, OwnedFrame, PngSequenceWriter, surface_to_png_bytes};
