//! CLI command for inspecting .ztgfx containers

use std::path::Path;

use crate::formats::ztgfx::{MagicVariant, read_ztgfx};

pub fn execute(source: &Path, json: bool) -> anyhow::Result<()> {
    let container = read_ztgfx(source)?;
    let summary = container.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let variant = match summary.variant {
        MagicVariant::ClassicHeader => "FATZ",
        MagicVariant::BareHeader => "bare",
    };

    println!("File: {}", source.display());
    println!("Header: {variant}");
    println!("Animation speed: {} ms", summary.animation_speed);
    println!("Palette: {}", summary.palette_file_name);
    println!("Frames: {}", summary.frame_count);

    if summary.frames.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:>5}  {:>9}  {:>11}  {:>8}  {:>8}  {:>6}",
        "#", "size", "offset v/h", "bytes", "at", "runs"
    );
    for frame in &summary.frames {
        println!(
            "{:>5}  {:>9}  {:>11}  {:>8}  {:>8}  {:>6}",
            frame.index,
            format!("{}x{}", frame.width, frame.height),
            format!("{}/{}", frame.row_offset_v, frame.row_offset_h),
            frame.byte_size,
            frame.start_offset,
            frame.run_count,
        );
    }

    Ok(())
}
