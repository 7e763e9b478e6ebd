//! CLI command for inspecting .pal palettes

use std::path::Path;

use crate::formats::pal::read_pal;

pub fn execute(source: &Path, swatch: Option<&Path>, columns: u32, json: bool) -> anyhow::Result<()> {
    let palette = read_pal(source)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&palette.colors)?);
    } else {
        println!("File: {}", source.display());
        println!("Colors: {}", palette.len());
        for (i, c) in palette.colors.iter().enumerate() {
            println!("  {i:>3}: #{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a);
        }
    }

    if let Some(out) = swatch {
        if palette.is_empty() {
            anyhow::bail!("{} has no colors to draw", source.display());
        }
        palette.to_swatch(columns).save(out)?;
        if !json {
            println!("Swatch written to {}", out.display());
        }
    }

    Ok(())
}
