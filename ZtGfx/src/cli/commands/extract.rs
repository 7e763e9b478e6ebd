//! CLI command for compositing .ztgfx frames to PNG

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::ProgressBar;

use crate::cli::progress::{DISK, LOOKING_GLASS, PALETTE, print_done, print_step, simple_bar};
use crate::converter::{CompositeMode, FrameSink, FrameView, PngSequenceWriter};
use crate::loader::{LoadOptions, load_ztgfx_with_options};

/// Extraction options from CLI flags
#[derive(Debug, Clone, Default)]
pub struct ExtractCliOptions {
    /// Explicit palette file (--palette)
    pub palette: Option<PathBuf>,
    /// Directory for the stored palette name (--palette-root)
    pub palette_root: Option<PathBuf>,
    /// Run compositing mode (--mode)
    pub mode: CompositeMode,
    /// Write manifest.json next to the frames
    pub write_manifest: bool,
    /// Composite with rayon
    pub parallel: bool,
    /// Suppress progress output (--quiet)
    pub quiet: bool,
}

impl ExtractCliOptions {
    fn to_load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::default().with_mode(self.mode);
        if let Some(palette) = &self.palette {
            options = options.with_palette(palette);
        }
        if let Some(root) = &self.palette_root {
            options = options.with_palette_root(root);
        }
        if !self.parallel {
            options = options.sequential();
        }
        options
    }
}

/// Ticks a progress bar for every frame handed to the wrapped sink.
struct ProgressSink<'a, S: FrameSink> {
    inner: &'a mut S,
    bar: Option<ProgressBar>,
}

impl<S: FrameSink> FrameSink for ProgressSink<'_, S> {
    fn accept(&mut self, frame: &FrameView<'_>) -> crate::Result<()> {
        self.inner.accept(frame)?;
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
        Ok(())
    }
}

pub fn execute(source: &Path, destination: &Path, options: &ExtractCliOptions) -> anyhow::Result<()> {
    let start = Instant::now();
    let show_progress = !options.quiet;
    let total_steps = if options.write_manifest { 3 } else { 2 };

    if show_progress {
        print_step(1, total_steps, &LOOKING_GLASS, &format!("Decoding {}...", source.display()));
    }
    let animation = load_ztgfx_with_options(source, &options.to_load_options())?;

    let stem = source
        .file_stem()
        .map_or_else(|| "frame".to_string(), |s| s.to_string_lossy().into_owned());
    let mut writer = PngSequenceWriter::new(destination, stem);

    if show_progress {
        print_step(
            2,
            total_steps,
            &PALETTE,
            &format!("Writing {} frames...", animation.frames.len()),
        );
    }
    let bar = show_progress.then(|| simple_bar(animation.frames.len() as u64, "Writing frames"));
    let mut sink = ProgressSink {
        inner: &mut writer,
        bar,
    };
    animation.emit(&mut sink)?;
    if let Some(bar) = sink.bar.take() {
        bar.finish_and_clear();
    }

    if options.write_manifest {
        if show_progress {
            print_step(3, total_steps, &DISK, "Writing manifest...");
        }
        fs::create_dir_all(destination)?;
        let manifest = animation.manifest(|i| writer.file_name(i));
        fs::write(destination.join("manifest.json"), serde_json::to_string_pretty(&manifest)?)?;
    }

    if show_progress {
        println!("Wrote {} PNG files to {}", writer.written().len(), destination.display());
        print_done(start.elapsed());
    }

    Ok(())
}
