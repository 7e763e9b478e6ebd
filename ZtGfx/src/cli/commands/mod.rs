use clap::Subcommand;
use std::path::PathBuf;

use crate::converter::CompositeMode;

pub mod extract;
pub mod info;
pub mod palette;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the header and frame table of a .ztgfx file
    Info {
        /// Source .ztgfx file
        #[arg(short, long)]
        source: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Composite every frame and write a PNG sequence
    Extract {
        /// Source .ztgfx file
        #[arg(short, long)]
        source: PathBuf,

        /// Output directory
        #[arg(short, long)]
        destination: PathBuf,

        /// Palette file to use instead of the one named in the header
        #[arg(short, long, conflicts_with = "palette_root")]
        palette: Option<PathBuf>,

        /// Directory the stored palette name is resolved against
        #[arg(long)]
        palette_root: Option<PathBuf>,

        /// Run compositing mode: sequential/seq or legacy/last-run/aggregate
        #[arg(short, long, default_value = "sequential")]
        mode: CompositeMode,

        /// Skip writing manifest.json
        #[arg(long)]
        no_manifest: bool,

        /// Composite frames on a single thread
        #[arg(long)]
        single_threaded: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Inspect a .pal palette file
    Palette {
        /// Source .pal file
        #[arg(short, long)]
        source: PathBuf,

        /// Write a PNG swatch of the palette
        #[arg(long)]
        swatch: Option<PathBuf>,

        /// Swatch cells per row
        #[arg(long, default_value_t = 16)]
        columns: u32,

        /// Print colors as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Info { source, json } => info::execute(source, *json),
            Commands::Extract {
                source,
                destination,
                palette,
                palette_root,
                mode,
                no_manifest,
                single_threaded,
                quiet,
            } => extract::execute(
                source,
                destination,
                &extract::ExtractCliOptions {
                    palette: palette.clone(),
                    palette_root: palette_root.clone(),
                    mode: *mode,
                    write_manifest: !no_manifest,
                    parallel: !single_threaded,
                    quiet: *quiet,
                },
            ),
            Commands::Palette { source, swatch, columns, json } => {
                palette::execute(source, swatch.as_deref(), *columns, *json)
            }
        }
    }
}
