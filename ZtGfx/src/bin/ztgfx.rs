//! `ztgfx` command-line entry point

fn main() -> anyhow::Result<()> {
    ztgfx::cli::run_cli()
}
