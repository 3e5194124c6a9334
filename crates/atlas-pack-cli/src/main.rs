use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use walkdir::WalkDir;

use atlas_pack_core::SizingConfig;
use atlas_pack_image::ImageCrateBackend;

#[derive(Parser, Debug)]
#[command(name = "atlas-pack", about = "Pack a folder of images into a texture atlas", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images into an atlas
    Pack(PackArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Input file or directory
    input: PathBuf,
    /// Output base path; produces `<base>.png` and `<base>.atlas`
    base_out: PathBuf,
    /// Recurse into subdirectories of `input`
    #[arg(short, long, default_value_t = false)]
    recursive: bool,
    /// Worker thread count; 0 uses max(hardware_concurrency, 2)
    #[arg(long, default_value_t = 0)]
    workers: usize,
    /// Initial square side length tried by the sizing search
    #[arg(long, default_value_t = 1000)]
    start_size: u32,
    /// Side-length increment used while the sizing search is still growing
    #[arg(long, default_value_t = 100)]
    grow_step: u32,
    /// Side-length decrement used while the sizing search is shrinking
    #[arg(long, default_value_t = 1)]
    shrink_step: u32,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);

    let result = match &cli.command {
        Commands::Pack(args) => run_pack(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "atlas-pack failed");
            ExitCode::FAILURE
        }
    }
}

fn run_pack(args: &PackArgs) -> anyhow::Result<()> {
    let paths = gather_paths(&args.input, args.recursive)?;
    info!(count = paths.len(), input = %args.input.display(), "discovered images");

    let backend = Arc::new(ImageCrateBackend);
    let cfg = SizingConfig {
        workers: args.workers,
        start_size: args.start_size,
        grow_step: args.grow_step,
        shrink_step: args.shrink_step,
    };

    let atlas = atlas_pack_core::pack(&paths, &args.base_out, &backend, &cfg)
        .with_context(|| format!("packing into {}", args.base_out.display()))?;

    info!(count = atlas.len(), base_out = %args.base_out.display(), "atlas compiled");
    Ok(())
}

fn gather_paths(input: &std::path::Path, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let backend = ImageCrateBackend;
    let mut list = Vec::new();

    if input.is_file() {
        if is_image(input, &backend) {
            list.push(input.to_path_buf());
        }
        return Ok(list);
    }

    let walker = if recursive {
        WalkDir::new(input)
    } else {
        WalkDir::new(input).max_depth(1)
    };
    for entry in walker.into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && is_image(p, &backend) {
            list.push(p.to_path_buf());
        }
    }
    list.sort();
    Ok(list)
}

fn is_image(p: &std::path::Path, backend: &ImageCrateBackend) -> bool {
    use atlas_pack_core::ImageBackend;
    p.extension()
        .and_then(|e| e.to_str())
        .map(|s| format!(".{s}"))
        .is_some_and(|ext| backend.supports(&ext))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
