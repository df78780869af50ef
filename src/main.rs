//! CLI entry point for the cf-mirror tool.

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use cf_mirror_core::{Mirror, MirrorConfig};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Keys stay out of the logs; only the shape of the invocation is traced.
    debug!(
        addon = ?args.addon,
        addon_id = args.addon_id,
        api_path = args.api_key.is_some(),
        proxy_fallback = args.proxy_key.is_some(),
        output_dir = %args.output_dir.display(),
        "CLI arguments parsed"
    );

    let config = MirrorConfig::from_parts(
        args.addon,
        args.addon_id,
        args.api_key,
        args.proxy_key,
        args.output_dir,
        args.max_attempts,
    )?;

    let mut mirror = Mirror::new(config)?;
    let stats = mirror.run().await?;

    info!(
        tracks = stats.tracks_found,
        written = stats.files_written,
        failed = stats.failed_downloads,
        "mirror run complete"
    );

    Ok(())
}
