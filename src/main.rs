mod config;
mod error;
mod models;
mod services;

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::aggregator::CommandTemplate;
use crate::services::pipeline::{run, RunOptions};

/// Analyze M3U content and EPG matches
#[derive(Debug, Parser)]
#[command(name = "m3u-analyzer", version, about)]
struct Cli {
    /// Path to the M3U file
    m3u: PathBuf,

    /// Path to the EPG XML file
    epg: PathBuf,

    /// Directory for the report documents (one per run)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Playlist URL embedded in the optimization command
    #[arg(long, env = "PLAYLIST_URL")]
    playlist_url: Option<String>,

    /// EPG URL embedded in the optimization command
    #[arg(long, env = "EPG_URL")]
    epg_url: Option<String>,

    /// Output directory passed to the editor tool
    #[arg(long, env = "OPTIMIZED_DIR")]
    optimized_dir: Option<PathBuf>,
}

/// `<output>/../../optimized`, next to the playlist directory
fn default_optimized_dir(output_dir: &Path) -> PathBuf {
    match output_dir.parent().and_then(Path::parent) {
        Some(root) => root.join("optimized"),
        None => output_dir.join("optimized"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "m3u_analyzer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    tracing::info!("Starting M3U analyzer v{}", env!("CARGO_PKG_VERSION"));

    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));
    let output_dir = if output_dir.is_absolute() {
        output_dir
    } else {
        std::env::current_dir()
            .context("Failed to resolve working directory")?
            .join(output_dir)
    };

    let optimized_dir = cli
        .optimized_dir
        .unwrap_or_else(|| default_optimized_dir(&output_dir));

    let template = CommandTemplate {
        editor_script: config.editor_script.clone(),
        playlist_url: cli
            .playlist_url
            .unwrap_or_else(|| cli.m3u.display().to_string()),
        epg_url: cli.epg_url.unwrap_or_else(|| cli.epg.display().to_string()),
        optimized_dir: optimized_dir.display().to_string(),
    };

    let options = RunOptions {
        playlist_path: cli.m3u,
        epg_path: cli.epg,
        output_dir,
        template,
        max_playlist_bytes: config.max_m3u_bytes(),
        max_epg_bytes: config.max_epg_bytes(),
    };

    let outcome = run(&options).await.context("Analysis failed")?;

    for file in &outcome.files {
        tracing::info!(file = %file.display(), "Report written");
    }
    tracing::info!(
        command = %outcome.report.summary.optimization_command,
        "Optimization command generated"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_optimized_dir() {
        assert_eq!(
            default_optimized_dir(Path::new("/data/playlists/news/analysis")),
            PathBuf::from("/data/playlists/optimized")
        );
        assert_eq!(
            default_optimized_dir(Path::new("/analysis")),
            PathBuf::from("/analysis/optimized")
        );
    }

    #[test]
    fn test_cli_parses_positionals() {
        let cli = Cli::try_parse_from(["m3u-analyzer", "tv.m3u", "epg.xml", "-o", "out"]).unwrap();
        assert_eq!(cli.m3u, PathBuf::from("tv.m3u"));
        assert_eq!(cli.epg, PathBuf::from("epg.xml"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
    }
}
