//! Analysis pipeline
//!
//! parse → EPG index → classify → organize/aggregate → emit. Each stage fully
//! consumes the previous one; fatal errors stop the run before anything is
//! written.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AnalyzerError, Result};
use crate::models::{AnalysisReport, RunContext};
use crate::services::aggregator::{aggregate, CommandTemplate};
use crate::services::classifier::ContentClassifier;
use crate::services::emitter::ReportEmitter;
use crate::services::epg_index::EpgIndex;
use crate::services::m3u_parser::parse_playlist;

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub playlist_path: PathBuf,
    pub epg_path: PathBuf,
    pub output_dir: PathBuf,
    pub template: CommandTemplate,
    pub max_playlist_bytes: u64,
    pub max_epg_bytes: u64,
}

#[derive(Debug)]
pub struct RunOutcome {
    pub report: AnalysisReport,
    pub files: Vec<PathBuf>,
}

/// Pure analysis over in-memory documents
pub fn analyze(playlist_text: &str, epg: &[u8], template: &CommandTemplate) -> Result<AnalysisReport> {
    let playlist = parse_playlist(playlist_text);
    let index = EpgIndex::parse(epg)?;
    if index.is_empty() {
        warn!("EPG lists no programme channels; every identified entry is unmatched");
    } else {
        debug!(channels = index.len(), "EPG index ready");
    }

    let classifier = ContentClassifier::new();
    let classified = classifier.classify_playlist(&playlist, &index);

    Ok(aggregate(&classified, template))
}

/// Read both documents, analyze, and write the reports
pub async fn run(options: &RunOptions) -> Result<RunOutcome> {
    info!("Analyzing M3U file: {}", options.playlist_path.display());
    let playlist_text = read_playlist(&options.playlist_path, options.max_playlist_bytes).await?;

    info!("Checking EPG matches: {}", options.epg_path.display());
    let epg_bytes = read_epg(&options.epg_path, options.max_epg_bytes).await?;

    let report = analyze(&playlist_text, &epg_bytes, &options.template)?;

    let context = RunContext {
        generated_at: Utc::now(),
        playlist_source: options.template.playlist_url.clone(),
        epg_source: options.template.epg_url.clone(),
    };
    let files = ReportEmitter::new(&options.output_dir)
        .emit(&report, &context)
        .await?;

    Ok(RunOutcome { report, files })
}

fn too_large(len: u64, max_bytes: u64) -> Option<String> {
    (len > max_bytes).then(|| {
        format!(
            "file too large: {:.1}MB (limit {:.0}MB)",
            len as f64 / 1024f64 / 1024f64,
            max_bytes as f64 / 1024f64 / 1024f64
        )
    })
}

async fn read_playlist(path: &Path, max_bytes: u64) -> Result<String> {
    let unreadable = |reason: String| AnalyzerError::PlaylistUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let bytes = read_limited(path, max_bytes).await.map_err(unreadable)?;
    String::from_utf8(bytes).map_err(|e| unreadable(format!("not valid UTF-8: {}", e.utf8_error())))
}

/// Raw bytes; the XML declaration decides the text encoding
async fn read_epg(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    read_limited(path, max_bytes)
        .await
        .map_err(|reason| AnalyzerError::EpgUnreadable {
            path: path.to_path_buf(),
            reason,
        })
}

async fn read_limited(path: &Path, max_bytes: u64) -> std::result::Result<Vec<u8>, String> {
    let metadata = fs::metadata(path).await.map_err(|e| e.to_string())?;
    if let Some(reason) = too_large(metadata.len(), max_bytes) {
        return Err(reason);
    }
    fs::read(path).await.map_err(|e| e.to_string())
}
