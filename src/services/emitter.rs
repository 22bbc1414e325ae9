use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{AnalyzerError, Result};
use crate::models::{
    AnalysisReport, AnalysisSummary, IndexDocument, NavTab, RunContext, SectionDocument,
    SectionKind,
};

/// Summary sidecar consumed by the optimization caller
pub const SUMMARY_FILE: &str = "command.json";
/// Landing document, defaults to the matched section
pub const INDEX_FILE: &str = "index.json";

const REPORT_TITLE: &str = "M3U Content Analysis Report";

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Render one section document
pub fn render_section(report: &AnalysisReport, kind: SectionKind) -> Result<Vec<u8>> {
    let total = report.summary.section_count(kind);

    match kind {
        SectionKind::Series => to_json(&SectionDocument {
            section: kind,
            title: kind.title(),
            total,
            groups: report.series.as_slice(),
        }),
        SectionKind::Matched | SectionKind::Unmatched | SectionKind::Movies | SectionKind::Other => {
            let groups = match kind {
                SectionKind::Matched => &report.matched,
                SectionKind::Unmatched => &report.unmatched,
                SectionKind::Movies => &report.movies,
                _ => &report.other,
            };
            to_json(&SectionDocument {
                section: kind,
                title: kind.title(),
                total,
                groups: groups.as_slice(),
            })
        }
    }
}

/// Render the summary sidecar
pub fn render_summary(summary: &AnalysisSummary) -> Result<Vec<u8>> {
    to_json(summary)
}

/// Render the landing document with navigation tabs
pub fn render_index(summary: &AnalysisSummary, context: &RunContext) -> Result<Vec<u8>> {
    let tabs = SectionKind::ALL
        .iter()
        .map(|kind| NavTab {
            section: *kind,
            label: kind.tab_label().to_string(),
            file: kind.file_name().to_string(),
            count: summary.section_count(*kind),
        })
        .collect();

    to_json(&IndexDocument {
        title: REPORT_TITLE.to_string(),
        generated_at: context.generated_at,
        playlist_source: context.playlist_source.clone(),
        epg_source: context.epg_source.clone(),
        default_section: SectionKind::Matched,
        default_file: SectionKind::Matched.file_name().to_string(),
        tabs,
        summary: summary.clone(),
    })
}

/// Writes the report documents into one output directory
///
/// Each run should get its own directory; files are replaced atomically.
pub struct ReportEmitter {
    output_dir: PathBuf,
}

impl ReportEmitter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Render every document first, then write them; returns written paths
    pub async fn emit(&self, report: &AnalysisReport, context: &RunContext) -> Result<Vec<PathBuf>> {
        let mut documents: Vec<(&str, Vec<u8>)> = Vec::with_capacity(SectionKind::ALL.len() + 2);
        for kind in SectionKind::ALL {
            documents.push((kind.file_name(), render_section(report, kind)?));
        }
        documents.push((SUMMARY_FILE, render_summary(&report.summary)?));
        documents.push((INDEX_FILE, render_index(&report.summary, context)?));

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| AnalyzerError::ReportWrite {
                path: self.output_dir.clone(),
                source,
            })?;

        let mut written = Vec::with_capacity(documents.len());
        for (file_name, bytes) in documents {
            let path = self.output_dir.join(file_name);
            write_atomic(&path, &bytes)
                .await
                .map_err(|source| AnalyzerError::ReportWrite {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(path = %path.display(), bytes = bytes.len(), "Report document written");
            written.push(path);
        }

        tracing::info!(
            "Reports generated: {} files in {}",
            written.len(),
            self.output_dir.display()
        );

        Ok(written)
    }
}

/// Write to a temp file, sync, then rename over the target
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    let result = async {
        let file = File::create(&tmp_path).await?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        writer.write_all(bytes).await?;
        writer.flush().await?;
        writer.get_ref().sync_all().await?;
        drop(writer);
        fs::rename(&tmp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path).await;
    }
    result
}
