use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entry;

/// Report sections, in navigation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Matched,
    Unmatched,
    Movies,
    Series,
    Other,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Matched,
        SectionKind::Unmatched,
        SectionKind::Movies,
        SectionKind::Series,
        SectionKind::Other,
    ];

    /// Output file name of the section document
    pub fn file_name(&self) -> &'static str {
        match self {
            SectionKind::Matched => "content_analysis_matched.json",
            SectionKind::Unmatched => "content_analysis_unmatched.json",
            SectionKind::Movies => "content_analysis_movies.json",
            SectionKind::Series => "content_analysis_series.json",
            SectionKind::Other => "content_analysis_unmatched_no_tvg.json",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Matched => "Content with EPG Matches",
            SectionKind::Unmatched => "Content without EPG Matches",
            SectionKind::Movies => "Movies without TVG-ID",
            SectionKind::Series => "Series without TVG-ID",
            SectionKind::Other => "Other Content without TVG-ID",
        }
    }

    /// Short label used for navigation tabs
    pub fn tab_label(&self) -> &'static str {
        match self {
            SectionKind::Matched => "With EPG",
            SectionKind::Unmatched => "No EPG",
            SectionKind::Movies => "Movies",
            SectionKind::Series => "Series",
            SectionKind::Other => "Other",
        }
    }
}

/// Rendering record for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub name: String,
    pub group: String,
    pub channel_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub stream_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_epg: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl EntryRecord {
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            group: entry.group.clone(),
            channel_identifier: entry.channel_identifier.clone(),
            logo_url: entry.logo_url.clone(),
            stream_url: entry.stream_url.clone(),
            has_epg: None,
            series_name: None,
            season: None,
            episode: None,
        }
    }
}

/// Entries of one group, sorted by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSection {
    /// Stable navigation anchor
    pub id: String,
    pub name: String,
    pub entries: Vec<EntryRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSection {
    pub season: u32,
    pub episodes: Vec<EntryRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSection {
    pub id: String,
    pub name: String,
    pub total_episodes: usize,
    pub seasons: Vec<SeasonSection>,
}

/// Series of one group, sorted by series name then season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesGroupSection {
    pub id: String,
    pub name: String,
    pub series: Vec<SeriesSection>,
}

/// Machine-readable summary sidecar (`command.json`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_identified: usize,
    pub total_epg_matched: usize,
    pub total_movies: usize,
    pub total_series: usize,
    pub total_unmatched: usize,
    /// Comma-joined, sorted, lower-cased identifier prefixes
    pub channel_ids: String,
    pub optimization_command: String,
}

impl AnalysisSummary {
    /// Entry count shown on a section's navigation tab
    pub fn section_count(&self, kind: SectionKind) -> usize {
        match kind {
            SectionKind::Matched => self.total_epg_matched,
            SectionKind::Unmatched => self.total_identified - self.total_epg_matched,
            SectionKind::Movies => self.total_movies,
            SectionKind::Series => self.total_series,
            SectionKind::Other => self.total_unmatched,
        }
    }
}

/// Aggregated output of one analysis run, ready for emission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,
    pub matched: Vec<GroupSection>,
    pub unmatched: Vec<GroupSection>,
    pub movies: Vec<GroupSection>,
    pub series: Vec<SeriesGroupSection>,
    pub other: Vec<GroupSection>,
}

/// Document written for one flat section
#[derive(Debug, Serialize)]
pub struct SectionDocument<'a, G: Serialize> {
    pub section: SectionKind,
    pub title: &'static str,
    pub total: usize,
    pub groups: &'a [G],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTab {
    pub section: SectionKind,
    pub label: String,
    pub file: String,
    pub count: usize,
}

/// Landing document (`index.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub playlist_source: String,
    pub epg_source: String,
    pub default_section: SectionKind,
    pub default_file: String,
    pub tabs: Vec<NavTab>,
    pub summary: AnalysisSummary,
}

/// Caller-supplied facts about the run that appear in the landing document
#[derive(Debug, Clone)]
pub struct RunContext {
    pub generated_at: DateTime<Utc>,
    pub playlist_source: String,
    pub epg_source: String,
}
