use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content category for entries without a channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    Unmatched,
}

impl Default for MediaKind {
    fn default() -> Self {
        Self::Unmatched
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
            MediaKind::Unmatched => write!(f, "unmatched"),
        }
    }
}

/// One playlist record (EXTINF line + stream URL)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Entry {
    pub name: String,
    pub group: String,
    /// Raw `tvg-id` value, empty when absent
    pub channel_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub stream_url: String,
    /// 1-based line of the EXTINF line, for diagnostics
    pub source_line_number: usize,
}

impl Entry {
    /// True when the identifier is non-empty after trimming
    pub fn has_identifier(&self) -> bool {
        !self.channel_identifier.trim().is_empty()
    }
}

/// Group name -> entries in parse order
pub type GroupMap = BTreeMap<String, Vec<Entry>>;

/// Parser output, partitioned by identifier presence
#[derive(Debug, Clone, Default)]
pub struct ParsedPlaylist {
    pub identified: GroupMap,
    pub unidentified: GroupMap,
}

impl ParsedPlaylist {
    pub fn identified_count(&self) -> usize {
        self.identified.values().map(|v| v.len()).sum()
    }

    pub fn unidentified_count(&self) -> usize {
        self.unidentified.values().map(|v| v.len()).sum()
    }
}

/// Series/season/episode parsed from a title (or defaulted for URL-tagged series)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SeriesTag {
    pub series_name: String,
    pub season: u32,
    pub episode: u32,
}

/// Outcome of the heuristic chain for an unidentified entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Movie,
    Series(SeriesTag),
    Unmatched,
}

impl Classification {
    pub fn kind(&self) -> MediaKind {
        match self {
            Classification::Movie => MediaKind::Movie,
            Classification::Series(_) => MediaKind::Series,
            Classification::Unmatched => MediaKind::Unmatched,
        }
    }
}

/// Identified entry annotated with its EPG match status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedChannel {
    pub entry: Entry,
    pub has_epg: bool,
}

/// Unidentified entry annotated with its content classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedContent {
    pub entry: Entry,
    pub classification: Classification,
}

/// Full classified dataset for one run
#[derive(Debug, Clone, Default)]
pub struct ClassifiedPlaylist {
    pub channels: BTreeMap<String, Vec<ClassifiedChannel>>,
    pub content: BTreeMap<String, Vec<ClassifiedContent>>,
}

/// Episode reference within a season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesEpisode {
    pub entry: Entry,
    pub season: u32,
    pub episode: u32,
}

/// Series name -> season -> episodes sorted by episode number
pub type SeriesTree = BTreeMap<String, BTreeMap<u32, Vec<SeriesEpisode>>>;
