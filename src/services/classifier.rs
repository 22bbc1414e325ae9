use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::models::{
    Classification, ClassifiedChannel, ClassifiedContent, ClassifiedPlaylist, Entry,
    ParsedPlaylist, SeriesTag,
};
use crate::services::epg_index::EpgIndex;

lazy_static! {
    // ============ TITLE PATTERNS ============
    /// "<prefix>S<digits> E<digits>", anchored at the start of the title
    static ref SEASON_EPISODE_PATTERN: Regex = Regex::new(r"(?i)^(.*?)S(\d+)\s*E(\d+)").unwrap();
}

/// One step of the content classification chain
///
/// Returns `Some` to settle the classification, `None` to defer to the
/// next heuristic. Implementations must be pure.
pub trait Heuristic: Send + Sync {
    fn name(&self) -> &'static str;
    fn classify(&self, entry: &Entry) -> Option<Classification>;
}

/// Tags by the first path segment of the stream URL (`/movie/...`, `/series/...`)
pub struct UrlPathHeuristic;

impl Heuristic for UrlPathHeuristic {
    fn name(&self) -> &'static str {
        "url_path"
    }

    fn classify(&self, entry: &Entry) -> Option<Classification> {
        let segment = content_path_segment(&entry.stream_url)?;

        if segment.eq_ignore_ascii_case("movie") {
            return Some(Classification::Movie);
        }
        if segment.eq_ignore_ascii_case("series") {
            // Refined with the title when it carries season/episode numbers
            let tag = extract_series_info(&entry.name).unwrap_or_else(|| SeriesTag {
                series_name: entry.name.trim().to_string(),
                season: 0,
                episode: 0,
            });
            return Some(Classification::Series(tag));
        }

        None
    }
}

/// Tags series by a season/episode marker in the title
pub struct SeasonEpisodeHeuristic;

impl Heuristic for SeasonEpisodeHeuristic {
    fn name(&self) -> &'static str {
        "season_episode_title"
    }

    fn classify(&self, entry: &Entry) -> Option<Classification> {
        extract_series_info(&entry.name).map(Classification::Series)
    }
}

/// First path segment of an http(s) URL, only when another segment follows it
fn content_path_segment(stream_url: &str) -> Option<String> {
    let parsed = Url::parse(stream_url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let mut segments = parsed.path_segments()?;
    let first = segments.next()?;
    // "/movie" alone is not a content path, "/movie/..." is
    segments.next()?;

    if first.is_empty() {
        return None;
    }
    Some(first.to_string())
}

/// Extract series info from a title ("Show Name S02 E05 Finale")
pub fn extract_series_info(name: &str) -> Option<SeriesTag> {
    let caps = SEASON_EPISODE_PATTERN.captures(name)?;

    let season = saturating_number(caps.get(2)?.as_str());
    let episode = saturating_number(caps.get(3)?.as_str());

    Some(SeriesTag {
        series_name: caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        season,
        episode,
    })
}

/// Out-of-range numbers clamp to `u32::MAX` so a title match stays a match
fn saturating_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Content classifier: EPG matching for identified entries and an ordered
/// heuristic chain for the rest
pub struct ContentClassifier {
    heuristics: Vec<Box<dyn Heuristic>>,
}

impl Default for ContentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentClassifier {
    /// URL path first, then title pattern. Order matters: a URL tag wins.
    pub fn new() -> Self {
        Self {
            heuristics: Vec::new(),
        }
        .with_heuristic(Box::new(UrlPathHeuristic))
        .with_heuristic(Box::new(SeasonEpisodeHeuristic))
    }

    /// Append a heuristic after the existing ones
    pub fn with_heuristic(mut self, heuristic: Box<dyn Heuristic>) -> Self {
        self.heuristics.push(heuristic);
        self
    }

    /// Flag an identified entry by exact identifier membership
    pub fn classify_identified(entry: &Entry, index: &EpgIndex) -> ClassifiedChannel {
        ClassifiedChannel {
            has_epg: index.contains(&entry.channel_identifier),
            entry: entry.clone(),
        }
    }

    /// Run the heuristic chain; the first match wins, otherwise Unmatched
    pub fn classify_unidentified(&self, entry: &Entry) -> Classification {
        for heuristic in &self.heuristics {
            if let Some(classification) = heuristic.classify(entry) {
                tracing::trace!(
                    heuristic = heuristic.name(),
                    line = entry.source_line_number,
                    kind = %classification.kind(),
                    "Entry classified"
                );
                return classification;
            }
        }
        Classification::Unmatched
    }

    /// Classify a whole parsed playlist
    pub fn classify_playlist(&self, playlist: &ParsedPlaylist, index: &EpgIndex) -> ClassifiedPlaylist {
        let channels = playlist
            .identified
            .iter()
            .map(|(group, entries)| {
                let classified = entries
                    .iter()
                    .map(|entry| Self::classify_identified(entry, index))
                    .collect();
                (group.clone(), classified)
            })
            .collect();

        let content = playlist
            .unidentified
            .iter()
            .map(|(group, entries)| {
                let classified = entries
                    .iter()
                    .map(|entry| ClassifiedContent {
                        entry: entry.clone(),
                        classification: self.classify_unidentified(entry),
                    })
                    .collect();
                (group.clone(), classified)
            })
            .collect();

        ClassifiedPlaylist { channels, content }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    fn entry(name: &str, url: &str) -> Entry {
        Entry {
            name: name.to_string(),
            group: "VOD".to_string(),
            channel_identifier: String::new(),
            logo_url: None,
            stream_url: url.to_string(),
            source_line_number: 1,
        }
    }

    #[test]
    fn test_url_path_segment() {
        assert_eq!(
            content_path_segment("http://host:8080/movie/user/pass/1.mkv").as_deref(),
            Some("movie")
        );
        assert_eq!(content_path_segment("https://host/Series/").as_deref(), Some("Series"));
        assert_eq!(content_path_segment("http://host/movie"), None);
        assert_eq!(content_path_segment("rtmp://host/movie/x"), None);
        assert_eq!(content_path_segment("not a url"), None);
    }

    #[test]
    fn test_classify_movie_by_url() {
        let classifier = ContentClassifier::new();
        let e = entry("Matrix (1999)", "http://host/movie/u/p/1.mkv");
        assert_eq!(classifier.classify_unidentified(&e), Classification::Movie);
    }

    #[test]
    fn test_url_movie_wins_over_title() {
        let classifier = ContentClassifier::new();
        let e = entry("Harry Potter S01E02", "http://host/MOVIE/u/p/2.mkv");
        assert_eq!(classifier.classify_unidentified(&e), Classification::Movie);
    }

    #[test]
    fn test_url_series_refined_by_title() {
        let classifier = ContentClassifier::new();

        let e = entry("Breaking Bad S02E10", "http://host/series/u/p/10.mkv");
        assert_eq!(
            classifier.classify_unidentified(&e),
            Classification::Series(SeriesTag {
                series_name: "Breaking Bad".to_string(),
                season: 2,
                episode: 10,
            })
        );

        let e = entry("  Special Feature ", "http://host/series/u/p/11.mkv");
        assert_eq!(
            classifier.classify_unidentified(&e),
            Classification::Series(SeriesTag {
                series_name: "Special Feature".to_string(),
                season: 0,
                episode: 0,
            })
        );
    }

    #[test]
    fn test_extract_series_info() {
        let info = extract_series_info("Show Name S02 E05 Finale").unwrap();
        assert_eq!(info.series_name, "Show Name");
        assert_eq!(info.season, 2);
        assert_eq!(info.episode, 5);

        let info = extract_series_info("glass s1e3").unwrap();
        assert_eq!(info.series_name, "glass");
        assert_eq!(info.season, 1);
        assert_eq!(info.episode, 3);

        let info = extract_series_info("Show S1 E99999999999").unwrap();
        assert_eq!(info.season, 1);
        assert_eq!(info.episode, u32::MAX);

        assert!(extract_series_info("Flow (2024)").is_none());
        assert!(extract_series_info("Season Finale").is_none());
    }

    #[test]
    fn test_oversized_episode_number_is_still_series() {
        let classifier = ContentClassifier::new();
        let e = entry("Show S1 E99999999999", "http://host/vod/u/p/9.mkv");
        assert_eq!(classifier.classify_unidentified(&e).kind(), MediaKind::Series);
    }

    #[test]
    fn test_unmatched_fallthrough() {
        let classifier = ContentClassifier::new();
        let e = entry("Random Clip", "http://host/live/u/p/3.ts");
        assert_eq!(classifier.classify_unidentified(&e).kind(), MediaKind::Unmatched);
    }

    #[test]
    fn test_appended_heuristic_runs_last() {
        struct Everything;
        impl Heuristic for Everything {
            fn name(&self) -> &'static str {
                "everything"
            }
            fn classify(&self, _entry: &Entry) -> Option<Classification> {
                Some(Classification::Movie)
            }
        }

        let classifier = ContentClassifier::new().with_heuristic(Box::new(Everything));

        let series = entry("Show S01E01", "http://host/live/1.ts");
        assert_eq!(classifier.classify_unidentified(&series).kind(), MediaKind::Series);

        let other = entry("Clip", "http://host/live/2.ts");
        assert_eq!(classifier.classify_unidentified(&other), Classification::Movie);
    }

    #[test]
    fn test_classify_identified_exact_match() {
        let index: EpgIndex = vec!["cnn.us".to_string()].into_iter().collect();

        let mut e = entry("CNN", "http://host/live/cnn.ts");
        e.channel_identifier = "cnn.us".to_string();
        assert!(ContentClassifier::classify_identified(&e, &index).has_epg);

        e.channel_identifier = "CNN.us".to_string();
        assert!(!ContentClassifier::classify_identified(&e, &index).has_epg);
    }
}
