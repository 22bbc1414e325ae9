use sha1::{Digest, Sha1};
use std::collections::BTreeSet;

use crate::models::{
    AnalysisReport, AnalysisSummary, Classification, ClassifiedChannel, ClassifiedContent,
    ClassifiedPlaylist, EntryRecord, GroupSection, MediaKind, SeasonSection, SeriesGroupSection,
    SeriesSection,
};
use crate::services::series::organize_series;

/// Editor script invoked by the optimization command
pub const DEFAULT_EDITOR_SCRIPT: &str = "./m3u-epg-editor-py3.py";

/// Positional template of the downstream optimization command
///
/// The output shape is consumed by a separate tool and must not change:
/// `{editor} -m="{playlist}" -e="{epg}" -g="'{ids}'" -d="{dir}" -gm="keep" -r=12`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub editor_script: String,
    pub playlist_url: String,
    pub epg_url: String,
    pub optimized_dir: String,
}

impl CommandTemplate {
    pub fn render(&self, channel_ids: &str) -> String {
        format!(
            "{} -m=\"{}\" -e=\"{}\" -g=\"'{}'\" -d=\"{}\" -gm=\"keep\" -r=12",
            self.editor_script, self.playlist_url, self.epg_url, channel_ids, self.optimized_dir
        )
    }
}

/// Generate SHA1 hash of a key for navigation anchors
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Sorted, deduplicated, lower-cased identifier prefixes (before the first '.')
pub fn matched_channel_ids<'a, I>(identifiers: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let ids: BTreeSet<String> = identifiers
        .into_iter()
        .map(|id| id.split('.').next().unwrap_or_default().to_lowercase())
        .collect();

    ids.into_iter().collect::<Vec<_>>().join(",")
}

fn sorted_group(name: &str, mut entries: Vec<EntryRecord>) -> GroupSection {
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    GroupSection {
        id: format!("group_{}", hash_key(name)),
        name: name.to_string(),
        entries,
    }
}

fn channel_sections<'a, I>(groups: I, has_epg: bool) -> Vec<GroupSection>
where
    I: IntoIterator<Item = (&'a String, &'a Vec<ClassifiedChannel>)>,
{
    groups
        .into_iter()
        .filter_map(|(name, channels)| {
            let records: Vec<EntryRecord> = channels
                .iter()
                .filter(|c| c.has_epg == has_epg)
                .map(|c| EntryRecord {
                    has_epg: Some(c.has_epg),
                    ..EntryRecord::from_entry(&c.entry)
                })
                .collect();

            if records.is_empty() {
                None
            } else {
                Some(sorted_group(name, records))
            }
        })
        .collect()
}

fn content_sections<'a, I>(groups: I, kind: MediaKind) -> Vec<GroupSection>
where
    I: IntoIterator<Item = (&'a String, &'a Vec<ClassifiedContent>)>,
{
    groups
        .into_iter()
        .filter_map(|(name, items)| {
            let records: Vec<EntryRecord> = items
                .iter()
                .filter(|c| c.classification.kind() == kind)
                .map(|c| EntryRecord::from_entry(&c.entry))
                .collect();

            if records.is_empty() {
                None
            } else {
                Some(sorted_group(name, records))
            }
        })
        .collect()
}

fn series_group_section(group: &str, items: &[ClassifiedContent]) -> Option<SeriesGroupSection> {
    let tree = organize_series(items.iter().filter_map(|c| match &c.classification {
        Classification::Series(tag) => Some((&c.entry, tag)),
        _ => None,
    }));

    if tree.is_empty() {
        return None;
    }

    let series = tree
        .into_iter()
        .map(|(series_name, seasons)| {
            let seasons: Vec<SeasonSection> = seasons
                .into_iter()
                .map(|(season, episodes)| SeasonSection {
                    season,
                    episodes: episodes
                        .iter()
                        .map(|ep| EntryRecord {
                            series_name: Some(series_name.clone()),
                            season: Some(ep.season),
                            episode: Some(ep.episode),
                            ..EntryRecord::from_entry(&ep.entry)
                        })
                        .collect(),
                })
                .collect();

            SeriesSection {
                id: format!("series_{}", hash_key(&format!("{}/{}", group, series_name))),
                total_episodes: seasons.iter().map(|s| s.episodes.len()).sum(),
                name: series_name,
                seasons,
            }
        })
        .collect();

    Some(SeriesGroupSection {
        id: format!("group_{}", hash_key(group)),
        name: group.to_string(),
        series,
    })
}

/// Build the summary and the sorted, grouped section lists
pub fn aggregate(classified: &ClassifiedPlaylist, template: &CommandTemplate) -> AnalysisReport {
    let all_channels = || classified.channels.values().flatten();
    let all_content = || classified.content.values().flatten();
    let count_kind = |kind: MediaKind| {
        all_content()
            .filter(|c| c.classification.kind() == kind)
            .count()
    };

    let channel_ids = matched_channel_ids(
        all_channels()
            .filter(|c| c.has_epg)
            .map(|c| c.entry.channel_identifier.as_str()),
    );
    let optimization_command = template.render(&channel_ids);

    let summary = AnalysisSummary {
        total_identified: all_channels().count(),
        total_epg_matched: all_channels().filter(|c| c.has_epg).count(),
        total_movies: count_kind(MediaKind::Movie),
        total_series: count_kind(MediaKind::Series),
        total_unmatched: count_kind(MediaKind::Unmatched),
        channel_ids,
        optimization_command,
    };

    tracing::info!(
        identified = summary.total_identified,
        epg_matched = summary.total_epg_matched,
        movies = summary.total_movies,
        series = summary.total_series,
        unmatched = summary.total_unmatched,
        "Analysis aggregated"
    );

    AnalysisReport {
        matched: channel_sections(&classified.channels, true),
        unmatched: channel_sections(&classified.channels, false),
        movies: content_sections(&classified.content, MediaKind::Movie),
        series: classified
            .content
            .iter()
            .filter_map(|(group, items)| series_group_section(group, items))
            .collect(),
        other: content_sections(&classified.content, MediaKind::Unmatched),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, SeriesTag};
    use std::collections::BTreeMap;

    fn template() -> CommandTemplate {
        CommandTemplate {
            editor_script: DEFAULT_EDITOR_SCRIPT.to_string(),
            playlist_url: "http://example.com/tv.m3u".to_string(),
            epg_url: "http://example.com/epg.xml".to_string(),
            optimized_dir: "/data/optimized".to_string(),
        }
    }

    fn entry(name: &str, group: &str, id: &str) -> Entry {
        Entry {
            name: name.to_string(),
            group: group.to_string(),
            channel_identifier: id.to_string(),
            logo_url: None,
            stream_url: format!("http://host/{}", name),
            source_line_number: 1,
        }
    }

    fn channel(name: &str, group: &str, id: &str, has_epg: bool) -> ClassifiedChannel {
        ClassifiedChannel {
            entry: entry(name, group, id),
            has_epg,
        }
    }

    fn content(name: &str, group: &str, classification: Classification) -> ClassifiedContent {
        ClassifiedContent {
            entry: entry(name, group, ""),
            classification,
        }
    }

    #[test]
    fn test_command_template_shape() {
        let command = template().render("bbc,cnn");
        assert_eq!(
            command,
            "./m3u-epg-editor-py3.py -m=\"http://example.com/tv.m3u\" -e=\"http://example.com/epg.xml\" -g=\"'bbc,cnn'\" -d=\"/data/optimized\" -gm=\"keep\" -r=12"
        );
    }

    #[test]
    fn test_matched_channel_ids() {
        let ids = matched_channel_ids(vec!["CNN.us", "bbc.uk", "cnn.uk", "Sky"]);
        assert_eq!(ids, "bbc,cnn,sky");
        assert_eq!(matched_channel_ids(Vec::<&str>::new()), "");
    }

    #[test]
    fn test_hash_key() {
        let hash = hash_key("News");
        assert_eq!(hash.len(), 40);
        assert_eq!(hash, hash_key("News"));
        assert_ne!(hash, hash_key("news"));
    }

    #[test]
    fn test_aggregate_sections_and_totals() {
        let mut channels = BTreeMap::new();
        channels.insert(
            "News".to_string(),
            vec![
                channel("Sky News", "News", "sky.uk", true),
                channel("CNN", "News", "cnn.us", true),
                channel("Local", "News", "local.tv", false),
            ],
        );
        channels.insert(
            "Cartoons".to_string(),
            vec![channel("Toons", "Cartoons", "toons.us", false)],
        );

        let mut content_groups = BTreeMap::new();
        content_groups.insert(
            "VOD".to_string(),
            vec![
                content("Zulu", "VOD", Classification::Movie),
                content("Alien", "VOD", Classification::Movie),
                content(
                    "Lost S01E02",
                    "VOD",
                    Classification::Series(SeriesTag {
                        series_name: "Lost".to_string(),
                        season: 1,
                        episode: 2,
                    }),
                ),
                content("Clip", "VOD", Classification::Unmatched),
            ],
        );

        let classified = ClassifiedPlaylist {
            channels,
            content: content_groups,
        };
        let report = aggregate(&classified, &template());

        assert_eq!(report.summary.total_identified, 4);
        assert_eq!(report.summary.total_epg_matched, 2);
        assert_eq!(report.summary.total_movies, 2);
        assert_eq!(report.summary.total_series, 1);
        assert_eq!(report.summary.total_unmatched, 1);
        assert_eq!(report.summary.channel_ids, "cnn,sky");
        assert!(report.summary.optimization_command.contains("-g=\"'cnn,sky'\""));

        assert_eq!(report.matched.len(), 1);
        let matched: Vec<_> = report.matched[0].entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(matched, vec!["CNN", "Sky News"]);
        assert!(report.matched[0].entries.iter().all(|e| e.has_epg == Some(true)));

        let unmatched_groups: Vec<_> = report.unmatched.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(unmatched_groups, vec!["Cartoons", "News"]);

        let movies: Vec<_> = report.movies[0].entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(movies, vec!["Alien", "Zulu"]);
        assert!(report.movies[0].entries[0].has_epg.is_none());

        let lost = &report.series[0].series[0];
        assert_eq!(lost.name, "Lost");
        assert_eq!(lost.total_episodes, 1);
        assert_eq!(lost.seasons[0].episodes[0].episode, Some(2));
        assert_eq!(lost.seasons[0].episodes[0].series_name.as_deref(), Some("Lost"));

        assert_eq!(report.other[0].entries[0].name, "Clip");
    }

    #[test]
    fn test_empty_groups_are_omitted() {
        let mut content_groups = BTreeMap::new();
        content_groups.insert(
            "Movies".to_string(),
            vec![content("Alien", "Movies", Classification::Movie)],
        );
        let classified = ClassifiedPlaylist {
            channels: BTreeMap::new(),
            content: content_groups,
        };

        let report = aggregate(&classified, &template());
        assert!(report.series.is_empty());
        assert!(report.other.is_empty());
        assert!(report.matched.is_empty());
        assert_eq!(report.summary.channel_ids, "");
    }
}
