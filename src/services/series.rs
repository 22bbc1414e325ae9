use crate::models::{Entry, SeriesEpisode, SeriesTag, SeriesTree};

/// Group series episodes by series name and season
///
/// Names are compared exactly after trimming. Episodes within a season are
/// stable-sorted by episode number, so equal numbers keep their input order.
pub fn organize_series<'a, I>(episodes: I) -> SeriesTree
where
    I: IntoIterator<Item = (&'a Entry, &'a SeriesTag)>,
{
    let mut tree = SeriesTree::new();

    for (entry, tag) in episodes {
        tree.entry(tag.series_name.trim().to_string())
            .or_default()
            .entry(tag.season)
            .or_default()
            .push(SeriesEpisode {
                entry: entry.clone(),
                season: tag.season,
                episode: tag.episode,
            });
    }

    // Sort episodes within each season
    for seasons in tree.values_mut() {
        for season in seasons.values_mut() {
            season.sort_by_key(|ep| ep.episode);
        }
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(name: &str, line: usize) -> Entry {
        Entry {
            name: name.to_string(),
            group: "Series".to_string(),
            channel_identifier: String::new(),
            logo_url: None,
            stream_url: format!("http://host/series/{}.mkv", line),
            source_line_number: line,
        }
    }

    fn tag(series: &str, season: u32, episode: u32) -> SeriesTag {
        SeriesTag {
            series_name: series.to_string(),
            season,
            episode,
        }
    }

    #[test]
    fn test_organize_nested_and_sorted() {
        let items = vec![
            (episode("Lost S01E03", 1), tag("Lost", 1, 3)),
            (episode("Lost S02E01", 2), tag("Lost", 2, 1)),
            (episode("Lost S01E01", 3), tag("Lost ", 1, 1)),
            (episode("Dark S01E01", 4), tag("Dark", 1, 1)),
        ];

        let tree = organize_series(items.iter().map(|(e, t)| (e, t)));

        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["Dark", "Lost"]);
        let lost = &tree["Lost"];
        assert_eq!(lost.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        let season_one: Vec<u32> = lost[&1].iter().map(|ep| ep.episode).collect();
        assert_eq!(season_one, vec![1, 3]);
    }

    #[test]
    fn test_equal_episode_numbers_keep_input_order() {
        let items = vec![
            (episode("Show S01E02 (alt)", 1), tag("Show", 1, 2)),
            (episode("Show S01E01", 2), tag("Show", 1, 1)),
            (episode("Show S01E02", 3), tag("Show", 1, 2)),
        ];

        let tree = organize_series(items.iter().map(|(e, t)| (e, t)));
        let lines: Vec<usize> = tree["Show"][&1]
            .iter()
            .map(|ep| ep.entry.source_line_number)
            .collect();

        assert_eq!(lines, vec![2, 1, 3]);
    }

    #[test]
    fn test_names_differing_in_case_stay_apart() {
        let items = vec![
            (episode("show S01E01", 1), tag("show", 1, 1)),
            (episode("Show S01E01", 2), tag("Show", 1, 1)),
        ];

        let tree = organize_series(items.iter().map(|(e, t)| (e, t)));
        assert_eq!(tree.len(), 2);
    }
}
