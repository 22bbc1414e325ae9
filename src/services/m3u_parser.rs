use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Entry, ParsedPlaylist};

const EXTINF_PREFIX: &str = "#EXTINF:";
const UTF8_BOM: char = '\u{feff}';

lazy_static! {
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// Parsed EXTINF line data
#[derive(Debug)]
struct ExtinfData {
    line_number: usize,
    group: String,
    tvg_id: String,
    logo: Option<String>,
    title: String,
}

/// Counters collected during a parse, logged once at the end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub extinf_lines: usize,
    pub entries: usize,
    /// EXTINF lines without group-title or display name
    pub skipped_extinf: usize,
    /// Valid EXTINF lines never completed by a URL line
    pub discarded_pending: usize,
}

/// Extract the first `key="value"` occurrence from an EXTINF header
///
/// Used for every attribute so missing and empty values are handled alike.
pub fn extract_attribute<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    ATTR_REGEX
        .captures_iter(header)
        .find(|caps| &caps[1] == key)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Split the EXTINF content at its last comma outside a quoted value
/// Returns (header, title)
fn split_title(content: &str) -> Option<(&str, &str)> {
    let mut in_quotes = false;
    let mut last_comma = None;

    for (idx, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => last_comma = Some(idx),
            _ => {}
        }
    }

    let idx = last_comma?;
    Some((&content[..idx], &content[idx + 1..]))
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-id="..." tvg-logo="..." group-title="...",Title
///
/// Returns None when group-title or the display name is missing.
fn parse_extinf(line: &str, line_number: usize) -> Option<ExtinfData> {
    let content = line.strip_prefix(EXTINF_PREFIX)?;
    let (header, title) = split_title(content)?;

    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    let group = extract_attribute(header, "group-title").filter(|g| !g.is_empty())?;
    let tvg_id = extract_attribute(header, "tvg-id").unwrap_or_default();
    let logo = extract_attribute(header, "tvg-logo")
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.to_string());

    Some(ExtinfData {
        line_number,
        group: group.to_string(),
        tvg_id: tvg_id.to_string(),
        logo,
        title: title.to_string(),
    })
}

/// Parse playlist text into identified / unidentified groups
pub fn parse_playlist(content: &str) -> ParsedPlaylist {
    let (playlist, stats) = parse_playlist_with_stats(content);

    tracing::info!(
        entries = stats.entries,
        identified = playlist.identified_count(),
        unidentified = playlist.unidentified_count(),
        skipped_extinf = stats.skipped_extinf,
        discarded = stats.discarded_pending,
        "Playlist parsed"
    );
    tracing::info!(
        "Found {} groups with tvg-id, {} groups without tvg-id",
        playlist.identified.len(),
        playlist.unidentified.len()
    );

    playlist
}

/// Single forward scan; a pending EXTINF is completed by the next URL line
pub fn parse_playlist_with_stats(content: &str) -> (ParsedPlaylist, ParseStats) {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut playlist = ParsedPlaylist::default();
    let mut stats = ParseStats::default();
    let mut pending: Option<ExtinfData> = None;

    for (idx, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();

        if line.starts_with(EXTINF_PREFIX) {
            stats.extinf_lines += 1;

            if let Some(previous) = pending.take() {
                tracing::debug!(line = previous.line_number, "EXTINF without URL discarded");
                stats.discarded_pending += 1;
            }

            pending = parse_extinf(line, idx + 1);
            if pending.is_none() {
                tracing::debug!(line = idx + 1, "EXTINF missing group-title or name, skipped");
                stats.skipped_extinf += 1;
            }
            continue;
        }

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // URL line
        let Some(extinf) = pending.take() else {
            continue;
        };

        let entry = Entry {
            name: extinf.title,
            group: extinf.group,
            channel_identifier: extinf.tvg_id,
            logo_url: extinf.logo,
            stream_url: line.to_string(),
            source_line_number: extinf.line_number,
        };
        stats.entries += 1;

        let target = if entry.has_identifier() {
            &mut playlist.identified
        } else {
            &mut playlist.unidentified
        };
        target.entry(entry.group.clone()).or_default().push(entry);
    }

    if let Some(last) = pending {
        tracing::debug!(line = last.line_number, "EXTINF at end of input discarded");
        stats.discarded_pending += 1;
    }

    (playlist, stats)
}
