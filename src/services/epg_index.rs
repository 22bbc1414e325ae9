//! EPG channel index
//!
//! Streams an XMLTV document and collects the channel references of its
//! `programme` entries. Only well-formed markup is accepted: a document that
//! fails to parse aborts the run instead of producing a partial index.

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{AnalyzerError, Result};

/// Set of channel ids referenced by EPG schedule entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpgIndex {
    channels: HashSet<String>,
}

impl EpgIndex {
    /// Parse an XMLTV document into the channel id set
    ///
    /// Text is decoded per the BOM or XML declaration, UTF-8 otherwise.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut channels = HashSet::new();
        let mut programmes = 0usize;
        let mut depth = 0usize;
        let mut seen_root = false;

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|e| malformed(format!("XML error at byte {}: {}", position, e)))?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    if depth == 0 {
                        if seen_root {
                            return Err(malformed(format!(
                                "unexpected element after root at byte {}",
                                position
                            )));
                        }
                        seen_root = true;
                    }

                    let is_programme = e.name().local_name().as_ref() == b"programme";
                    let channel = check_attributes(e, reader.decoder())?;
                    if is_programme {
                        programmes += 1;
                        if let Some(channel) = channel.filter(|c| !c.is_empty()) {
                            channels.insert(channel);
                        }
                    }

                    if matches!(event, Event::Start(_)) {
                        depth += 1;
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        return Err(malformed(format!(
                            "unmatched closing tag at byte {}",
                            position
                        )));
                    }
                    depth -= 1;
                }
                Event::Text(_) | Event::CData(_) if depth == 0 => {
                    return Err(malformed(format!(
                        "text outside the root element at byte {}",
                        position
                    )));
                }
                Event::Text(ref e) => {
                    // Stray '&' and unknown entities
                    e.unescape()
                        .map_err(|err| malformed(format!("bad text at byte {}: {}", position, err)))?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(malformed("no root element".to_string()));
        }
        if depth > 0 {
            return Err(malformed(format!("{} unclosed element(s) at end of document", depth)));
        }

        debug!(programmes, "EPG programmes scanned");
        info!("Found {} unique channels in EPG", channels.len());

        Ok(Self { channels })
    }

    /// Exact, case-sensitive membership
    pub fn contains(&self, channel_id: &str) -> bool {
        self.channels.contains(channel_id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl FromIterator<String> for EpgIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            channels: iter.into_iter().filter(|c| !c.is_empty()).collect(),
        }
    }
}

fn malformed(reason: String) -> AnalyzerError {
    AnalyzerError::MalformedEpg(reason)
}

/// Validate every attribute of an element; returns its `channel` value
fn check_attributes(e: &BytesStart, decoder: Decoder) -> Result<Option<String>> {
    let mut channel = None;
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(format!("bad attribute: {}", err)))?;
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|err| malformed(format!("bad attribute value: {}", err)))?;
        if channel.is_none() && attr.key.local_name().as_ref() == b"channel" {
            channel = Some(value.into_owned());
        }
    }
    Ok(channel)
}
