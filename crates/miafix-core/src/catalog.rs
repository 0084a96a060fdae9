//! DAT (Logiqx XML) reading and writing.
//!
//! The document keeps the complete event stream it was read from, so
//! writing it back reproduces the input except for the `rom` tags that
//! received a marker. Top-level `game` elements and their `rom` children
//! are indexed by position in that stream.

use crate::config::CatalogConfig;
use crate::{MiaFixError, Result};
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::path::Path;

const GAME_TAG: &[u8] = b"game";
const ROM_TAG: &[u8] = b"rom";
const HEADER_TAG: &[u8] = b"header";
const VERSION_TAG: &[u8] = b"version";
const NAME_ATTR: &[u8] = b"name";
const MIA_ATTR: &str = "mia";
const MIA_VALUE: &str = "yes";

/// One `rom` record of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    /// Cue sheets index the other tracks and never get a marker.
    pub is_index: bool,
    event: usize,
}

/// One `game` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub records: Vec<FileRecord>,
}

/// A parsed DAT file.
#[derive(Debug, Clone)]
pub struct CatalogDocument {
    events: Vec<Event<'static>>,
    entries: Vec<CatalogEntry>,
    version: Option<String>,
}

fn xml_error(err: impl Display) -> MiaFixError {
    MiaFixError::Xml {
        message: err.to_string(),
        path: None,
    }
}

impl CatalogDocument {
    /// Read and parse a DAT from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| MiaFixError::io_with_path(e, path))?;
        Self::parse(&contents).map_err(|e| e.with_path(path))
    }

    /// Parse DAT contents.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
        let mut events = Vec::new();
        let mut entries: Vec<CatalogEntry> = Vec::new();
        let mut version: Option<String> = None;
        // Names of the currently open elements, root first.
        let mut open: Vec<Vec<u8>> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| {
                xml_error(format!("at byte {}: {}", reader.buffer_position(), e))
            })?;

            match &event {
                Event::Eof => break,
                Event::Start(start) | Event::Empty(start) => {
                    let name = start.name().as_ref().to_vec();
                    let in_game = open.len() == 2 && open[1] == GAME_TAG;

                    if open.len() == 1 && name == GAME_TAG {
                        entries.push(CatalogEntry {
                            title: attribute(start, NAME_ATTR)?.unwrap_or_default(),
                            records: Vec::new(),
                        });
                    } else if in_game && name == ROM_TAG {
                        let record_name = attribute(start, NAME_ATTR)?.unwrap_or_default();
                        if let Some(entry) = entries.last_mut() {
                            entry.records.push(FileRecord {
                                is_index: is_index_record(&record_name),
                                name: record_name,
                                event: events.len(),
                            });
                        }
                    }

                    if matches!(event, Event::Start(_)) {
                        open.push(name);
                    }
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Text(text) if in_header_version(&open) => {
                    let text = text.unescape().map_err(xml_error)?;
                    version.get_or_insert_with(String::new).push_str(&text);
                }
                _ => {}
            }

            events.push(event.into_owned());
        }

        if !open.is_empty() {
            return Err(xml_error("unexpected end of document"));
        }

        Ok(Self {
            events,
            entries,
            version: version
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// `header/version`, trimmed.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `game` entries in document order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Index of the first entry whose title satisfies `predicate`.
    pub fn find_entry(&self, mut predicate: impl FnMut(&str) -> bool) -> Option<usize> {
        self.entries.iter().position(|entry| predicate(&entry.title))
    }

    /// Set `mia="yes"` on every non-index record of an entry.
    ///
    /// Returns the number of records marked. Re-marking is a no-op.
    pub fn mark_entry(&mut self, entry_index: usize) -> Result<usize> {
        let targets: Vec<usize> = match self.entries.get(entry_index) {
            Some(entry) => entry
                .records
                .iter()
                .filter(|record| !record.is_index)
                .map(|record| record.event)
                .collect(),
            None => return Ok(0),
        };

        for &event_index in &targets {
            self.mark_record(event_index)?;
        }
        Ok(targets.len())
    }

    /// Whether a record currently carries `mia="yes"`.
    ///
    /// A record from another document that points past this one's end is
    /// reported as unmarked.
    pub fn is_marked(&self, record: &FileRecord) -> bool {
        match self.events.get(record.event) {
            Some(Event::Start(start)) | Some(Event::Empty(start)) => {
                matches!(attribute(start, MIA_ATTR.as_bytes()), Ok(Some(v)) if v == MIA_VALUE)
            }
            _ => false,
        }
    }

    fn mark_record(&mut self, event_index: usize) -> Result<()> {
        let replacement = match self.events.get(event_index) {
            Some(Event::Start(start)) => Event::Start(with_marker(start)?),
            Some(Event::Empty(start)) => Event::Empty(with_marker(start)?),
            _ => return Ok(()),
        };
        self.events[event_index] = replacement;
        Ok(())
    }

    /// Serialize back to XML, adding a declaration if the input had none.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        if !matches!(self.events.first(), Some(Event::Decl(_))) {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }
        for event in &self.events {
            writer.write_event(event.borrow())?;
        }
        Ok(writer.into_inner())
    }
}

fn in_header_version(open: &[Vec<u8>]) -> bool {
    open.len() == 3 && open[1] == HEADER_TAG && open[2] == VERSION_TAG
}

fn is_index_record(name: &str) -> bool {
    let ext = CatalogConfig::INDEX_RECORD_EXTENSION;
    name.len() >= ext.len()
        && name
            .get(name.len() - ext.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(ext))
}

/// Unescaped value of an attribute.
fn attribute(start: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Copy of a tag with `mia="yes"`, replacing an existing `mia` in place.
fn with_marker(start: &BytesStart<'_>) -> Result<BytesStart<'static>> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut marked = BytesStart::new(name);
    let mut replaced = false;

    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == MIA_ATTR.as_bytes() {
            marked.push_attribute((MIA_ATTR, MIA_VALUE));
            replaced = true;
        } else {
            marked.push_attribute(attr);
        }
    }
    if !replaced {
        marked.push_attribute((MIA_ATTR, MIA_VALUE));
    }
    Ok(marked)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAT: &str = r#"<?xml version="1.0"?>
<!DOCTYPE datafile PUBLIC "-//Logiqx//DTD ROM Management Datafile//EN" "http://www.logiqx.com/dats/datafile.dtd">
<datafile>
	<header>
		<name>Sony - PlayStation</name>
		<version>2023-06-01 12-00-00</version>
	</header>
	<game name="Game A (USA)">
		<category>Games</category>
		<description>Game A (USA)</description>
		<rom name="Game A (USA).cue" size="100" crc="00000000"/>
		<rom name="Game A (USA) (Track 1).bin" size="200" crc="11111111"/>
		<rom name="Game A (USA) (Track 2).bin" size="300" crc="22222222"/>
	</game>
	<game name="Tom &amp; Jerry (Europe)">
		<rom name="Tom &amp; Jerry (Europe).bin" size="400" crc="33333333"/>
	</game>
</datafile>
"#;

    #[test]
    fn test_parse_entries_and_version() {
        let doc = CatalogDocument::parse(DAT).unwrap();
        assert_eq!(doc.version(), Some("2023-06-01 12-00-00"));
        assert_eq!(doc.entries().len(), 2);

        let game_a = &doc.entries()[0];
        assert_eq!(game_a.title, "Game A (USA)");
        assert_eq!(game_a.records.len(), 3);
        assert!(game_a.records[0].is_index);
        assert!(!game_a.records[1].is_index);

        assert_eq!(doc.entries()[1].title, "Tom & Jerry (Europe)");
    }

    #[test]
    fn test_mark_entry_skips_cue_sheets() {
        let mut doc = CatalogDocument::parse(DAT).unwrap();
        let index = doc.find_entry(|title| title == "Game A (USA)").unwrap();
        assert_eq!(doc.mark_entry(index).unwrap(), 2);

        let records = doc.entries()[index].records.clone();
        assert!(!doc.is_marked(&records[0]));
        assert!(doc.is_marked(&records[1]));
        assert!(doc.is_marked(&records[2]));
    }

    #[test]
    fn test_unmodified_document_round_trips() {
        let doc = CatalogDocument::parse(DAT).unwrap();
        let output = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert_eq!(output, DAT);
    }

    #[test]
    fn test_marked_output_only_touches_roms() {
        let mut doc = CatalogDocument::parse(DAT).unwrap();
        let index = doc.find_entry(|title| title == "Tom & Jerry (Europe)").unwrap();
        doc.mark_entry(index).unwrap();

        let output = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert!(output.contains(
            r#"<rom name="Tom &amp; Jerry (Europe).bin" size="400" crc="33333333" mia="yes"/>"#
        ));
        assert_eq!(output.matches("mia=").count(), 1);
        assert!(output.contains("<!DOCTYPE datafile"));
    }

    #[test]
    fn test_existing_marker_is_replaced_in_place() {
        let xml = r#"<datafile><game name="G"><rom name="g.bin" mia="no" size="1"/></game></datafile>"#;
        let mut doc = CatalogDocument::parse(xml).unwrap();
        doc.mark_entry(0).unwrap();
        let output = String::from_utf8(doc.to_bytes().unwrap()).unwrap();
        assert!(output.contains(r#"<rom name="g.bin" mia="yes" size="1"/>"#));
        assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
    }

    #[test]
    fn test_missing_version_is_none() {
        let doc = CatalogDocument::parse("<datafile><header></header></datafile>").unwrap();
        assert!(doc.version().is_none());
    }

    #[test]
    fn test_truncated_document_is_an_error() {
        let err = CatalogDocument::parse("<datafile><game name=\"G\">").unwrap_err();
        assert!(matches!(err, MiaFixError::Xml { .. }));
    }

    #[test]
    fn test_record_from_other_document_is_unmarked() {
        let big = CatalogDocument::parse(DAT).unwrap();
        let last = big.entries()[1].records[0].clone();

        let small =
            CatalogDocument::parse(r#"<datafile><game name="G"><rom name="g.bin"/></game></datafile>"#)
                .unwrap();
        assert!(!small.is_marked(&last));
    }

    #[test]
    fn test_index_record_detection() {
        assert!(is_index_record("a.cue"));
        assert!(is_index_record("a.CUE"));
        assert!(!is_index_record("a.bin"));
        assert!(!is_index_record("cue"));
    }
}
