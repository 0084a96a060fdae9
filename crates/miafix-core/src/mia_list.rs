//! Parsing of a system's MIA list page.
//!
//! Pages come in two layouts: a `<pre>` block with one title per line, or
//! a wiki table with a "Title" column. The DAT version the list was built
//! against is read separately from either layout.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::warn;

static PRE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre").unwrap());
static TABLE_HEADER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TABLE_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

static VERSION_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)dat version").unwrap());
static TITLE_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)title").unwrap());

/// Which layout the disc titles were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListLayout {
    Preformatted,
    Table,
    /// Neither layout present: the system has no MIA discs listed.
    Empty,
}

/// Parsed content of one MIA list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MiaList {
    /// Disc titles in published order.
    pub titles: Vec<String>,
    /// Full "Dat version" text, e.g. `Sony - PlayStation (2023-06-01 12-00-00)`.
    pub version: Option<String>,
    /// Parenthesized tail of `version`.
    pub timestamp: Option<String>,
    pub layout: ListLayout,
}

impl MiaList {
    /// Parse a fetched MIA list page.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let version = find_version(&document);
        let timestamp = version.as_deref().map(version_timestamp);

        let (layout, titles) = if let Some(pre) = document.select(&PRE).next() {
            (ListLayout::Preformatted, preformatted_titles(pre))
        } else if document.select(&TABLE_ROW).next().is_some() {
            (ListLayout::Table, table_titles(&document))
        } else {
            (ListLayout::Empty, Vec::new())
        };

        Self {
            titles,
            version,
            timestamp,
            layout,
        }
    }

    /// Whether the page lists no discs.
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Number of listed discs.
    pub fn len(&self) -> usize {
        self.titles.len()
    }
}

/// Trimmed text of the first non-blank text node after the "dat version" label.
fn find_version(document: &Html) -> Option<String> {
    let mut texts = document
        .root_element()
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| &**text));

    texts.by_ref().find(|text| VERSION_LABEL.is_match(text))?;
    texts
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// `Sony - PlayStation (2023-06-01 12-00-00)` -> `2023-06-01 12-00-00`.
///
/// A version without parentheses is its own timestamp.
pub fn version_timestamp(version: &str) -> String {
    let tail = version.rsplit('(').next().unwrap_or(version);
    tail.trim_end_matches(')').to_string()
}

fn preformatted_titles(pre: ElementRef<'_>) -> Vec<String> {
    let text = pre.text().collect::<String>();
    text.trim_end()
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// First cell of every row after the row holding the "Title" header.
fn table_titles(document: &Html) -> Vec<String> {
    let Some(header) = document
        .select(&TABLE_HEADER)
        .find(|th| TITLE_HEADER.is_match(&th.text().collect::<String>()))
    else {
        warn!("MIA list table has no Title column");
        return Vec::new();
    };

    let Some(header_row) = header.parent().and_then(ElementRef::wrap) else {
        return Vec::new();
    };
    let Some(table) = header
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
    else {
        return Vec::new();
    };

    table
        .select(&TABLE_ROW)
        .skip_while(|row| row.id() != header_row.id())
        .skip(1)
        .filter_map(|row| row.select(&TABLE_CELL).next())
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}
