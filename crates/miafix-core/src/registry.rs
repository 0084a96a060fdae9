//! Index of the systems listed on the MIA Lists landing page.
//!
//! The landing page has two sections, one for systems with MIA discs and
//! one for systems without. Both feed one mapping keyed by the display name
//! exactly as published. A system may be listed without a link to a detail
//! page, which is tracked separately from a link that later fails to load.

use crate::config::RegistryConfig;
use crate::{MiaFixError, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Which landing-page section a system is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryCategory {
    HasMiaDiscs,
    NoReportedMias,
}

impl RegistryCategory {
    fn section_id(&self) -> &'static str {
        match self {
            RegistryCategory::HasMiaDiscs => RegistryConfig::SECTION_WITH_MIAS,
            RegistryCategory::NoReportedMias => RegistryConfig::SECTION_NO_MIAS,
        }
    }
}

/// One system row from the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub system_name: String,
    pub category: RegistryCategory,
    /// Link to the system's MIA list, as published (usually site-relative).
    pub link: Option<String>,
}

/// Mapping from canonical system name to its registry entry.
#[derive(Debug, Clone, Default)]
pub struct RegistryIndex {
    entries: HashMap<String, RegistryEntry>,
}

impl RegistryIndex {
    /// Build an index from already-known entries. Later entries win.
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let mut index = Self::default();
        for entry in entries {
            index.insert(entry);
        }
        index
    }

    /// Parse the MIA Lists landing page.
    ///
    /// Fails only when neither section can be found, which means the page
    /// layout changed and nothing can be matched.
    pub fn from_landing_page(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let mut index = Self::default();
        let mut sections_found = 0;

        for category in [RegistryCategory::HasMiaDiscs, RegistryCategory::NoReportedMias] {
            let Some(list) = section_list(&document, category.section_id())? else {
                debug!(section = category.section_id(), "Section not found on landing page");
                continue;
            };
            sections_found += 1;

            for item in list.select(&LIST_ITEM) {
                let system_name = item.text().collect::<String>().trim().to_string();
                if system_name.is_empty() {
                    continue;
                }
                let link = item
                    .select(&ANCHOR)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(str::to_string);
                index.insert(RegistryEntry {
                    system_name,
                    category,
                    link,
                });
            }
        }

        if sections_found == 0 {
            return Err(MiaFixError::Html {
                message: format!(
                    "landing page has neither '{}' nor '{}' section",
                    RegistryConfig::SECTION_WITH_MIAS,
                    RegistryConfig::SECTION_NO_MIAS
                ),
            });
        }

        Ok(index)
    }

    fn insert(&mut self, entry: RegistryEntry) {
        self.entries.insert(entry.system_name.clone(), entry);
    }

    /// Look up a system by its canonical name. Case-sensitive.
    pub fn lookup(&self, system_name: &str) -> Option<&RegistryEntry> {
        self.entries.get(system_name)
    }

    /// Number of systems across both sections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no system was listed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by system name, for logging.
    pub fn sorted_entries(&self) -> Vec<&RegistryEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| a.system_name.cmp(&b.system_name));
        entries
    }
}

/// The list element that follows the heading holding `section_id`.
fn section_list<'a>(document: &'a Html, section_id: &str) -> Result<Option<ElementRef<'a>>> {
    let selector =
        Selector::parse(&format!("[id=\"{}\"]", section_id)).map_err(|e| MiaFixError::Html {
            message: format!("invalid section selector for {}: {}", section_id, e),
        })?;

    let Some(anchor) = document.select(&selector).next() else {
        return Ok(None);
    };
    let Some(heading) = anchor.parent() else {
        return Ok(None);
    };

    Ok(heading.next_siblings().find_map(ElementRef::wrap))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDING: &str = r#"
<html><body>
<h2><span class="mw-headline" id="Systems_with_MIAs">Systems with MIAs</span></h2>
<ul>
  <li><a href="/index.php?title=Sony_-_PlayStation_-_MIA">Sony - PlayStation</a></li>
  <li><a href="/index.php?title=Sega_-_Saturn_-_MIA">Sega - Saturn</a> </li>
</ul>
<h2><span class="mw-headline" id="Systems_with_no_reported_MIAs">Systems with no reported MIAs</span></h2>
<ul>
  <li>Bandai - Playdia</li>
  <li><a href="/index.php?title=Apple_-_Macintosh_-_MIA">Apple - Macintosh</a></li>
</ul>
</body></html>
"#;

    #[test]
    fn test_parse_both_sections() {
        let index = RegistryIndex::from_landing_page(LANDING).unwrap();
        assert_eq!(index.len(), 4);

        let psx = index.lookup("Sony - PlayStation").unwrap();
        assert_eq!(psx.category, RegistryCategory::HasMiaDiscs);
        assert_eq!(
            psx.link.as_deref(),
            Some("/index.php?title=Sony_-_PlayStation_-_MIA")
        );

        let saturn = index.lookup("Sega - Saturn").unwrap();
        assert_eq!(saturn.system_name, "Sega - Saturn");
    }

    #[test]
    fn test_unlinked_system_has_no_link() {
        let index = RegistryIndex::from_landing_page(LANDING).unwrap();
        let playdia = index.lookup("Bandai - Playdia").unwrap();
        assert_eq!(playdia.category, RegistryCategory::NoReportedMias);
        assert!(playdia.link.is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let index = RegistryIndex::from_landing_page(LANDING).unwrap();
        assert!(index.lookup("sony - playstation").is_none());
        assert!(index.lookup("Nintendo - Wii").is_none());
    }

    #[test]
    fn test_page_without_sections_is_an_error() {
        let err = RegistryIndex::from_landing_page("<html><body><p>moved</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, MiaFixError::Html { .. }));
    }

    #[test]
    fn test_from_entries_later_wins() {
        let index = RegistryIndex::from_entries([
            RegistryEntry {
                system_name: "X".into(),
                category: RegistryCategory::HasMiaDiscs,
                link: Some("/a".into()),
            },
            RegistryEntry {
                system_name: "X".into(),
                category: RegistryCategory::NoReportedMias,
                link: None,
            },
        ]);
        assert_eq!(index.len(), 1);
        assert!(index.lookup("X").unwrap().link.is_none());
    }
}
