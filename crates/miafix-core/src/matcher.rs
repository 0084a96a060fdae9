//! Matching MIA titles against DAT entries and applying the marker.

use crate::catalog::CatalogDocument;
use crate::mia_list::MiaList;
use crate::version::{UnmatchedCause, VersionComparison};
use crate::Result;
use serde::Serialize;
use tracing::debug;

/// Decides whether a MIA list title names a DAT entry.
pub trait TitleMatcher: Send + Sync {
    fn matches(&self, disc_title: &str, entry_title: &str) -> bool;
}

/// Byte-for-byte title equality. No case folding or normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactTitleMatch;

impl TitleMatcher for ExactTitleMatch {
    fn matches(&self, disc_title: &str, entry_title: &str) -> bool {
        disc_title == entry_title
    }
}

/// What happened to one listed disc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DiscOutcome {
    Marked {
        title: String,
        records_marked: usize,
    },
    Unmatched {
        title: String,
        cause: UnmatchedCause,
    },
}

impl DiscOutcome {
    /// The title as published on the MIA list.
    pub fn title(&self) -> &str {
        match self {
            DiscOutcome::Marked { title, .. } | DiscOutcome::Unmatched { title, .. } => title,
        }
    }

    /// Whether the disc was found in the DAT.
    pub fn is_marked(&self) -> bool {
        matches!(self, DiscOutcome::Marked { .. })
    }
}

/// Result of applying one MIA list to one DAT.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub updated: usize,
    pub total: usize,
    pub discs: Vec<DiscOutcome>,
}

impl MatchReport {
    /// Listed discs not found in the DAT.
    pub fn unmatched(&self) -> usize {
        self.total - self.updated
    }
}

/// Mark every listed disc found in `document`, in list order.
///
/// `comparison` only feeds the cause attributed to unmatched discs.
pub fn apply(
    document: &mut CatalogDocument,
    list: &MiaList,
    matcher: &dyn TitleMatcher,
    comparison: VersionComparison,
) -> Result<MatchReport> {
    let mut report = MatchReport::default();

    for title in &list.titles {
        report.total += 1;

        let outcome = match document.find_entry(|entry| matcher.matches(title, entry)) {
            Some(index) => {
                let records_marked = document.mark_entry(index)?;
                report.updated += 1;
                debug!("    {}", title);
                DiscOutcome::Marked {
                    title: title.clone(),
                    records_marked,
                }
            }
            None => {
                let cause = comparison.unmatched_cause();
                debug!(
                    "    {}    ***Disc could not be found in inputted DAT.{}***",
                    title,
                    cause.hint()
                );
                DiscOutcome::Unmatched {
                    title: title.clone(),
                    cause,
                }
            }
        };
        report.discs.push(outcome);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mia_list::ListLayout;

    const DAT: &str = r#"<datafile>
<header><version>2020-01-01</version></header>
<game name="Game A"><rom name="Game A.cue"/><rom name="Game A.bin"/></game>
<game name="Game B"><rom name="Game B.bin"/></game>
<game name="Game D"><rom name="Game D.cue"/></game>
</datafile>"#;

    fn list(titles: &[&str]) -> MiaList {
        MiaList {
            titles: titles.iter().map(|t| t.to_string()).collect(),
            version: None,
            timestamp: None,
            layout: ListLayout::Preformatted,
        }
    }

    #[test]
    fn test_partial_match() {
        let mut doc = CatalogDocument::parse(DAT).unwrap();
        let report = apply(
            &mut doc,
            &list(&["Game A", "Game C"]),
            &ExactTitleMatch,
            VersionComparison::RegistryNewer,
        )
        .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.total, 2);
        assert_eq!(report.unmatched(), 1);
        assert_eq!(
            report.discs,
            vec![
                DiscOutcome::Marked {
                    title: "Game A".into(),
                    records_marked: 1
                },
                DiscOutcome::Unmatched {
                    title: "Game C".into(),
                    cause: UnmatchedCause::CatalogOutdated
                },
            ]
        );

        let game_a = doc.entries()[0].records.clone();
        assert!(!doc.is_marked(&game_a[0]));
        assert!(doc.is_marked(&game_a[1]));
        let game_b = doc.entries()[1].records.clone();
        assert!(!doc.is_marked(&game_b[0]));
    }

    #[test]
    fn test_entry_with_only_index_records_still_counts() {
        let mut doc = CatalogDocument::parse(DAT).unwrap();
        let report = apply(
            &mut doc,
            &list(&["Game D"]),
            &ExactTitleMatch,
            VersionComparison::Equal,
        )
        .unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(
            report.discs[0],
            DiscOutcome::Marked {
                title: "Game D".into(),
                records_marked: 0
            }
        );
    }

    #[test]
    fn test_matching_is_exact() {
        let mut doc = CatalogDocument::parse(DAT).unwrap();
        let report = apply(
            &mut doc,
            &list(&["game a", "Game A ", "Game"]),
            &ExactTitleMatch,
            VersionComparison::Equal,
        )
        .unwrap();
        assert_eq!(report.updated, 0);
        assert!(report
            .discs
            .iter()
            .all(|d| matches!(d, DiscOutcome::Unmatched { cause: UnmatchedCause::Unknown, .. })));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut once = CatalogDocument::parse(DAT).unwrap();
        let titles = list(&["Game A", "Game B"]);
        apply(&mut once, &titles, &ExactTitleMatch, VersionComparison::Equal).unwrap();
        let first = once.to_bytes().unwrap();

        apply(&mut once, &titles, &ExactTitleMatch, VersionComparison::Equal).unwrap();
        assert_eq!(once.to_bytes().unwrap(), first);
    }

    #[test]
    fn test_custom_matcher_is_used() {
        struct CaseInsensitive;
        impl TitleMatcher for CaseInsensitive {
            fn matches(&self, disc_title: &str, entry_title: &str) -> bool {
                disc_title.eq_ignore_ascii_case(entry_title)
            }
        }

        let mut doc = CatalogDocument::parse(DAT).unwrap();
        let report = apply(
            &mut doc,
            &list(&["game b"]),
            &CaseInsensitive,
            VersionComparison::Equal,
        )
        .unwrap();
        assert_eq!(report.updated, 1);
    }
}
