//! DAT version vs. MIA list version comparison.
//!
//! Timestamps are compared as strings. Both sources write
//! `YYYY-MM-DD hh-mm-ss`, so lexical order is chronological once custom
//! DATs' colons are turned into hyphens. Other formats compare wrongly;
//! the result is advisory and never blocks marking.

use serde::Serialize;
use std::cmp::Ordering;

/// How a DAT's version relates to its MIA list's version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionComparison {
    /// The DAT is newer: the MIA list may need updating.
    CatalogNewer,
    /// The MIA list is newer: the DAT may need updating.
    RegistryNewer,
    Equal,
    /// The MIA list page declares no DAT version.
    RegistryAbsent,
    /// The DAT header declares no version.
    CatalogAbsent,
}

/// Likely reason a listed disc is missing from the DAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmatchedCause {
    CatalogOutdated,
    RegistryOutdated,
    Unknown,
}

impl VersionComparison {
    /// Likely cause to attach to a disc missing from the DAT.
    pub fn unmatched_cause(&self) -> UnmatchedCause {
        match self {
            VersionComparison::RegistryNewer => UnmatchedCause::CatalogOutdated,
            VersionComparison::CatalogNewer => UnmatchedCause::RegistryOutdated,
            _ => UnmatchedCause::Unknown,
        }
    }
}

impl UnmatchedCause {
    /// Hint appended to the per-disc log line.
    pub fn hint(&self) -> &'static str {
        match self {
            UnmatchedCause::CatalogOutdated => " (DAT may need updated)",
            UnmatchedCause::RegistryOutdated => " (MIA list may need updated)",
            UnmatchedCause::Unknown => "",
        }
    }
}

/// Make a timestamp comparable: trim it and replace `:` with `-`.
pub fn normalize_timestamp(timestamp: &str) -> String {
    timestamp.trim().replace(':', "-")
}

/// Compare a DAT's declared version against its MIA list's version.
pub fn compare_versions(catalog: Option<&str>, registry: Option<&str>) -> VersionComparison {
    let Some(registry) = registry else {
        return VersionComparison::RegistryAbsent;
    };
    let Some(catalog) = catalog else {
        return VersionComparison::CatalogAbsent;
    };

    match normalize_timestamp(catalog).cmp(&normalize_timestamp(registry)) {
        Ordering::Greater => VersionComparison::CatalogNewer,
        Ordering::Less => VersionComparison::RegistryNewer,
        Ordering::Equal => VersionComparison::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_newer() {
        assert_eq!(
            compare_versions(Some("2020-01-01"), Some("2021-01-01")),
            VersionComparison::RegistryNewer
        );
    }

    #[test]
    fn test_catalog_newer() {
        assert_eq!(
            compare_versions(Some("2021-01-01"), Some("2020-01-01")),
            VersionComparison::CatalogNewer
        );
    }

    #[test]
    fn test_equal_after_colon_normalization() {
        assert_eq!(
            compare_versions(Some("2023-06-01 12:00:00"), Some("2023-06-01 12-00-00")),
            VersionComparison::Equal
        );
    }

    #[test]
    fn test_absent_versions() {
        assert_eq!(
            compare_versions(Some("2020-01-01"), None),
            VersionComparison::RegistryAbsent
        );
        assert_eq!(compare_versions(None, None), VersionComparison::RegistryAbsent);
        assert_eq!(
            compare_versions(None, Some("2020-01-01")),
            VersionComparison::CatalogAbsent
        );
    }

    #[test]
    fn test_unmatched_cause_mapping() {
        assert_eq!(
            VersionComparison::RegistryNewer.unmatched_cause(),
            UnmatchedCause::CatalogOutdated
        );
        assert_eq!(
            VersionComparison::CatalogNewer.unmatched_cause(),
            UnmatchedCause::RegistryOutdated
        );
        assert_eq!(VersionComparison::Equal.unmatched_cause(), UnmatchedCause::Unknown);
    }
}
