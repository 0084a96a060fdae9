//! Per-file classification.
//!
//! Every DAT ends in exactly one [`FileOutcome`]. Files that get as far as
//! matching carry two independent classifications: how many listed discs
//! were found ([`FileBucket`]) and how the versions compare
//! ([`VersionBucket`]).

use crate::discovery::CatalogSource;
use crate::matcher::MatchReport;
use crate::version::VersionComparison;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Terminal classification of one DAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileBucket {
    UpdatedPreviously,
    NoRegistryMatch,
    NoLink,
    LinkUnreachable,
    EmptyList,
    CatalogUnreadable,
    ZeroMatched,
    PartiallyMatched,
    FullyMatched,
}

impl FileBucket {
    /// Bucket for a file whose listed discs were matched.
    pub fn from_counts(updated: usize, total: usize) -> Self {
        if updated == 0 {
            FileBucket::ZeroMatched
        } else if updated < total {
            FileBucket::PartiallyMatched
        } else {
            FileBucket::FullyMatched
        }
    }

    /// Stable kebab-case name, as used in the JSON summary.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileBucket::UpdatedPreviously => "updated-previously",
            FileBucket::NoRegistryMatch => "no-registry-match",
            FileBucket::NoLink => "no-link",
            FileBucket::LinkUnreachable => "link-unreachable",
            FileBucket::EmptyList => "empty-list",
            FileBucket::CatalogUnreadable => "catalog-unreadable",
            FileBucket::ZeroMatched => "zero-matched",
            FileBucket::PartiallyMatched => "partially-matched",
            FileBucket::FullyMatched => "fully-matched",
        }
    }
}

impl fmt::Display for FileBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version classification of a matched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionBucket {
    CatalogOutdated,
    RegistryOutdated,
    VersionMatch,
    VersionAbsent,
    CatalogVersionAbsent,
}

impl From<VersionComparison> for VersionBucket {
    fn from(comparison: VersionComparison) -> Self {
        match comparison {
            VersionComparison::RegistryNewer => VersionBucket::CatalogOutdated,
            VersionComparison::CatalogNewer => VersionBucket::RegistryOutdated,
            VersionComparison::Equal => VersionBucket::VersionMatch,
            VersionComparison::RegistryAbsent => VersionBucket::VersionAbsent,
            VersionComparison::CatalogAbsent => VersionBucket::CatalogVersionAbsent,
        }
    }
}

/// Whether the processed copy made it to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum Persisted {
    Written(PathBuf),
    Failed(String),
}

/// What happened to one DAT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum FileOutcome {
    UpdatedPreviously,
    NoRegistryMatch,
    NoLink,
    LinkUnreachable {
        cause: String,
    },
    EmptyList {
        registry_version: Option<String>,
    },
    CatalogUnreadable {
        cause: String,
    },
    Reconciled {
        comparison: VersionComparison,
        catalog_version: Option<String>,
        registry_version: Option<String>,
        report: MatchReport,
        persisted: Persisted,
    },
}

impl FileOutcome {
    /// Terminal bucket for this outcome.
    pub fn bucket(&self) -> FileBucket {
        match self {
            FileOutcome::UpdatedPreviously => FileBucket::UpdatedPreviously,
            FileOutcome::NoRegistryMatch => FileBucket::NoRegistryMatch,
            FileOutcome::NoLink => FileBucket::NoLink,
            FileOutcome::LinkUnreachable { .. } => FileBucket::LinkUnreachable,
            FileOutcome::EmptyList { .. } => FileBucket::EmptyList,
            FileOutcome::CatalogUnreadable { .. } => FileBucket::CatalogUnreadable,
            FileOutcome::Reconciled { report, .. } => {
                FileBucket::from_counts(report.updated, report.total)
            }
        }
    }

    /// Only files that reached matching have one.
    pub fn version_bucket(&self) -> Option<VersionBucket> {
        match self {
            FileOutcome::Reconciled { comparison, .. } => Some((*comparison).into()),
            _ => None,
        }
    }

    /// Match report, for files that reached matching.
    pub fn report(&self) -> Option<&MatchReport> {
        match self {
            FileOutcome::Reconciled { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Path of the processed copy, if one was written.
    pub fn written_path(&self) -> Option<&PathBuf> {
        match self {
            FileOutcome::Reconciled {
                persisted: Persisted::Written(path),
                ..
            } => Some(path),
            _ => None,
        }
    }
}

/// A DAT together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedFile {
    pub source: CatalogSource,
    pub outcome: FileOutcome,
}

impl ProcessedFile {
    /// Terminal bucket of the processed file.
    pub fn bucket(&self) -> FileBucket {
        self.outcome.bucket()
    }
}
