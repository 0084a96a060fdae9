//! Run-wide statistics.
//!
//! Created at the start of a run, fed one [`ProcessedFile`] at a time, and
//! read once at the end for the report. Never persisted.

use crate::outcome::{FileBucket, ProcessedFile, VersionBucket};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An original DAT and the processed copy written for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenOutput {
    pub original: PathBuf,
    pub output: PathBuf,
}

/// Aggregated counters and bucket memberships.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    files_seen: usize,
    buckets: BTreeMap<FileBucket, Vec<String>>,
    version_buckets: BTreeMap<VersionBucket, Vec<String>>,
    /// Keyed by full path: same-named DATs in different folders stay apart.
    total_discs: BTreeMap<PathBuf, usize>,
    updated_discs: BTreeMap<PathBuf, usize>,
    unmatched_by_system: BTreeMap<String, usize>,
    written: Vec<WrittenOutput>,
}

/// Serializable end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files_inputted: usize,
    pub buckets: BTreeMap<FileBucket, usize>,
    pub version_buckets: BTreeMap<VersionBucket, usize>,
    pub discs_checked: usize,
    pub discs_updated: usize,
    pub discs_unmatched: usize,
    pub unmatched_by_system: BTreeMap<String, usize>,
    pub written: Vec<WrittenOutput>,
}

impl RunStatistics {
    /// Create empty statistics for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished file into the statistics.
    pub fn record(&mut self, file: &ProcessedFile) {
        let filename = file.source.filename.clone();
        self.files_seen += 1;
        self.buckets
            .entry(file.bucket())
            .or_default()
            .push(filename.clone());

        if let Some(version_bucket) = file.outcome.version_bucket() {
            self.version_buckets
                .entry(version_bucket)
                .or_default()
                .push(filename.clone());
        }

        if let Some(report) = file.outcome.report() {
            let path = &file.source.path;
            *self.total_discs.entry(path.clone()).or_default() += report.total;
            *self.updated_discs.entry(path.clone()).or_default() += report.updated;
            if report.unmatched() > 0 {
                *self
                    .unmatched_by_system
                    .entry(file.source.system_name.clone())
                    .or_default() += report.unmatched();
            }
        }

        if let Some(output) = file.outcome.written_path() {
            self.written.push(WrittenOutput {
                original: file.source.path.clone(),
                output: output.clone(),
            });
        }
    }

    /// Number of files recorded so far.
    pub fn files_seen(&self) -> usize {
        self.files_seen
    }

    /// Filenames that landed in `bucket`, in processing order.
    pub fn members(&self, bucket: FileBucket) -> &[String] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or_default()
    }

    /// Filenames that received `bucket`, in processing order.
    pub fn version_members(&self, bucket: VersionBucket) -> &[String] {
        self.version_buckets
            .get(&bucket)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Listed discs checked against the DAT at `path`.
    pub fn total_discs(&self, path: &Path) -> usize {
        self.total_discs.get(path).copied().unwrap_or_default()
    }

    /// Listed discs found and marked in the DAT at `path`.
    pub fn updated_discs(&self, path: &Path) -> usize {
        self.updated_discs.get(path).copied().unwrap_or_default()
    }

    /// Systems with listed discs missing from their DAT, with counts.
    pub fn unmatched_by_system(&self) -> &BTreeMap<String, usize> {
        &self.unmatched_by_system
    }

    /// Processed copies written this run; their originals are the backups.
    pub fn written(&self) -> &[WrittenOutput] {
        &self.written
    }

    /// Snapshot of the counters for the report and `--json`.
    pub fn summary(&self) -> RunSummary {
        let discs_checked = self.total_discs.values().sum();
        let discs_updated = self.updated_discs.values().sum();
        RunSummary {
            files_inputted: self.files_seen,
            buckets: self
                .buckets
                .iter()
                .map(|(bucket, files)| (*bucket, files.len()))
                .collect(),
            version_buckets: self
                .version_buckets
                .iter()
                .map(|(bucket, files)| (*bucket, files.len()))
                .collect(),
            discs_checked,
            discs_updated,
            discs_unmatched: discs_checked - discs_updated,
            unmatched_by_system: self.unmatched_by_system.clone(),
            written: self.written.clone(),
        }
    }
}

impl RunSummary {
    /// Files that landed in `bucket`.
    pub fn count(&self, bucket: FileBucket) -> usize {
        self.buckets.get(&bucket).copied().unwrap_or_default()
    }

    /// Files that received version bucket `bucket`.
    pub fn version_count(&self, bucket: VersionBucket) -> usize {
        self.version_buckets.get(&bucket).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::CatalogSource;
    use crate::matcher::{DiscOutcome, MatchReport};
    use crate::outcome::{FileOutcome, Persisted};
    use crate::version::{UnmatchedCause, VersionComparison};

    fn reconciled(filename: &str, updated: usize, total: usize) -> ProcessedFile {
        reconciled_at(&format!("/dats/{filename}"), updated, total)
    }

    fn reconciled_at(path: &str, updated: usize, total: usize) -> ProcessedFile {
        let mut discs = Vec::new();
        for i in 0..total {
            discs.push(if i < updated {
                DiscOutcome::Marked {
                    title: format!("Disc {i}"),
                    records_marked: 1,
                }
            } else {
                DiscOutcome::Unmatched {
                    title: format!("Disc {i}"),
                    cause: UnmatchedCause::Unknown,
                }
            });
        }
        ProcessedFile {
            source: CatalogSource::from_path(path),
            outcome: FileOutcome::Reconciled {
                comparison: VersionComparison::Equal,
                catalog_version: None,
                registry_version: None,
                report: MatchReport {
                    updated,
                    total,
                    discs,
                },
                persisted: Persisted::Written(PathBuf::from(format!("{path}.out"))),
            },
        }
    }

    #[test]
    fn test_record_reconciled_files() {
        let mut stats = RunStatistics::new();
        stats.record(&reconciled("Sega - Saturn - Datfile.dat", 1, 2));
        stats.record(&reconciled("Sega - Dreamcast - Datfile.dat", 3, 3));

        assert_eq!(stats.files_seen(), 2);
        assert_eq!(
            stats.members(FileBucket::PartiallyMatched),
            ["Sega - Saturn - Datfile.dat".to_string()]
        );
        let saturn = Path::new("/dats/Sega - Saturn - Datfile.dat");
        assert_eq!(stats.total_discs(saturn), 2);
        assert_eq!(stats.updated_discs(saturn), 1);
        assert_eq!(stats.unmatched_by_system().get("Sega - Saturn"), Some(&1));
        assert!(stats.unmatched_by_system().get("Sega - Dreamcast").is_none());
        assert_eq!(stats.written().len(), 2);

        let summary = stats.summary();
        assert_eq!(summary.discs_checked, 5);
        assert_eq!(summary.discs_updated, 4);
        assert_eq!(summary.discs_unmatched, 1);
        assert_eq!(summary.version_count(VersionBucket::VersionMatch), 2);
    }

    #[test]
    fn test_record_early_outcome() {
        let mut stats = RunStatistics::new();
        stats.record(&ProcessedFile {
            source: CatalogSource::from_path("/dats/Bandai - Playdia - Datfile.dat"),
            outcome: FileOutcome::NoLink,
        });

        let summary = stats.summary();
        assert_eq!(summary.count(FileBucket::NoLink), 1);
        assert!(summary.version_buckets.is_empty());
        assert_eq!(summary.discs_checked, 0);
        assert!(summary.written.is_empty());
    }

    #[test]
    fn test_summary_serializes_bucket_keys() {
        let mut stats = RunStatistics::new();
        stats.record(&reconciled("A - Datfile.dat", 0, 1));
        let json = serde_json::to_value(stats.summary()).unwrap();
        assert_eq!(json["buckets"]["zero-matched"], 1);
        assert_eq!(json["version_buckets"]["version-match"], 1);
    }

    #[test]
    fn test_same_filename_in_two_folders_counted_separately() {
        let mut stats = RunStatistics::new();
        stats.record(&reconciled_at("/dats/usa/Sega - Saturn - Datfile.dat", 1, 2));
        stats.record(&reconciled_at("/dats/eur/Sega - Saturn - Datfile.dat", 3, 3));

        assert_eq!(stats.total_discs(Path::new("/dats/usa/Sega - Saturn - Datfile.dat")), 2);
        assert_eq!(stats.updated_discs(Path::new("/dats/eur/Sega - Saturn - Datfile.dat")), 3);
        assert_eq!(stats.summary().discs_checked, 5);
    }
}
