//! End-of-run report.

use anyhow::Result;
use miafix_core::{FileBucket, RunStatistics, RunSummary, VersionBucket};
use std::io::Write;
use tracing::{debug, error, info};

/// Headline line for the console.
pub fn headline(files_updated: usize, discs_updated: usize) -> String {
    match (files_updated, discs_updated) {
        (0, _) => "**No DATs have been updated. See log for more details.**".to_string(),
        (1, 1) => "**1 DAT file and 1 disc entry have been updated.**".to_string(),
        (1, discs) => format!("**1 DAT file and {} disc entries have been updated.**", discs),
        (files, discs) => format!(
            "**{} DAT files and {} disc entries have been updated.**",
            files, discs
        ),
    }
}

/// Per-system unmatched counts, right-aligned in one column.
pub fn unmatched_table(summary: &RunSummary) -> Vec<String> {
    let width = summary
        .unmatched_by_system
        .keys()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
        + 5;

    summary
        .unmatched_by_system
        .iter()
        .map(|(system, count)| {
            let pad = width - system.chars().count();
            format!("     {}{:>pad$} disc(s)", system, count, pad = pad)
        })
        .collect()
}

/// Breakdown written to the log file only.
pub fn statistics_block(summary: &RunSummary, files_inputted: usize) -> String {
    let b = |bucket| summary.count(bucket);
    let v = |bucket| summary.version_count(bucket);
    format!(
        "--Miscellaneous Statistics--
    Total DATs Inputted: {files_inputted}
        Updated previously: {}
        Not listed on 'MIA Lists' page: {}
        Listed but had no hyperlink: {}
        Hyperlink failed to open: {}
        MIA list was empty: {}
        DAT could not be read: {}
        No listed discs found in DAT: {}
        Some listed discs found in DAT: {}
        All listed discs found & updated: {}

    DAT / MIA List Version Comparisons:
        Outdated DATs: {}
        Outdated MIA lists: {}
        DAT/MIA list version matches: {}
        MIA lists without version indicated: {}
        DATs without version indicated: {}

    Total MIA Discs checked: {}
        MIA discs not found in DATs: {}
        MIA discs successfully found in DATs: {}",
        b(FileBucket::UpdatedPreviously),
        b(FileBucket::NoRegistryMatch),
        b(FileBucket::NoLink),
        b(FileBucket::LinkUnreachable),
        b(FileBucket::EmptyList),
        b(FileBucket::CatalogUnreadable),
        b(FileBucket::ZeroMatched),
        b(FileBucket::PartiallyMatched),
        b(FileBucket::FullyMatched),
        v(VersionBucket::CatalogOutdated),
        v(VersionBucket::RegistryOutdated),
        v(VersionBucket::VersionMatch),
        v(VersionBucket::VersionAbsent),
        v(VersionBucket::CatalogVersionAbsent),
        summary.discs_checked,
        summary.discs_unmatched,
        summary.discs_updated,
    )
}

/// Log the whole report.
pub fn log_report(stats: &RunStatistics, files_inputted: usize) {
    let summary = stats.summary();
    debug!("Program Results Overview:");

    info!("{}", headline(summary.written.len(), summary.discs_updated));

    if !summary.unmatched_by_system.is_empty() {
        error!(
            "Note: MIA lists for the following systems had discs that could not be found in \
             their corresponding DAT (usually due to the discs having been added, renamed, or \
             removed since either the MIA list or inputted DAT was last updated):"
        );
        for line in unmatched_table(&summary) {
            error!("{}", line);
        }
        info!("Please see log for more details.");
    }

    debug!("{}", statistics_block(&summary, files_inputted));
}

/// Write the summary as pretty JSON followed by a newline.
pub fn write_json<W: Write>(summary: &RunSummary, out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
