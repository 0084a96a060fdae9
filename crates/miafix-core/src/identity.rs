//! System identity resolution from DAT filenames.
//!
//! Redump DATs are named `<System> - Datfile (<count>) (<timestamp>).dat`.
//! The MIA lists key systems by the `<System>` part, so everything after the
//! last ` - ` is dropped. BIOS sets and fixdat-tool output follow their own
//! conventions and are special-cased.

use crate::config::CatalogConfig;
use regex::Regex;
use std::sync::LazyLock;

/// Case-insensitive matchers for the fixdat prefixes, in strip order.
static PREFIX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CatalogConfig::STRIPPED_PREFIXES
        .iter()
        .map(|prefix| Regex::new(&format!("(?i){}", regex::escape(prefix))).unwrap())
        .collect()
});

/// Derive the canonical system name from a DAT filename.
///
/// Total: an unrecognized filename yields a name that simply matches no
/// registry entry.
///
/// # Examples
///
/// ```
/// use miafix_core::identity::resolve_system_name;
///
/// assert_eq!(
///     resolve_system_name("Sony - PlayStation - Datfile (10921) (2021-01-01 00-00-00).dat"),
///     "Sony - PlayStation"
/// );
/// assert_eq!(
///     resolve_system_name("Sony - PlayStation - BIOS Datfile (12) (2020-05-05 10-10-10).dat"),
///     "Sony - PlayStation - BIOS Images"
/// );
/// ```
pub fn resolve_system_name(filename: &str) -> String {
    let mut name = filename.replace('_', " ");
    for pattern in PREFIX_PATTERNS.iter() {
        name = pattern.replace_all(&name, "").trim_start().to_string();
    }

    if name.contains(CatalogConfig::BIOS_MARKER) {
        let head = name
            .split(CatalogConfig::BIOS_SEPARATOR)
            .next()
            .unwrap_or_default();
        return format!("{}{}", head, CatalogConfig::BIOS_SUFFIX);
    }

    name.rsplit_once(CatalogConfig::NAME_SEPARATOR)
        .map(|(system, _variant)| system.to_string())
        .unwrap_or_default()
}

/// Whether a filename carries the completion suffix of a previous run.
pub fn is_previously_completed(filename: &str, completed_ending: &str) -> bool {
    filename.ends_with(completed_ending)
}
