//! Centralized configuration for the MIA fixer.
//!
//! Fixed naming conventions of the Redump wiki and DAT files, network
//! parameters, and the runtime options a run is started with.

use std::time::Duration;

/// Where the MIA lists are published.
pub struct RegistryConfig;

impl RegistryConfig {
    pub const BASE_URL: &'static str = "http://wiki.redump.org";
    pub const LANDING_PATH: &'static str = "/index.php?title=MIA_Lists";
    pub const SECTION_WITH_MIAS: &'static str = "Systems_with_MIAs";
    pub const SECTION_NO_MIAS: &'static str = "Systems_with_no_reported_MIAs";
}

/// DAT naming conventions.
pub struct CatalogConfig;

impl CatalogConfig {
    pub const DAT_EXTENSION: &'static str = "dat";
    pub const COMPLETION_SUFFIX: &'static str = " [mia-fixed]";
    pub const INDEX_RECORD_EXTENSION: &'static str = ".cue";
    pub const NAME_SEPARATOR: &'static str = " - ";
    pub const BIOS_MARKER: &'static str = "BIOS";
    pub const BIOS_SEPARATOR: &'static str = " Datfile";
    pub const BIOS_SUFFIX: &'static str = " Images";
    /// Filename prefixes added by fixdat tools, stripped in this order.
    pub const STRIPPED_PREFIXES: &'static [&'static str] = &["fixdat", "fix"];
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    /// Per-request timeout for registry pages.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = concat!("mia-fixer/", env!("CARGO_PKG_VERSION"));
}

/// Shared directory names.
pub struct PathsConfig;

impl PathsConfig {
    pub const LOGS_DIR_NAME: &'static str = "logs";
}

/// Options a reconciliation run is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Base URL that relative MIA list links are resolved against.
    pub registry_base_url: String,
    /// Path of the landing page listing every system.
    pub landing_path: String,
    /// Suffix appended to the stem of processed DATs.
    pub completion_suffix: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            registry_base_url: RegistryConfig::BASE_URL.to_string(),
            landing_path: RegistryConfig::LANDING_PATH.to_string(),
            completion_suffix: CatalogConfig::COMPLETION_SUFFIX.to_string(),
        }
    }
}

impl ReconcileOptions {
    /// Override the registry base URL.
    pub fn with_registry_base_url(mut self, url: impl Into<String>) -> Self {
        self.registry_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL of the landing page.
    pub fn landing_url(&self) -> String {
        format!("{}{}", self.registry_base_url, self.landing_path)
    }

    /// Filename ending that marks a DAT produced by a previous run.
    pub fn completed_filename_ending(&self) -> String {
        format!("{}.{}", self.completion_suffix, CatalogConfig::DAT_EXTENSION)
    }
}
