//! Error types for the MIA fixer.
//!
//! Only run-level failures are errors. Per-file conditions (no registry
//! entry, unreachable MIA list, unreadable DAT, ...) are classified as
//! outcomes by the reconciler and never abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the MIA fixer.
#[derive(Debug, Error)]
pub enum MiaFixError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timed out: {url}")]
    Timeout { url: String },

    #[error("GET {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Markup errors
    #[error("Malformed DAT {path:?}: {message}")]
    Xml {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("Unexpected registry page layout: {message}")]
    Html { message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Run interrupted")]
    Interrupted,
}

/// Result type alias for MIA fixer operations.
pub type Result<T> = std::result::Result<T, MiaFixError>;

impl From<std::io::Error> for MiaFixError {
    fn from(err: std::io::Error) -> Self {
        MiaFixError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<quick_xml::Error> for MiaFixError {
    fn from(err: quick_xml::Error) -> Self {
        MiaFixError::Xml {
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<reqwest::Error> for MiaFixError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        if err.is_timeout() {
            MiaFixError::Timeout { url }
        } else if let Some(status) = err.status() {
            MiaFixError::HttpStatus {
                url,
                status: status.as_u16(),
            }
        } else {
            MiaFixError::Network {
                message: format!("request to {} failed", url),
                cause: Some(err.to_string()),
            }
        }
    }
}

impl MiaFixError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        MiaFixError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Attach a path to an XML error that was raised without one.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            MiaFixError::Xml { message, path: None } => MiaFixError::Xml {
                message,
                path: Some(path.into()),
            },
            MiaFixError::Io {
                message,
                path: None,
                source,
            } => MiaFixError::Io {
                message,
                path: Some(path.into()),
                source,
            },
            other => other,
        }
    }

    /// Whether the failure looks transient (worth trying again on a later run).
    pub fn is_retryable(&self) -> bool {
        match self {
            MiaFixError::Network { .. } | MiaFixError::Timeout { .. } => true,
            MiaFixError::HttpStatus { status, .. } => {
                matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}
