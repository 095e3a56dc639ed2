//! # Configuration Module
//!
//! Environment-variable configuration for the [`crate::loader::Loader`].
//!
//! ## Environment Variables
//!
//! ### `OASREF_EXTERNAL_REFS`
//!
//! Allows references that leave the current document. Accepts `1`, `true`,
//! `yes` or `on` (case-insensitive); anything else disables them.
//!
//! Default: disabled
//!
//! ### `OASREF_HTTP_TIMEOUT_SECS`
//!
//! Timeout for each network fetch, in whole seconds. `0` disables the timeout.
//!
//! Default: `30`
//!
//! ### `OASREF_MAX_DOCUMENT_BYTES`
//!
//! Upper bound on the size of any fetched document. Decimal or `0x` hex.
//!
//! Default: unlimited
//!
//! ## Usage
//!
//! ```rust
//! use oas_resolver::config::LoaderConfig;
//!
//! let config = LoaderConfig::from_env();
//! println!("external refs allowed: {}", config.external_refs_allowed);
//! ```
//!
//! Values that fail to parse fall back to their defaults.

use std::env;
use std::time::Duration;

/// Default network fetch timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Loader behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Whether references may point outside the current document.
    pub external_refs_allowed: bool,
    /// Per-request timeout of the default network fetcher; `None` waits forever.
    pub http_timeout: Option<Duration>,
    /// Size cap for fetched documents, in bytes.
    pub max_document_bytes: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            external_refs_allowed: false,
            http_timeout: Some(DEFAULT_HTTP_TIMEOUT),
            max_document_bytes: None,
        }
    }
}

impl LoaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LoaderConfig::default();

        let external_refs_allowed = lookup("OASREF_EXTERNAL_REFS")
            .map(|val| parse_flag(&val))
            .unwrap_or(defaults.external_refs_allowed);

        let http_timeout = match lookup("OASREF_HTTP_TIMEOUT_SECS").map(|v| v.trim().parse::<u64>()) {
            Some(Ok(0)) => None,
            Some(Ok(secs)) => Some(Duration::from_secs(secs)),
            Some(Err(_)) | None => defaults.http_timeout,
        };

        let max_document_bytes = lookup("OASREF_MAX_DOCUMENT_BYTES")
            .and_then(|val| parse_size(&val))
            .or(defaults.max_document_bytes);

        LoaderConfig {
            external_refs_allowed,
            http_timeout,
            max_document_bytes,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
