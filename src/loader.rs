//! # Loader Module
//!
//! Entry points that obtain a document, decode it and resolve its references.
//!
//! ## Overview
//!
//! | Entry point | Base location for relative references |
//! |---|---|
//! | [`Loader::load_from_bytes`] | none: only `#/...` references are usable |
//! | [`Loader::load_from_bytes_with_location`] | the given location |
//! | [`Loader::load_from_file`] | the file path |
//! | [`Loader::load_from_uri`] | the URI |
//! | [`Loader::resolve_refs_in`] | caller-supplied, for documents decoded elsewhere |
//!
//! Each call builds a fresh resolver, so calls are independent of each other
//! and a `Loader` can be shared between threads.
//!
//! ## Example
//!
//! ```rust
//! use oas_resolver::Loader;
//!
//! let doc = Loader::new()
//!     .load_from_bytes(br##"{
//!         "openapi": "3.0.3",
//!         "components": { "schemas": {
//!             "Pet": { "$ref": "#/components/schemas/Animal" },
//!             "Animal": { "type": "object" }
//!         } }
//!     }"##)
//!     .unwrap();
//! let pet = doc.components.schemas["Pet"].value().unwrap();
//! assert_eq!(pet.schema_type, Some(serde_json::json!("object")));
//! ```

use crate::codec;
use crate::config::LoaderConfig;
use crate::document::Document;
use crate::error::{ResolveError, Result};
use crate::fetch::{DefaultFetcher, Fetcher};
use crate::location::Location;
use crate::resolver::{Entity, ResolveStats, Resolver};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Document loader and resolver front end.
pub struct Loader {
    config: LoaderConfig,
    fetcher: Arc<dyn Fetcher>,
    last_stats: Mutex<Option<ResolveStats>>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("config", &self.config)
            .field("last_stats", &self.last_stats())
            .finish_non_exhaustive()
    }
}

impl Loader {
    /// A loader with default configuration: external references disabled.
    pub fn new() -> Self {
        Self::from_config(LoaderConfig::default())
    }

    /// A loader configured from `OASREF_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_config(LoaderConfig::from_env())
    }

    pub fn from_config(config: LoaderConfig) -> Self {
        Loader {
            fetcher: Arc::new(DefaultFetcher::from_config(&config)),
            config,
            last_stats: Mutex::new(None),
        }
    }

    /// Replaces the byte fetcher used for every external document.
    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    pub fn allow_external_refs(mut self, allowed: bool) -> Self {
        self.config.external_refs_allowed = allowed;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Counters of the most recent resolve call, successful or not.
    pub fn last_stats(&self) -> Option<ResolveStats> {
        *self
            .last_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Decodes and resolves an in-memory document with no known origin.
    pub fn load_from_bytes(&self, bytes: &[u8]) -> Result<Document> {
        self.load_with(bytes, None)
    }

    /// Decodes and resolves an in-memory document as if read from `location`.
    pub fn load_from_bytes_with_location(&self, bytes: &[u8], location: &Location) -> Result<Document> {
        self.load_with(bytes, Some(location))
    }

    /// Reads a document through the fetcher and resolves it against its path.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Document> {
        let location = Location::from_path(path.as_ref().to_string_lossy().into_owned());
        self.load_from_location(&location)
    }

    /// Fetches a document from a URL (or plain path) and resolves it.
    pub fn load_from_uri(&self, uri: &str) -> Result<Document> {
        let location =
            Location::parse(uri).map_err(|reason| ResolveError::malformed(uri, reason))?;
        self.load_from_location(&location)
    }

    fn load_from_location(&self, location: &Location) -> Result<Document> {
        debug!(location = %location, "loading root document");
        let bytes = self
            .fetcher
            .fetch(location)
            .map_err(|source| ResolveError::Fetch {
                location: location.to_string(),
                source,
            })?;
        self.load_with(&bytes, Some(location))
    }

    fn load_with(&self, bytes: &[u8], location: Option<&Location>) -> Result<Document> {
        let mut document: Document =
            codec::parse(bytes, location).map_err(|source| ResolveError::Format {
                origin: location.map_or_else(|| "<bytes>".to_string(), Location::to_string),
                source,
            })?;
        self.resolve_refs_in(&mut document, location)?;
        Ok(document)
    }

    /// Resolves every reference of an already-decoded document in place.
    ///
    /// The exclusive borrow keeps the document from moving or being read
    /// while nodes are being filled in.
    pub fn resolve_refs_in(&self, document: &mut Document, location: Option<&Location>) -> Result<()> {
        let document: &Document = document;
        let mut resolver = Resolver::new(self.fetcher.as_ref(), self.config.external_refs_allowed);
        let result = resolver.run(document, location);
        self.record(resolver.stats());
        result
    }

    /// Loads a file holding exactly one element of kind `T` and resolves it.
    ///
    /// `reference` must not carry a fragment, though a bare trailing `#` is
    /// accepted. External references must be enabled.
    pub fn load_element<T: Entity>(&self, reference: &str, base: Option<&Location>) -> Result<Arc<T>> {
        let context = Document::default();
        let mut resolver = Resolver::new(self.fetcher.as_ref(), self.config.external_refs_allowed);
        let result = resolver.run_element::<T>(reference, base, &context);
        self.record(resolver.stats());
        result
    }

    fn record(&self, stats: ResolveStats) {
        *self
            .last_stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(stats);
    }
}
