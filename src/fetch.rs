//! # Fetch Module
//!
//! Retrieval of raw document bytes for a resolved [`Location`].
//!
//! The resolver never touches the filesystem or the network directly; it asks
//! a [`Fetcher`]. [`DefaultFetcher`] reads local paths and performs HTTP GETs
//! for network locations. Any closure with the right signature is a fetcher
//! too, which is how tests and callers with custom transports plug in:
//!
//! ```rust
//! use oas_resolver::error::FetchError;
//! use oas_resolver::fetch::Fetcher;
//! use oas_resolver::location::Location;
//!
//! let fetcher = |location: &Location| -> Result<Vec<u8>, FetchError> {
//!     match location.path() {
//!         "/specs/pet.yaml" => Ok(b"type: object".to_vec()),
//!         other => Err(FetchError::Other(format!("no fixture for {other}"))),
//!     }
//! };
//! assert!(fetcher.fetch(&Location::from_path("/specs/pet.yaml")).is_ok());
//! ```

use crate::config::LoaderConfig;
use crate::error::FetchError;
use crate::location::Location;
use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Source of raw document bytes.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&Location) -> Result<Vec<u8>, FetchError> + Send + Sync,
{
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, FetchError> {
        self(location)
    }
}

/// File reads for local locations, blocking HTTP GET for network ones.
#[derive(Debug)]
pub struct DefaultFetcher {
    timeout: Option<Duration>,
    max_bytes: Option<usize>,
    client: OnceLock<reqwest::blocking::Client>,
}

impl DefaultFetcher {
    pub fn new() -> Self {
        Self::from_config(&LoaderConfig::default())
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        DefaultFetcher {
            timeout: config.http_timeout,
            max_bytes: config.max_document_bytes,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, FetchError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(self.client.get_or_init(|| client))
    }

    fn fetch_network(&self, location: &Location) -> Result<Vec<u8>, FetchError> {
        let url = location
            .to_url()
            .map_err(|e| FetchError::UnsupportedLocation(format!("{location}: {e}")))?;
        debug!(url = %url, "http fetch");
        let response = self.client()?.get(url).send()?.error_for_status()?;
        if let (Some(limit), Some(size)) = (self.max_bytes, response.content_length()) {
            let size = usize::try_from(size).unwrap_or(usize::MAX);
            if size > limit {
                return Err(FetchError::TooLarge { size, limit });
            }
        }
        let mut body = Vec::new();
        match self.max_bytes {
            // One byte past the limit is enough to know it was exceeded.
            Some(limit) => {
                let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
                response.take(cap).read_to_end(&mut body)?;
            }
            None => {
                let mut response = response;
                response.read_to_end(&mut body)?;
            }
        }
        self.check_size(body)
    }

    fn fetch_file(&self, location: &Location) -> Result<Vec<u8>, FetchError> {
        debug!(path = %location.path(), "file read");
        if let Some(limit) = self.max_bytes {
            let size = std::fs::metadata(location.path())?.len();
            let size = usize::try_from(size).unwrap_or(usize::MAX);
            if size > limit {
                return Err(FetchError::TooLarge { size, limit });
            }
        }
        let bytes = std::fs::read(location.path())?;
        self.check_size(bytes)
    }

    fn check_size(&self, bytes: Vec<u8>) -> Result<Vec<u8>, FetchError> {
        match self.max_bytes {
            Some(limit) if bytes.len() > limit => Err(FetchError::TooLarge {
                size: bytes.len(),
                limit,
            }),
            _ => Ok(bytes),
        }
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, location: &Location) -> Result<Vec<u8>, FetchError> {
        if location.is_network() {
            return self.fetch_network(location);
        }
        if location.is_local() && location.query().is_none() {
            return self.fetch_file(location);
        }
        Err(FetchError::UnsupportedLocation(location.to_string()))
    }
}
