//! Error types returned by the loader, the resolver and their collaborators.
//!
//! Every failure is structural: nothing is retried and the first error aborts
//! the whole resolve call. Variants carry the offending `$ref` string so the
//! bad reference can be located in the source document.

use crate::document::EntityKind;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;

/// Failure of a top-level load or resolve call.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A reference left the current document while external references are disabled.
    #[error("encountered non-allowed external reference: {reference:?}")]
    ExternalRefNotAllowed { reference: String },

    /// The reference string is not a usable URI, or a single-element
    /// reference carries a fragment.
    #[error("malformed reference {reference:?}: {reason}")]
    MalformedReference { reference: String, reason: String },

    /// A fragment is present but does not begin with `/`.
    #[error("expected fragment prefix '#/' in reference {reference:?}")]
    MalformedFragment { reference: String },

    /// The pointer navigator could not step through `segment`.
    ///
    /// `path` holds the already-consumed segments joined with `/`.
    #[error("failed to resolve {segment:?} in fragment of reference {reference:?} (after {path:?}): {source}")]
    FragmentPartNotFound {
        reference: String,
        path: String,
        segment: String,
        #[source]
        source: NavError,
    },

    /// The addressed node cannot be read as the requested entity kind.
    #[error("bad data in {reference:?}: expected {kind}, {reason}")]
    BadReferenceData {
        reference: String,
        kind: EntityKind,
        reason: String,
    },

    /// A parameter or header declares both `schema` and `content`.
    ///
    /// `name` is the parameter name. Headers are named by the map key they
    /// sit under, which the value itself does not carry, so it is `None`.
    #[error("{kind}{} cannot contain both schema and content", display_name(.name))]
    SchemaContentConflict {
        kind: EntityKind,
        name: Option<String>,
    },

    /// A node carries neither a reference nor a value.
    #[error("invalid {kind}: value MUST be a JSON object")]
    EmptyNode { kind: EntityKind },

    /// A chain of references that only ever aliases itself.
    #[error("reference {reference:?} never reaches a value: its alias chain is cyclic")]
    CyclicReference { reference: String },

    /// The byte fetcher failed for `location`.
    #[error("failed to fetch {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: FetchError,
    },

    /// The fetched bytes could not be decoded.
    #[error("failed to parse {origin}: {source}")]
    Format {
        origin: String,
        #[source]
        source: FormatError,
    },
}

fn display_name(name: &Option<String>) -> String {
    name.as_ref().map(|name| format!(" {name:?}")).unwrap_or_default()
}

impl ResolveError {
    pub(crate) fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        ResolveError::MalformedReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single pointer-navigator step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("map key {0:?} not found")]
    KeyNotFound(String),
    #[error("sequence index {0:?} out of bounds")]
    IndexOutOfBounds(String),
    #[error("field {0:?} not found")]
    FieldNotFound(String),
    #[error("{0:?} addresses a node that is not a map, sequence nor record")]
    NotNavigable(String),
    #[error("{0:?} addresses a null value")]
    NullValue(String),
}

/// Failure reported by a [`crate::fetch::Fetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("unsupported location {0:?}")]
    UnsupportedLocation(String),
    #[error("document of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    /// Failure raised by a caller-supplied fetcher.
    #[error("{0}")]
    Other(String),
}

/// Failure reported by [`crate::codec::parse`].
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
