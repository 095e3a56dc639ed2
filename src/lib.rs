//! # oas-resolver
//!
//! **oas-resolver** turns the `$ref` references of an
//! [OpenAPI 3](https://spec.openapis.org/oas/v3.0.3) document into a fully
//! materialised, cycle-safe in-memory graph, following references within a
//! document, into other files and URLs, and into single-element files.
//!
//! ## Architecture
//!
//! - **[`document`]** - typed document model; every referencable slot is a [`RefNode`]
//! - **[`loader`]** - entry points: bytes, file, URI, or an already-decoded document
//! - **`resolver`** - the per-call engine: visited set, foreign-document cache, per-kind walk
//! - **[`pointer`]** - JSON-pointer navigation over mappings, sequences and typed records
//! - **[`location`]** - path and URI arithmetic for relative references
//! - **[`fetch`]** - pluggable byte fetcher (file read, blocking HTTP GET)
//! - **[`codec`]** - JSON and YAML decoding
//! - **[`config`]** / **[`logging`]** - environment-driven configuration and tracing setup
//! - **[`error`]** - error types
//!
//! ### Resolution Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Loader
//!     participant Resolver
//!     participant Pointer as pointer::navigate
//!     participant Location as location::resolve/rebase
//!     participant Fetcher
//!
//!     Caller->>Loader: load_from_file("specs/main.yaml")
//!     Loader->>Fetcher: fetch(specs/main.yaml)
//!     Fetcher-->>Loader: bytes
//!     Loader->>Resolver: run(&document, Some(location))
//!     loop every RefNode in components, then paths
//!         alt "#/components/schemas/Pet"
//!             Resolver->>Pointer: navigate(document, segments)
//!             Pointer-->>Resolver: target node
//!         else "other.yaml#/components/schemas/Tag"
//!             Resolver->>Location: resolve(base, "other.yaml")
//!             Resolver->>Fetcher: fetch(specs/other.yaml), once per call
//!             Resolver->>Resolver: resolve foreign document
//!             Resolver->>Pointer: navigate(foreign, segments)
//!         else "header.yaml"
//!             Resolver->>Fetcher: fetch(specs/header.yaml)
//!         end
//!         Resolver->>Resolver: resolve target, share its Arc value
//!         Resolver->>Location: rebase(location, reference)
//!         Resolver->>Resolver: walk children of the value once
//!     end
//!     Resolver-->>Loader: Ok / first error
//!     Loader-->>Caller: Document
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oas_resolver::Loader;
//!
//! let doc = Loader::new()
//!     .allow_external_refs(true)
//!     .load_from_file("specs/openapi.yaml")?;
//! for (name, schema) in &doc.components.schemas {
//!     println!("{name}: resolved = {}", schema.is_resolved());
//! }
//! # Ok::<(), oas_resolver::ResolveError>(())
//! ```
//!
//! ## Sharing and Cycles
//!
//! Two references to the same target end up holding the same `Arc`, and the
//! target's children are walked once. Cycles through real values (a schema
//! listing itself in `allOf` or `properties`) resolve; a chain made only of
//! references that never reaches a value is reported as
//! [`ResolveError::CyclicReference`].
//!
//! ## External References
//!
//! Off by default. When disabled, any reference that leaves the current
//! document fails with [`ResolveError::ExternalRefNotAllowed`] before anything
//! is fetched.

pub mod cli;
pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod location;
pub mod logging;
pub mod pointer;
mod resolver;

pub use document::{Document, EntityKind, RefNode};
pub use error::{FetchError, FormatError, NavError, ResolveError, Result};
pub use fetch::{DefaultFetcher, Fetcher};
pub use loader::Loader;
pub use location::Location;
pub use resolver::{Entity, ResolveStats, Resolver};
