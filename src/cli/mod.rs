//! # CLI Module
//!
//! Command-line front end of the `oas-resolve` binary.
//!
//! ## Commands
//!
//! ### `resolve`
//!
//! Resolve every `$ref` of a document and print it:
//!
//! ```bash
//! oas-resolve resolve --spec openapi.yaml --external-refs --format yaml
//! ```
//!
//! ### `check`
//!
//! Resolve a document and print the resolution counters as JSON:
//!
//! ```bash
//! oas-resolve check --spec https://example.com/openapi.json --external-refs
//! ```
//!
//! `--spec` accepts a file path or an `http(s)` URL. Logging is configured
//! through the `OASREF_LOG_*` variables, loader behaviour through
//! `OASREF_EXTERNAL_REFS`, `OASREF_HTTP_TIMEOUT_SECS` and
//! `OASREF_MAX_DOCUMENT_BYTES`.

mod commands;


pub use commands::{run, run_cli, Cli, Commands, OutputFormat};
