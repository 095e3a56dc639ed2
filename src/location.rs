//! # Location Module
//!
//! Pure path and URI arithmetic used to find referenced documents.
//!
//! A [`Location`] is where a document was loaded from: a network URL
//! (scheme and host), or a filesystem-style path. Relative references are
//! joined against the directory of the document that contains them, absolute
//! ones are used as-is:
//!
//! ```rust
//! use oas_resolver::location::{resolve, Location};
//!
//! let base = Location::from_path("/specs/a/main.yaml");
//! let target = resolve(Some(&base), &Location::parse("other.yaml").unwrap());
//! assert_eq!(target.to_string(), "/specs/a/other.yaml");
//!
//! let shared = resolve(Some(&base), &Location::parse("/specs/shared.yaml").unwrap());
//! assert_eq!(shared.to_string(), "/specs/shared.yaml");
//! ```
//!
//! Paths are joined and normalised POSIX-style regardless of platform.

use crate::error::{ResolveError, Result};
use std::fmt;
use url::Url;

/// Where a document (or the directory of one) lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    scheme: Option<String>,
    /// Host, with `:port` when one was given.
    host: Option<String>,
    path: String,
    query: Option<String>,
}

impl Location {
    /// A local filesystem location.
    pub fn from_path(path: impl Into<String>) -> Self {
        Location {
            scheme: None,
            host: None,
            path: path.into(),
            query: None,
        }
    }

    /// Parses an absolute URL, a scheme-relative `//host/path`, or a plain
    /// (relative or absolute) path. Percent-escapes in the path are decoded.
    pub fn parse(input: &str) -> Result<Self, String> {
        if let Some(bad) = input.chars().find(|c| c.is_control()) {
            return Err(format!("invalid control character {bad:?}"));
        }
        validate_escapes(input)?;

        if input.starts_with("//") {
            let url = Url::parse(&format!("http:{input}")).map_err(|e| e.to_string())?;
            let mut location = Self::from_url(&url)?;
            location.scheme = None;
            return Ok(location);
        }

        match Url::parse(input) {
            Ok(url) => Self::from_url(&url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let (path, query) = match input.split_once('?') {
                    Some((path, query)) => (path, Some(query.to_string())),
                    None => (input, None),
                };
                Ok(Location {
                    scheme: None,
                    host: None,
                    path: decode(path)?,
                    query,
                })
            }
            Err(err) => Err(err.to_string()),
        }
    }

    fn from_url(url: &Url) -> Result<Self, String> {
        let host = url.host_str().map(|host| match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        });
        Ok(Location {
            scheme: Some(url.scheme().to_string()),
            host,
            path: decode(url.path())?,
            query: url.query().map(str::to_string),
        })
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// True when the location names a network resource (scheme and host).
    pub fn is_network(&self) -> bool {
        self.scheme.is_some() && self.host.is_some()
    }

    /// True when the location is neither scheme- nor host-qualified.
    pub fn is_local(&self) -> bool {
        self.scheme.is_none() && self.host.is_none()
    }

    /// Parses [`Location::to_string`] back into a URL.
    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.to_string())
    }

    /// The same location with its path lexically [`clean`]ed, so that
    /// `specs/./a.yaml` and `specs/a.yaml` compare equal.
    pub fn normalized(&self) -> Self {
        if self.path.is_empty() {
            return self.clone();
        }
        Location {
            path: clean(&self.path),
            ..self.clone()
        }
    }

    fn with_path(&self, path: String) -> Self {
        Location {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            path,
            query: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.scheme, &self.host) {
            (Some(scheme), Some(host)) => write!(f, "{scheme}://{host}")?,
            (Some(scheme), None) => write!(f, "{scheme}://")?,
            (None, Some(host)) => write!(f, "//{host}")?,
            (None, None) => {}
        }
        if self.host.is_some() && !self.path.is_empty() && !self.path.starts_with('/') {
            f.write_str("/")?;
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

fn validate_escapes(input: &str) -> Result<(), String> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                let end = (i + 3).min(bytes.len());
                return Err(format!(
                    "invalid URL escape {:?}",
                    String::from_utf8_lossy(&bytes[i..end])
                ));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn decode(raw: &str) -> Result<String, String> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|e| format!("invalid percent-encoding: {e}"))
}

/// Splits a reference into its location part and its fragment.
///
/// The fragment is `None` when the reference has no `#` at all and
/// `Some("")` for a trailing `#`.
pub fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((location, fragment)) => (location, Some(fragment)),
        None => (reference, None),
    }
}

/// Parses the location part of `reference` (everything before `#`).
pub fn reference_location(reference: &str) -> Result<Location> {
    let (location, _) = split_reference(reference);
    Location::parse(location).map_err(|reason| ResolveError::malformed(reference, reason))
}

/// Joins `relative` onto the directory of `base`.
///
/// Without a base the relative location is returned unchanged. The result
/// keeps the scheme and host of `base`.
pub fn join(base: Option<&Location>, relative: &Location) -> Location {
    let Some(base) = base else {
        return relative.clone();
    };
    let mut joined = base.with_path(join_paths(&dir(&base.path), &relative.path));
    joined.query = relative.query.clone();
    joined
}

/// Resolves `candidate` against `base`.
///
/// Scheme- or host-qualified candidates and absolute paths are returned as
/// they are; anything else is [`join`]ed.
pub fn resolve(base: Option<&Location>, candidate: &Location) -> Location {
    if !candidate.is_local() || candidate.path.starts_with('/') {
        return candidate.clone();
    }
    join(base, candidate)
}

/// Location against which relative references found inside the target of
/// `reference` must be resolved: the directory of the document that defines
/// it, with a trailing `/`.
///
/// Without a document location there is nothing to rebase and the result is
/// `None`.
pub fn rebase(document: Option<&Location>, reference: &str) -> Result<Option<Location>> {
    let Some(document) = document else {
        return Ok(None);
    };
    let candidate = reference_location(reference)?;
    let target = if candidate.is_local() && candidate.path.is_empty() {
        document.clone()
    } else {
        resolve(Some(document), &candidate)
    };
    let mut directory = dir(&target.path);
    if !directory.ends_with('/') {
        directory.push('/');
    }
    Ok(Some(target.with_path(directory)))
}

/// Lexically normalises a slash-separated path: collapses repeated
/// separators, drops `.` elements and folds `..` against preceding ones.
///
/// An empty result is `"."`. A rooted path never climbs above `/`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Everything but the last element of `path`, cleaned.
pub fn dir(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => clean(&path[..=idx]),
        None => ".".to_string(),
    }
}

/// Joins two path fragments and cleans the result. Empty fragments are
/// ignored.
pub fn join_paths(base: &str, relative: &str) -> String {
    match (base.is_empty(), relative.is_empty()) {
        (true, true) => String::new(),
        (true, false) => clean(relative),
        (false, true) => clean(base),
        (false, false) => clean(&format!("{base}/{relative}")),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(""), ".");
        assert_eq!(clean("a/b/../c"), "a/c");
        assert_eq!(clean("/../a//b/./"), "/a/b");
        assert_eq!(clean("../../x"), "../../x");
        assert_eq!(clean("a/.."), ".");
        assert_eq!(clean("/"), "/");
    }

    #[test]
    fn test_dir() {
        assert_eq!(dir("/specs/a/main.yaml"), "/specs/a");
        assert_eq!(dir("main.yaml"), ".");
        assert_eq!(dir("./"), ".");
        assert_eq!(dir("/specs/a/"), "/specs/a");
        assert_eq!(dir("/main.yaml"), "/");
    }

    #[test]
    fn test_parse_network_and_local() {
        let net = loc("https://example.com:8443/specs/api.yaml?v=2");
        assert_eq!(net.scheme(), Some("https"));
        assert_eq!(net.host(), Some("example.com:8443"));
        assert_eq!(net.path(), "/specs/api.yaml");
        assert_eq!(net.query(), Some("v=2"));
        assert!(net.is_network());
        assert_eq!(net.to_string(), "https://example.com:8443/specs/api.yaml?v=2");

        let local = loc("schemas/pet%20store.yaml");
        assert!(local.is_local());
        assert_eq!(local.path(), "schemas/pet store.yaml");

        let scheme_relative = loc("//cdn.example.com/common.yaml");
        assert_eq!(scheme_relative.scheme(), None);
        assert_eq!(scheme_relative.host(), Some("cdn.example.com"));
        assert!(!scheme_relative.is_local());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Location::parse("bad%zz.yaml").is_err());
        assert!(Location::parse("trailing%2").is_err());
        assert!(Location::parse("line\nbreak.yaml").is_err());
    }

    #[test]
    fn test_join() {
        let base = Location::from_path("/specs/a/main.yaml");
        assert_eq!(
            join(Some(&base), &loc("../b/other.yaml")).to_string(),
            "/specs/b/other.yaml"
        );
        assert_eq!(join(None, &loc("other.yaml")).to_string(), "other.yaml");

        let remote = loc("https://example.com/api/v1/openapi.yaml?token=1");
        let joined = join(Some(&remote), &loc("schemas/pet.yaml"));
        assert_eq!(joined.to_string(), "https://example.com/api/v1/schemas/pet.yaml");
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = Location::from_path("/specs/a/main.yaml");
        assert_eq!(
            resolve(Some(&base), &loc("other.yaml")).to_string(),
            "/specs/a/other.yaml"
        );
        assert_eq!(
            resolve(Some(&base), &loc("/specs/shared.yaml")).to_string(),
            "/specs/shared.yaml"
        );
        let remote = loc("https://example.com/x.yaml");
        assert_eq!(resolve(Some(&base), &remote), remote);
    }

    #[test]
    fn test_split_reference() {
        assert_eq!(split_reference("a.yaml#/x"), ("a.yaml", Some("/x")));
        assert_eq!(split_reference("a.yaml"), ("a.yaml", None));
        assert_eq!(split_reference("a.yaml#"), ("a.yaml", Some("")));
        assert_eq!(split_reference("#/x"), ("", Some("/x")));
    }

    #[test]
    fn test_rebase() {
        let doc = Location::from_path("/specs/a/main.yaml");
        assert_eq!(
            rebase(Some(&doc), "#/components/schemas/Pet").unwrap().unwrap().to_string(),
            "/specs/a/"
        );
        assert_eq!(
            rebase(Some(&doc), "sub/pet.yaml").unwrap().unwrap().to_string(),
            "/specs/a/sub/"
        );
        assert_eq!(
            rebase(Some(&doc), "/shared/common.yaml#/x").unwrap().unwrap().to_string(),
            "/shared/"
        );
        assert!(rebase(None, "sub/pet.yaml").unwrap().is_none());
        assert!(matches!(
            rebase(Some(&doc), "bad%zz.yaml"),
            Err(ResolveError::MalformedReference { .. })
        ));
    }

    #[test]
    fn test_rebased_directory_joins_like_its_document() {
        let doc = Location::from_path("/specs/a/main.yaml");
        let rebased = rebase(Some(&doc), "sub/pet.yaml").unwrap().unwrap();
        assert_eq!(
            resolve(Some(&rebased), &loc("tag.yaml")).to_string(),
            "/specs/a/sub/tag.yaml"
        );

        let root = Location::from_path("/main.yaml");
        let rebased = rebase(Some(&root), "#/x").unwrap().unwrap();
        assert_eq!(rebased.path(), "/");
    }

    #[test]
    fn test_normalized() {
        assert_eq!(
            Location::from_path("specs/./a//main.yaml").normalized(),
            Location::from_path("specs/a/main.yaml")
        );
        let remote = loc("https://example.com/v1/../v2/api.yaml?x=1");
        assert_eq!(remote.normalized().to_string(), "https://example.com/v2/api.yaml?x=1");
        assert_eq!(Location::from_path("").normalized().path(), "");
    }
}
