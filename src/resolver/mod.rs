//! # Resolver Module
//!
//! The reference resolution engine.
//!
//! ## Overview
//!
//! A [`Resolver`] lives for exactly one top-level call. It walks the component
//! registry and the path table of a document depth-first, and for every
//! [`RefNode`] it meets:
//!
//! 1. skips it if the node itself, or the value it already holds, was seen
//! 2. follows its `$ref`, if any, to the addressed node (in this document, in
//!    a foreign document, or in a single-element file) and resolves that first
//! 3. stores the target's shared value in the node
//! 4. walks the value's own referencable children, against the location of
//!    the document that defines them
//!
//! Foreign documents are fetched, parsed and fully resolved once per call and
//! kept in a cache keyed by location. The cache entry exists before the
//! foreign document is walked, so files that reference each other terminate.
//! The caller's document is known by its location too, so a foreign file
//! pointing back at it lands on the caller's own nodes.
//!
//! A fragment may step through a node that is itself still a bare `$ref`
//! (`#/components/schemas/Alias/properties/id`). That node is resolved
//! before the pointer moves past it.
//!
//! Every address the engine tracks belongs to memory that stays alive until
//! the resolver is dropped: the caller's document is borrowed for the whole
//! call, and anything parsed on the way is retained.

mod entities;
mod visited;

use crate::codec;
use crate::document::*;
use crate::error::{NavError, ResolveError, Result};
use crate::fetch::Fetcher;
use crate::location::{rebase, reference_location, resolve, split_reference, Location};
use crate::pointer::{drill, parse_fragment, Node, Record};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};
use visited::VisitedSet;

/// A referencable entity kind: something that can sit behind a [`RefNode`].
///
/// Implemented for every kind the component registry holds, plus
/// [`crate::document::PathItem`].
pub trait Entity: Record + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Resolves every [`RefNode`] directly reachable from this value.
    fn resolve_children(
        &self,
        resolver: &mut Resolver<'_>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()>;
}

/// Counters describing one resolve call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    /// Distinct nodes entered.
    pub nodes_visited: usize,
    /// Distinct values whose children were walked.
    pub values_walked: usize,
    /// Foreign documents fetched and parsed.
    pub documents_loaded: usize,
    /// Single-element files fetched and parsed.
    pub elements_loaded: usize,
}

/// The node a fragment addressed: either one living in a document, or one
/// decoded from an untyped value.
enum Addressed<'d, T> {
    Borrowed(&'d RefNode<T>),
    Decoded(Arc<RefNode<T>>),
}

impl<T> Addressed<'_, T> {
    fn node(&self) -> &RefNode<T> {
        match self {
            Addressed::Borrowed(node) => node,
            Addressed::Decoded(node) => node,
        }
    }
}

/// Single-call resolution state. See the module docs.
pub struct Resolver<'f> {
    fetcher: &'f dyn Fetcher,
    external_refs_allowed: bool,
    /// The caller's document and its normalised location, so references
    /// from foreign files back into it land on the caller's own nodes.
    root: Option<(String, &'f Document)>,
    visited: VisitedSet,
    documents: HashMap<String, Arc<Document>>,
    elements: HashMap<(String, TypeId), Arc<dyn Any + Send + Sync>>,
    retained: Vec<Arc<dyn Any + Send + Sync>>,
    stats: ResolveStats,
}

impl<'f> Resolver<'f> {
    pub(crate) fn new(fetcher: &'f dyn Fetcher, external_refs_allowed: bool) -> Self {
        Resolver {
            fetcher,
            external_refs_allowed,
            root: None,
            visited: VisitedSet::default(),
            documents: HashMap::new(),
            elements: HashMap::new(),
            retained: Vec::new(),
            stats: ResolveStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> ResolveStats {
        ResolveStats {
            nodes_visited: self.visited.node_count(),
            ..self.stats
        }
    }

    /// Resolves every reference reachable from `document`.
    pub(crate) fn run(&mut self, document: &'f Document, location: Option<&Location>) -> Result<()> {
        if let Some(location) = location {
            self.root = Some((location.normalized().to_string(), document));
        }
        self.resolve_document(document, location)?;
        let stats = self.stats();
        info!(
            location = %location.map_or_else(|| "<memory>".to_string(), Location::to_string),
            nodes = stats.nodes_visited,
            values = stats.values_walked,
            documents = stats.documents_loaded,
            elements = stats.elements_loaded,
            "document resolved"
        );
        Ok(())
    }

    /// Loads `reference` as a single element and resolves its children.
    ///
    /// Fragment references inside the element are looked up in `context`.
    pub(crate) fn run_element<T: Entity>(
        &mut self,
        reference: &str,
        base: Option<&Location>,
        context: &Document,
    ) -> Result<Arc<T>> {
        let value = self.load_element::<T>(reference, base)?;
        let child_location = rebase(base, reference)?;
        self.walk(&value, context, child_location.as_ref())?;
        Ok(value)
    }

    /// Walks the component registry, then the path table.
    fn resolve_document(&mut self, document: &Document, location: Option<&Location>) -> Result<()> {
        let components = &document.components;
        self.resolve_all(components.headers.values(), document, location)?;
        self.resolve_all(components.parameters.values(), document, location)?;
        self.resolve_all(components.request_bodies.values(), document, location)?;
        self.resolve_all(components.responses.values(), document, location)?;
        self.resolve_all(components.schemas.values(), document, location)?;
        self.resolve_all(components.security_schemes.values(), document, location)?;
        self.resolve_all(components.examples.values(), document, location)?;
        self.resolve_all(components.links.values(), document, location)?;

        for (template, item) in &document.paths {
            if self.visited.enter_path(location, template) {
                self.resolve_node(item, document, location)?;
            }
        }
        Ok(())
    }

    pub(crate) fn resolve_all<'v, T: Entity>(
        &mut self,
        nodes: impl IntoIterator<Item = &'v RefNode<T>>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        for node in nodes {
            self.resolve_node(node, document, location)?;
        }
        Ok(())
    }

    /// Resolves one node and, through it, everything its value references.
    ///
    /// `document` is the document the node lives in; `location` is where
    /// relative references found in it are resolved from.
    pub(crate) fn resolve_node<T: Entity>(
        &mut self,
        node: &RefNode<T>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        if let Some(value) = node.shared() {
            if self.visited.has_value(T::KIND, value_id(value)) {
                return Ok(());
            }
        }
        if !self.visited.enter_node(node.id()) {
            return Ok(());
        }

        let value = match (node.reference(), node.shared()) {
            (_, Some(value)) => Arc::clone(value),
            (None, None) => return Err(ResolveError::EmptyNode { kind: T::KIND }),
            (Some(reference), None) => {
                debug!(kind = %T::KIND, reference, "following reference");
                let found = self.lookup::<T>(reference, document, location, &mut Vec::new())?;
                node.assign(Arc::clone(&found));
                // An in-progress alias may have been settled while the lookup ran.
                Arc::clone(node.shared().unwrap_or(&found))
            }
        };

        let child_location = match node.reference() {
            Some(reference) => rebase(location, reference)?,
            None => location.cloned(),
        };
        self.walk(&value, document, child_location.as_ref())
    }

    /// Resolves the children of `value` unless that value was already walked.
    fn walk<T: Entity>(
        &mut self,
        value: &Arc<T>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        if !self.visited.record_value(T::KIND, value_id(value)) {
            return Ok(());
        }
        self.stats.values_walked += 1;
        value.resolve_children(self, document, location)
    }

    /// Finds the value `reference` designates, resolving it first.
    ///
    /// `chase` holds the ids of in-progress alias nodes already followed
    /// while serving this one lookup.
    fn lookup<T: Entity>(
        &mut self,
        reference: &str,
        document: &Document,
        location: Option<&Location>,
        chase: &mut Vec<usize>,
    ) -> Result<Arc<T>> {
        let (target, fragment) = split_reference(reference);
        let fragment = match fragment {
            None => return self.load_element::<T>(reference, location),
            Some("") if !target.is_empty() => return self.load_element::<T>(reference, location),
            Some(fragment) => fragment,
        };

        if target.is_empty() {
            return self.lookup_fragment(reference, fragment, document, location, chase);
        }
        if !self.external_refs_allowed {
            return Err(ResolveError::ExternalRefNotAllowed {
                reference: reference.to_string(),
            });
        }
        let foreign_location = resolve(location, &reference_location(reference)?);
        if let Some(root) = self.root_at(&foreign_location) {
            return self.lookup_fragment(reference, fragment, root, Some(&foreign_location), chase);
        }
        let foreign = self.load_document(&foreign_location)?;
        self.lookup_fragment(reference, fragment, &foreign, Some(&foreign_location), chase)
    }

    fn lookup_fragment<T: Entity>(
        &mut self,
        reference: &str,
        fragment: &str,
        document: &Document,
        location: Option<&Location>,
        chase: &mut Vec<usize>,
    ) -> Result<Arc<T>> {
        let addressed = self.address::<T>(reference, fragment, document, location, chase)?;
        if let Addressed::Decoded(node) = &addressed {
            self.retained.push(Arc::clone(node) as Arc<dyn Any + Send + Sync>);
        }
        let target = addressed.node();
        self.resolve_node(target, document, location)?;
        if let Some(value) = target.shared() {
            return Ok(Arc::clone(value));
        }

        // The target is an alias still being resolved further up the stack.
        let next = target
            .reference()
            .ok_or(ResolveError::EmptyNode { kind: T::KIND })?
            .to_string();
        if chase.contains(&target.id()) {
            return Err(ResolveError::CyclicReference {
                reference: reference.to_string(),
            });
        }
        chase.push(target.id());
        debug!(reference, next = %next, "chasing in-progress alias");
        self.lookup(&next, document, location, chase)
    }

    fn root_at(&self, location: &Location) -> Option<&'f Document> {
        let (key, document) = self.root.as_ref()?;
        (*key == location.normalized().to_string()).then_some(*document)
    }

    /// Navigates `fragment` from the root of `document` and coerces the
    /// result into a node of kind `T`.
    ///
    /// A reference wrapper met on the way that has not been resolved yet is
    /// resolved before the pointer steps through it.
    fn address<'d, T: Entity>(
        &mut self,
        reference: &str,
        fragment: &str,
        document: &'d Document,
        location: Option<&Location>,
        chase: &mut Vec<usize>,
    ) -> Result<Addressed<'d, T>> {
        let segments = parse_fragment(fragment).ok_or_else(|| ResolveError::MalformedFragment {
            reference: reference.to_string(),
        })?;

        let mut cursor = Node::Record(document);
        for (index, segment) in segments.iter().enumerate() {
            if let Node::Record(record) = &cursor {
                if segment != REF_KEY {
                    self.settle_wrapper(*record, document, location, chase)?;
                }
            }
            trace!(segment = %segment, from = cursor.shape(), "drill");
            cursor = drill(cursor, segment)
                .and_then(|node| {
                    if node.is_null() {
                        Err(NavError::NullValue(segment.clone()))
                    } else {
                        Ok(node)
                    }
                })
                .map_err(|source| ResolveError::FragmentPartNotFound {
                    reference: reference.to_string(),
                    path: segments[..index].join("/"),
                    segment: segment.clone(),
                    source,
                })?;
        }
        coerce(reference, cursor)
    }

    /// Resolves `record` if it is an unresolved reference wrapper.
    fn settle_wrapper(
        &mut self,
        record: &dyn Record,
        document: &Document,
        location: Option<&Location>,
        chase: &mut Vec<usize>,
    ) -> Result<()> {
        macro_rules! settle_kinds {
            ($($ty:ty),*) => {$(
                if let Some(node) = record.as_any().downcast_ref::<RefNode<$ty>>() {
                    return self.settle(node, document, location, chase);
                }
            )*};
        }
        settle_kinds!(
            Schema,
            Parameter,
            Header,
            RequestBody,
            Response,
            Example,
            SecurityScheme,
            Link,
            PathItem
        );
        Ok(())
    }

    fn settle<T: Entity>(
        &mut self,
        node: &RefNode<T>,
        document: &Document,
        location: Option<&Location>,
        chase: &mut Vec<usize>,
    ) -> Result<()> {
        let Some(reference) = node.reference() else {
            return Ok(());
        };
        if node.is_resolved() {
            return Ok(());
        }
        self.resolve_node(node, document, location)?;
        if node.is_resolved() {
            return Ok(());
        }

        // Still in progress further up the stack.
        if chase.contains(&node.id()) {
            return Err(ResolveError::CyclicReference {
                reference: reference.to_string(),
            });
        }
        chase.push(node.id());
        debug!(reference, "settling in-progress wrapper");
        let value = self.lookup::<T>(reference, document, location, chase)?;
        node.assign(value);
        Ok(())
    }

    /// Fetches, parses and resolves the foreign document at `location`, once
    /// per call.
    fn load_document(&mut self, location: &Location) -> Result<Arc<Document>> {
        let key = location.to_string();
        if let Some(document) = self.documents.get(&key) {
            return Ok(Arc::clone(document));
        }
        debug!(location = %key, "loading foreign document");
        let bytes = self.fetch(location)?;
        let document: Document =
            codec::parse(&bytes, Some(location)).map_err(|source| ResolveError::Format {
                origin: key.clone(),
                source,
            })?;
        let document = Arc::new(document);
        self.documents.insert(key, Arc::clone(&document));
        self.stats.documents_loaded += 1;
        self.resolve_document(&document, Some(location))?;
        Ok(document)
    }

    /// Fetches and parses a file holding exactly one `T`, once per call.
    fn load_element<T: Entity>(&mut self, reference: &str, base: Option<&Location>) -> Result<Arc<T>> {
        // `''` names neither a file nor a fragment.
        if reference.is_empty() {
            return Err(ResolveError::malformed(reference, "empty reference"));
        }
        if !self.external_refs_allowed {
            return Err(ResolveError::ExternalRefNotAllowed {
                reference: reference.to_string(),
            });
        }
        if let (_, Some(fragment)) = split_reference(reference) {
            if !fragment.is_empty() {
                return Err(ResolveError::malformed(
                    reference,
                    "a single-element reference cannot carry a fragment",
                ));
            }
        }
        let location = resolve(base, &reference_location(reference)?);
        let key = (location.to_string(), TypeId::of::<T>());
        if let Some(cached) = self.elements.get(&key) {
            if let Ok(value) = Arc::clone(cached).downcast::<T>() {
                return Ok(value);
            }
        }

        debug!(kind = %T::KIND, location = %location, "loading single element");
        let bytes = self.fetch(&location)?;
        let value: T = codec::parse(&bytes, Some(&location)).map_err(|source| ResolveError::Format {
            origin: location.to_string(),
            source,
        })?;
        let value = Arc::new(value);
        self.elements
            .insert(key, Arc::clone(&value) as Arc<dyn Any + Send + Sync>);
        self.stats.elements_loaded += 1;
        Ok(value)
    }

    fn fetch(&self, location: &Location) -> Result<Vec<u8>> {
        self.fetcher
            .fetch(location)
            .map_err(|source| ResolveError::Fetch {
                location: location.to_string(),
                source,
            })
    }
}

fn value_id<T>(value: &Arc<T>) -> usize {
    Arc::as_ptr(value) as usize
}

/// Coerces the node a fragment addressed into a node of kind `T`.
fn coerce<'d, T: Entity>(reference: &str, node: Node<'d>) -> Result<Addressed<'d, T>> {
    let bad_data = |reason: String| ResolveError::BadReferenceData {
        reference: reference.to_string(),
        kind: T::KIND,
        reason,
    };
    match node {
        Node::Record(record) => record
            .as_any()
            .downcast_ref::<RefNode<T>>()
            .map(Addressed::Borrowed)
            .ok_or_else(|| bad_data("found an object of another kind".to_string())),
        Node::Value(value) if value.is_object() => {
            let value: Value = value.into_owned();
            RefNode::<T>::from_json(value)
                .map(|node| Addressed::Decoded(Arc::new(node)))
                .map_err(|err| bad_data(err.to_string()))
        }
        other => Err(bad_data(format!("found a {}", other.shape()))),
    }
}
