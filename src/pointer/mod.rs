//! # Pointer Module
//!
//! JSON-pointer navigation over the typed document tree.
//!
//! ## Overview
//!
//! A `$ref` fragment such as `#/components/schemas/Pet/properties/id` is a
//! slash-separated list of segments. [`drill`] consumes one segment at a time
//! and works on any node, whatever its concrete type, through a small closed
//! set of shapes:
//!
//! - [`Node::Mapping`] - string-keyed maps (the component registry, `properties`, ...)
//! - [`Node::Sequence`] - lists indexed by a non-negative integer (`allOf`, `parameters`, ...)
//! - [`Node::Record`] - typed objects matched by serialized field name, with two
//!   fallbacks: a [`crate::document::RefNode`] wrapper passes the lookup on to its resolved
//!   value, and objects with an extension side table are searched there last
//! - [`Node::Value`] - untyped JSON, navigated as object or array
//!
//! ```rust
//! use oas_resolver::document::Document;
//! use oas_resolver::pointer::{navigate, parse_fragment, Node};
//!
//! let doc: Document = serde_json::from_str(r#"{
//!     "components": { "schemas": { "Pet": { "properties": { "a/b": { "type": "string" } } } } }
//! }"#).unwrap();
//! let segments = parse_fragment("/components/schemas/Pet/properties/a~1b").unwrap();
//! let node = navigate(Node::Record(&doc), &segments).unwrap();
//! assert!(matches!(node, Node::Record(_)));
//! ```

mod records;


use crate::document::{Extensions, RefNode, REF_KEY};
use crate::error::NavError;
use serde_json::Value;
use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// A borrowed view of any navigable document node.
pub enum Node<'a> {
    Mapping(&'a dyn Mapping),
    Sequence(&'a dyn Sequence),
    Record(&'a dyn Record),
    Value(Cow<'a, Value>),
}

impl Node<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Value(value) if value.is_null())
    }

    /// Short name of the node shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Record(_) => "record",
            Node::Value(value) => match value.as_ref() {
                Value::Object(_) => "object",
                Value::Array(_) => "array",
                Value::Null => "null",
                _ => "scalar",
            },
        }
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Value(value) => f.debug_tuple("Value").field(value).finish(),
            other => write!(f, "Node::{}", other.shape()),
        }
    }
}

/// A string-keyed map node.
pub trait Mapping {
    fn entry(&self, key: &str) -> Option<Node<'_>>;
}

/// An integer-indexed list node.
pub trait Sequence {
    fn len(&self) -> usize;
    fn element(&self, index: usize) -> Option<Node<'_>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A typed object with named fields.
pub trait Record: Any {
    /// The field whose serialized name is `name`, if present and set.
    fn field(&self, name: &str) -> Option<Node<'_>>;

    /// For reference wrappers: the resolved value to search when no field matched.
    fn wrapped(&self) -> Option<Node<'_>> {
        None
    }

    /// Side table of unrecognised members, searched last.
    fn extensions(&self) -> Option<&Extensions> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Conversion of a field value into a navigable node. `None` means the
/// field is absent.
pub trait AsNode {
    fn as_node(&self) -> Option<Node<'_>>;
}

impl<T: AsNode> Mapping for BTreeMap<String, T> {
    fn entry(&self, key: &str) -> Option<Node<'_>> {
        self.get(key).and_then(AsNode::as_node)
    }
}

impl<T: AsNode> Sequence for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn element(&self, index: usize) -> Option<Node<'_>> {
        self.get(index).and_then(AsNode::as_node)
    }
}

impl<T: AsNode> AsNode for BTreeMap<String, T> {
    fn as_node(&self) -> Option<Node<'_>> {
        Some(Node::Mapping(self))
    }
}

impl<T: AsNode> AsNode for Vec<T> {
    fn as_node(&self) -> Option<Node<'_>> {
        Some(Node::Sequence(self))
    }
}

impl<T: AsNode> AsNode for Option<T> {
    fn as_node(&self) -> Option<Node<'_>> {
        self.as_ref().and_then(AsNode::as_node)
    }
}

impl AsNode for Value {
    fn as_node(&self) -> Option<Node<'_>> {
        Some(Node::Value(Cow::Borrowed(self)))
    }
}

impl AsNode for String {
    fn as_node(&self) -> Option<Node<'_>> {
        Some(Node::Value(Cow::Owned(Value::String(self.clone()))))
    }
}

impl AsNode for bool {
    fn as_node(&self) -> Option<Node<'_>> {
        Some(Node::Value(Cow::Owned(Value::Bool(*self))))
    }
}

impl<T: Record> AsNode for RefNode<T> {
    fn as_node(&self) -> Option<Node<'_>> {
        Some(Node::Record(self))
    }
}

impl<T: Record> Record for RefNode<T> {
    fn field(&self, name: &str) -> Option<Node<'_>> {
        match name {
            REF_KEY => self.reference().map(|r| Node::Value(Cow::Owned(Value::from(r)))),
            _ => None,
        }
    }

    fn wrapped(&self) -> Option<Node<'_>> {
        self.value().map(|value| Node::Record(value as &dyn Record))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Steps from `node` into the child addressed by one unescaped `segment`.
pub fn drill<'a>(node: Node<'a>, segment: &str) -> Result<Node<'a>, NavError> {
    match node {
        Node::Mapping(map) => map
            .entry(segment)
            .ok_or_else(|| NavError::KeyNotFound(segment.to_string())),
        Node::Sequence(seq) => parse_index(segment)
            .filter(|&index| index < seq.len())
            .and_then(|index| seq.element(index))
            .ok_or_else(|| NavError::IndexOutOfBounds(segment.to_string())),
        Node::Record(record) => drill_record(record, segment),
        Node::Value(value) => drill_value(value, segment),
    }
}

fn drill_record<'a>(record: &'a dyn Record, segment: &str) -> Result<Node<'a>, NavError> {
    if let Some(node) = record.field(segment) {
        return Ok(node);
    }
    if let Some(inner) = record.wrapped() {
        return drill(inner, segment);
    }
    if let Some(value) = record.extensions().and_then(|ext| ext.get(segment)) {
        return Ok(Node::Value(Cow::Borrowed(value)));
    }
    Err(NavError::FieldNotFound(segment.to_string()))
}

fn drill_value<'a>(value: Cow<'a, Value>, segment: &str) -> Result<Node<'a>, NavError> {
    match value {
        Cow::Borrowed(value) => step_value(value, segment).map(|v| Node::Value(Cow::Borrowed(v))),
        Cow::Owned(value) => {
            step_value(&value, segment).map(|v| Node::Value(Cow::Owned(v.clone())))
        }
    }
}

fn step_value<'v>(value: &'v Value, segment: &str) -> Result<&'v Value, NavError> {
    match value {
        Value::Object(map) => map
            .get(segment)
            .ok_or_else(|| NavError::KeyNotFound(segment.to_string())),
        Value::Array(items) => parse_index(segment)
            .and_then(|index| items.get(index))
            .ok_or_else(|| NavError::IndexOutOfBounds(segment.to_string())),
        _ => Err(NavError::NotNavigable(segment.to_string())),
    }
}

/// Digits only: no sign, no whitespace.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Walks `segments` from `root`, failing on the first segment that cannot be
/// found or that yields `null`. The error carries the index of that segment.
pub fn navigate<'a>(root: Node<'a>, segments: &[String]) -> Result<Node<'a>, (usize, NavError)> {
    let mut cursor = root;
    for (index, segment) in segments.iter().enumerate() {
        trace!(segment = %segment, from = cursor.shape(), "drill");
        cursor = drill(cursor, segment).map_err(|err| (index, err))?;
        if cursor.is_null() {
            return Err((index, NavError::NullValue(segment.clone())));
        }
    }
    Ok(cursor)
}

/// JSON-pointer unescaping: `~1` becomes `/`, then `~0` becomes `~`.
pub fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Splits a fragment (without the leading `#`) into unescaped segments.
///
/// The fragment must start with `/`; each segment is percent-decoded, then
/// JSON-pointer unescaped. Returns `None` when the prefix is missing.
pub fn parse_fragment(fragment: &str) -> Option<Vec<String>> {
    let rest = fragment.strip_prefix('/')?;
    Some(
        rest.split('/')
            .map(|raw| {
                let decoded = urlencoding::decode(raw)
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| raw.to_string());
                unescape_segment(&decoded)
            })
            .collect(),
    )
}
