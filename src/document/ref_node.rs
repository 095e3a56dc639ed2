use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Member name that marks an object as a reference.
pub const REF_KEY: &str = "$ref";

/// An addressable slot that is either a `$ref` or an inline value.
///
/// The resolved value is written at most once, by the resolver. It is held in
/// an [`Arc`] so two nodes referencing the same target share one value:
/// [`RefNode::shared`] of both returns pointers for which [`Arc::ptr_eq`]
/// holds.
///
/// Node identity (its address) is what the resolver tracks for cycle
/// detection, so a document must not move while it is being resolved. The
/// loader enforces this by borrowing the document mutably for the duration of
/// the call.
pub struct RefNode<T> {
    reference: Option<String>,
    resolved: OnceLock<Arc<T>>,
}

impl<T> RefNode<T> {
    /// A node pointing at `reference`, to be filled in by the resolver.
    pub fn new_ref(reference: impl Into<String>) -> Self {
        RefNode {
            reference: Some(reference.into()),
            resolved: OnceLock::new(),
        }
    }

    /// An already-resolved inline node.
    pub fn inline(value: T) -> Self {
        Self::from_shared(Arc::new(value))
    }

    pub fn from_shared(value: Arc<T>) -> Self {
        RefNode {
            reference: None,
            resolved: OnceLock::from(value),
        }
    }

    /// The raw `$ref` string, if this node is a reference.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<&T> {
        self.resolved.get().map(Arc::as_ref)
    }

    /// The resolved value as the shared pointer other nodes may alias.
    pub fn shared(&self) -> Option<&Arc<T>> {
        self.resolved.get()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Stores the resolved value. Returns `false` when one was already set.
    pub(crate) fn assign(&self, value: Arc<T>) -> bool {
        self.resolved.set(value).is_ok()
    }

    /// Address-based identity of this node.
    pub(crate) fn id(&self) -> usize {
        std::ptr::from_ref(self) as usize
    }
}

impl<T> Default for RefNode<T> {
    fn default() -> Self {
        RefNode {
            reference: None,
            resolved: OnceLock::new(),
        }
    }
}

impl<T> Clone for RefNode<T> {
    fn clone(&self) -> Self {
        RefNode {
            reference: self.reference.clone(),
            resolved: self.resolved.clone(),
        }
    }
}

// Resolved references are not expanded: a cyclic graph would never finish printing.
impl<T: fmt::Debug> fmt::Debug for RefNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.reference, self.resolved.get()) {
            (Some(reference), resolved) => f
                .debug_struct("RefNode")
                .field("reference", reference)
                .field("resolved", &resolved.is_some())
                .finish(),
            (None, Some(value)) => f.debug_tuple("RefNode").field(value).finish(),
            (None, None) => f.write_str("RefNode(<empty>)"),
        }
    }
}

impl<T: Serialize> Serialize for RefNode<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (&self.reference, self.resolved.get()) {
            (Some(reference), _) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(REF_KEY, reference)?;
                map.end()
            }
            (None, Some(value)) => value.as_ref().serialize(serializer),
            (None, None) => serializer.serialize_unit(),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for RefNode<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RefNode::from_json(value).map_err(D::Error::custom)
    }
}

impl<T: DeserializeOwned> RefNode<T> {
    /// Decodes a node from a generic JSON value.
    ///
    /// `{"$ref": ...}` becomes a reference (sibling members are ignored),
    /// `null` an empty node, anything else an inline value.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        if let Some(reference) = value.get(REF_KEY).and_then(Value::as_str) {
            return Ok(RefNode::new_ref(reference));
        }
        if value.is_null() {
            return Ok(RefNode::default());
        }
        T::deserialize(value).map(RefNode::inline)
    }
}
