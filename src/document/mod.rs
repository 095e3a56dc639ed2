//! # Document Module
//!
//! The in-memory shape of an OpenAPI 3 document as the resolver sees it.
//!
//! ## Overview
//!
//! Only the structure needed to reach every `$ref` is typed: the component
//! registry, the path table, operations, and the entity kinds that can
//! themselves contain references. Everything else a document may carry is
//! preserved untyped, either as a [`serde_json::Value`] field or in the
//! flattened `extensions` side table of the enclosing object.
//!
//! Every referencable position is a [`RefNode`]: a slot holding the raw
//! `$ref` string and, once resolution succeeds, an `Arc` of the target value.
//!
//! ## Example
//!
//! ```rust
//! use oas_resolver::document::Document;
//!
//! let doc: Document = serde_json::from_str(r##"{
//!     "openapi": "3.0.3",
//!     "components": { "schemas": { "Pet": { "$ref": "#/components/schemas/Animal" } } }
//! }"##).unwrap();
//! let pet = &doc.components.schemas["Pet"];
//! assert_eq!(pet.reference(), Some("#/components/schemas/Animal"));
//! assert!(!pet.is_resolved());
//! ```

mod ref_node;
mod types;

pub use ref_node::{RefNode, REF_KEY};
pub use types::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Root of an OpenAPI document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub openapi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Value>,
    /// URL templates mapped to their path items.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, RefNode<PathItem>>,
    #[serde(default)]
    pub components: Components,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// The component registry: one named map per entity kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, RefNode<Schema>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, RefNode<Parameter>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, RefNode<Header>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_bodies: BTreeMap<String, RefNode<RequestBody>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, RefNode<Response>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, RefNode<Example>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, RefNode<SecurityScheme>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, RefNode<Link>>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// The referencable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Schema,
    Parameter,
    Header,
    RequestBody,
    Response,
    Example,
    SecurityScheme,
    Link,
    PathItem,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Schema => "schema",
            EntityKind::Parameter => "parameter",
            EntityKind::Header => "header",
            EntityKind::RequestBody => "requestBody",
            EntityKind::Response => "response",
            EntityKind::Example => "example",
            EntityKind::SecurityScheme => "securityScheme",
            EntityKind::Link => "link",
            EntityKind::PathItem => "pathItem",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
