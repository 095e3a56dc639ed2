//! Which children each entity kind walks.

use super::{Entity, Resolver};
use crate::document::*;
use crate::error::{ResolveError, Result};
use crate::location::Location;
use std::collections::BTreeMap;

impl Entity for Schema {
    const KIND: EntityKind = EntityKind::Schema;

    fn resolve_children(
        &self,
        resolver: &mut Resolver<'_>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        if let Some(items) = &self.items {
            resolver.resolve_node(items, document, location)?;
        }
        resolver.resolve_all(self.properties.values(), document, location)?;
        if let Some(AdditionalProperties::Schema(schema)) = &self.additional_properties {
            resolver.resolve_node(schema, document, location)?;
        }
        if let Some(not) = &self.not {
            resolver.resolve_node(not, document, location)?;
        }
        resolver.resolve_all(&self.all_of, document, location)?;
        resolver.resolve_all(&self.any_of, document, location)?;
        resolver.resolve_all(&self.one_of, document, location)
    }
}

impl Entity for Parameter {
    const KIND: EntityKind = EntityKind::Parameter;

    fn resolve_children(
        &self,
        resolver: &mut Resolver<'_>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        if self.schema.is_some() && !self.content.is_empty() {
            return Err(ResolveError::SchemaContentConflict {
                kind: Self::KIND,
                name: Some(self.name.clone()),
            });
        }
        resolve_content(resolver, &self.content, document, location)?;
        if let Some(schema) = &self.schema {
            resolver.resolve_node(schema, document, location)?;
        }
        resolver.resolve_all(self.examples.values(), document, location)
    }
}

impl Entity for Header {
    const KIND: EntityKind = EntityKind::Header;

    fn resolve_children(
        &self,
        resolver: &mut Resolver<'_>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        if self.schema.is_some() && !self.content.is_empty() {
            return Err(ResolveError::SchemaContentConflict {
                kind: Self::KIND,
                name: None,
            });
        }
        resolve_content(resolver, &self.content, document, location)?;
        if let Some(schema) = &self.schema {
            resolver.resolve_node(schema, document, location)?;
        }
        resolver.resolve_all(self.examples.values(), document, location)
    }
}

impl Entity for RequestBody {
    const KIND: EntityKind = EntityKind::RequestBody;

    fn resolve_children(
        &self,
        resolver: &mut Resolver<'_>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        resolve_content(resolver, &self.content, document, location)
    }
}

impl Entity for Response {
    const KIND: EntityKind = EntityKind::Response;

    fn resolve_children(
        &self,
        resolver: &mut Resolver<'_>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        resolver.resolve_all(self.headers.values(), document, location)?;
        resolve_content(resolver, &self.content, document, location)?;
        resolver.resolve_all(self.links.values(), document, location)
    }
}

impl Entity for PathItem {
    const KIND: EntityKind = EntityKind::PathItem;

    fn resolve_children(
        &self,
        resolver: &mut Resolver<'_>,
        document: &Document,
        location: Option<&Location>,
    ) -> Result<()> {
        resolver.resolve_all(&self.parameters, document, location)?;
        for (_, operation) in self.operations() {
            resolver.resolve_all(&operation.parameters, document, location)?;
            if let Some(body) = &operation.request_body {
                resolver.resolve_node(body, document, location)?;
            }
            resolver.resolve_all(operation.responses.values(), document, location)?;
        }
        Ok(())
    }
}

/// Kinds whose values hold no further references.
macro_rules! leaf_entities {
    ($($ty:ident),*) => {$(
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn resolve_children(
                &self,
                _resolver: &mut Resolver<'_>,
                _document: &Document,
                _location: Option<&Location>,
            ) -> Result<()> {
                Ok(())
            }
        }
    )*};
}

leaf_entities!(Example, SecurityScheme, Link);

/// Media types are not referencable themselves; their schema, examples and
/// encoding headers are.
fn resolve_content(
    resolver: &mut Resolver<'_>,
    content: &BTreeMap<String, MediaType>,
    document: &Document,
    location: Option<&Location>,
) -> Result<()> {
    for media in content.values() {
        if let Some(schema) = &media.schema {
            resolver.resolve_node(schema, document, location)?;
        }
        resolver.resolve_all(media.examples.values(), document, location)?;
        for encoding in media.encoding.values() {
            resolver.resolve_all(encoding.headers.values(), document, location)?;
        }
    }
    Ok(())
}
