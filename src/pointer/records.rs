use super::{AsNode, Node, Record};
use crate::document::*;
use std::any::Any;

/// Implements [`Record`] and [`AsNode`] for a typed object from a table of
/// serialized member names. Every listed type carries an `extensions` map.
macro_rules! records {
    ($($ty:ty { $($name:literal => $field:ident),* $(,)? })*) => {$(
        impl Record for $ty {
            fn field(&self, name: &str) -> Option<Node<'_>> {
                match name {
                    $($name => self.$field.as_node(),)*
                    _ => None,
                }
            }

            fn extensions(&self) -> Option<&Extensions> {
                Some(&self.extensions)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        impl AsNode for $ty {
            fn as_node(&self) -> Option<Node<'_>> {
                Some(Node::Record(self))
            }
        }
    )*};
}

records! {
    Document {
        "openapi" => openapi,
        "info" => info,
        "servers" => servers,
        "paths" => paths,
        "components" => components,
        "security" => security,
        "tags" => tags,
        "externalDocs" => external_docs,
    }
    Components {
        "schemas" => schemas,
        "parameters" => parameters,
        "headers" => headers,
        "requestBodies" => request_bodies,
        "responses" => responses,
        "examples" => examples,
        "securitySchemes" => security_schemes,
        "links" => links,
    }
    PathItem {
        "summary" => summary,
        "description" => description,
        "get" => get,
        "put" => put,
        "post" => post,
        "delete" => delete,
        "options" => options,
        "head" => head,
        "patch" => patch,
        "trace" => trace,
        "servers" => servers,
        "parameters" => parameters,
    }
    Operation {
        "tags" => tags,
        "summary" => summary,
        "description" => description,
        "operationId" => operation_id,
        "parameters" => parameters,
        "requestBody" => request_body,
        "responses" => responses,
        "deprecated" => deprecated,
        "security" => security,
        "servers" => servers,
    }
    Schema {
        "type" => schema_type,
        "format" => format,
        "title" => title,
        "description" => description,
        "required" => required,
        "enum" => enum_values,
        "default" => default,
        "example" => example,
        "items" => items,
        "properties" => properties,
        "additionalProperties" => additional_properties,
        "not" => not,
        "allOf" => all_of,
        "anyOf" => any_of,
        "oneOf" => one_of,
    }
    Parameter {
        "name" => name,
        "in" => location,
        "description" => description,
        "required" => required,
        "deprecated" => deprecated,
        "style" => style,
        "explode" => explode,
        "schema" => schema,
        "content" => content,
        "example" => example,
        "examples" => examples,
    }
    Header {
        "description" => description,
        "required" => required,
        "deprecated" => deprecated,
        "style" => style,
        "explode" => explode,
        "schema" => schema,
        "content" => content,
        "example" => example,
        "examples" => examples,
    }
    RequestBody {
        "description" => description,
        "required" => required,
        "content" => content,
    }
    Response {
        "description" => description,
        "headers" => headers,
        "content" => content,
        "links" => links,
    }
    MediaType {
        "schema" => schema,
        "example" => example,
        "examples" => examples,
        "encoding" => encoding,
    }
    Encoding {
        "contentType" => content_type,
        "headers" => headers,
        "style" => style,
        "explode" => explode,
        "allowReserved" => allow_reserved,
    }
    Example {
        "summary" => summary,
        "description" => description,
        "value" => value,
        "externalValue" => external_value,
    }
    SecurityScheme {
        "type" => scheme_type,
        "description" => description,
        "name" => name,
        "in" => location,
        "scheme" => scheme,
        "bearerFormat" => bearer_format,
        "flows" => flows,
        "openIdConnectUrl" => open_id_connect_url,
    }
    Link {
        "operationRef" => operation_ref,
        "operationId" => operation_id,
        "parameters" => parameters,
        "requestBody" => request_body,
        "description" => description,
        "server" => server,
    }
}

impl AsNode for AdditionalProperties {
    fn as_node(&self) -> Option<Node<'_>> {
        match self {
            AdditionalProperties::Allowed(allowed) => allowed.as_node(),
            AdditionalProperties::Schema(node) => node.as_node(),
        }
    }
}
