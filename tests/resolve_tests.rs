#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use oas_resolver::document::{AdditionalProperties, Schema};
use oas_resolver::{Document, EntityKind, Loader, NavError, ResolveError};
use serde_json::json;
use std::sync::Arc;

fn load(yaml: &str) -> Result<Document, ResolveError> {
    Loader::new().load_from_bytes(yaml.as_bytes())
}

fn schema<'d>(doc: &'d Document, name: &str) -> &'d Arc<Schema> {
    doc.components.schemas[name]
        .shared()
        .unwrap_or_else(|| panic!("schema {name} unresolved"))
}

const SHARED_TARGET: &str = r##"
openapi: 3.0.3
components:
  schemas:
    A:
      $ref: '#/components/schemas/Target'
    B:
      $ref: '#/components/schemas/Target'
    Target:
      type: object
      properties:
        name:
          type: string
"##;

#[test]
fn test_references_share_one_value() {
    let loader = Loader::new();
    let doc = loader.load_from_bytes(SHARED_TARGET.as_bytes()).unwrap();

    let target = schema(&doc, "Target");
    assert!(Arc::ptr_eq(schema(&doc, "A"), target));
    assert!(Arc::ptr_eq(schema(&doc, "B"), target));
    assert_eq!(target.schema_type, Some(json!("object")));

    // Target and its `name` property, each walked once.
    let stats = loader.last_stats().unwrap();
    assert_eq!(stats.values_walked, 2);
    assert_eq!(stats.nodes_visited, 4);
    assert_eq!(stats.documents_loaded, 0);
}

#[test]
fn test_self_referencing_properties_terminate() {
    let doc = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Node:
      type: object
      properties:
        next:
          $ref: '#/components/schemas/Node'
        children:
          type: array
          items:
            $ref: '#/components/schemas/Node'
"##,
    )
    .unwrap();

    let node = schema(&doc, "Node");
    let next = node.properties["next"].shared().unwrap();
    assert!(Arc::ptr_eq(next, node));
    let items = node.properties["children"].value().unwrap().items.as_ref().unwrap();
    assert!(Arc::ptr_eq(items.shared().unwrap(), node));
}

#[test]
fn test_alias_into_all_of_cycle() {
    let doc = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Pet:
      $ref: '#/components/schemas/Animal'
    Animal:
      description: base
      allOf:
        - $ref: '#/components/schemas/Pet'
"##,
    )
    .unwrap();

    let animal = schema(&doc, "Animal");
    assert!(Arc::ptr_eq(schema(&doc, "Pet"), animal));
    assert!(Arc::ptr_eq(animal.all_of[0].shared().unwrap(), animal));
}

#[test]
fn test_pure_alias_cycle_is_an_error() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    A:
      $ref: '#/components/schemas/B'
    B:
      $ref: '#/components/schemas/A'
"##,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::CyclicReference { .. }), "{err}");

    let err = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Me:
      $ref: '#/components/schemas/Me'
"##,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::CyclicReference { .. }), "{err}");
}

fn deep_alias_spec(referrer: &str) -> String {
    format!(
        r##"
openapi: 3.0.3
components:
  schemas:
    {referrer}:
      $ref: '#/components/schemas/B/properties/x'
    B:
      $ref: '#/components/schemas/C'
    C:
      properties:
        x:
          type: string
"##
    )
}

#[test]
fn test_fragment_through_unresolved_alias() {
    // "A" is walked before its alias "B", "Z" after it.
    for referrer in ["A", "Z"] {
        let doc = load(&deep_alias_spec(referrer)).unwrap_or_else(|err| panic!("{referrer}: {err}"));
        let c = schema(&doc, "C");
        assert!(Arc::ptr_eq(schema(&doc, "B"), c));
        let x = c.properties["x"].shared().unwrap();
        assert!(Arc::ptr_eq(schema(&doc, referrer), x), "{referrer}");
        assert_eq!(x.schema_type, Some(json!("string")));
    }
}

#[test]
fn test_fragment_through_itself_is_cyclic() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Loop:
      $ref: '#/components/schemas/Loop/properties/x'
"##,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::CyclicReference { .. }), "{err}");
}

#[test]
fn test_empty_reference_is_malformed() {
    let spec = "openapi: 3.0.3\ncomponents:\n  schemas:\n    Blank:\n      $ref: ''\n";
    for loader in [Loader::new(), Loader::new().allow_external_refs(true)] {
        let err = loader.load_from_bytes(spec.as_bytes()).unwrap_err();
        match err {
            ResolveError::MalformedReference { reference, .. } => assert_eq!(reference, ""),
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[test]
fn test_escaped_and_encoded_segments() {
    let doc = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    a/b~c:
      type: string
    Slash:
      $ref: '#/components/schemas/a~1b~0c'
    Spaced name:
      type: integer
    Encoded:
      $ref: '#/components/schemas/Spaced%20name'
"##,
    )
    .unwrap();
    assert!(Arc::ptr_eq(schema(&doc, "Slash"), schema(&doc, "a/b~c")));
    assert!(Arc::ptr_eq(schema(&doc, "Encoded"), schema(&doc, "Spaced name")));
}

#[test]
fn test_missing_segment_reports_path() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Pet:
      $ref: '#/components/schemas/Missing/properties/id'
"##,
    )
    .unwrap_err();
    match err {
        ResolveError::FragmentPartNotFound {
            reference,
            path,
            segment,
            source,
        } => {
            assert_eq!(reference, "#/components/schemas/Missing/properties/id");
            assert_eq!(path, "components/schemas");
            assert_eq!(segment, "Missing");
            assert_eq!(source, NavError::KeyNotFound("Missing".into()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fragment_without_slash_is_malformed() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Pet:
      $ref: '#components/schemas/Other'
"##,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::MalformedFragment { .. }), "{err}");
}

#[test]
fn test_wrong_shape_is_bad_reference_data() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Pet:
      $ref: '#/components/schemas'
"##,
    )
    .unwrap_err();
    assert!(
        matches!(
            err,
            ResolveError::BadReferenceData {
                kind: EntityKind::Schema,
                ..
            }
        ),
        "{err}"
    );

    let err = load(
        r##"
openapi: 3.0.3
components:
  parameters:
    Id:
      $ref: '#/openapi'
"##,
    )
    .unwrap_err();
    assert!(
        matches!(
            err,
            ResolveError::BadReferenceData {
                kind: EntityKind::Parameter,
                ..
            }
        ),
        "{err}"
    );
}

#[test]
fn test_schema_and_content_conflict_before_children() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  parameters:
    Filter:
      name: filter
      in: query
      schema:
        type: string
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/DoesNotExist'
"##,
    )
    .unwrap_err();
    match err {
        ResolveError::SchemaContentConflict { kind, name } => {
            assert_eq!(kind, EntityKind::Parameter);
            assert_eq!(name.as_deref(), Some("filter"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_header_conflict_has_no_name() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  headers:
    RateLimit:
      schema:
        type: integer
      content:
        text/plain:
          schema:
            type: integer
"##,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "header cannot contain both schema and content");
    assert!(matches!(
        err,
        ResolveError::SchemaContentConflict {
            kind: EntityKind::Header,
            name: None
        }
    ));
}

#[test]
fn test_empty_node_is_an_error() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Nothing: null
"##,
    )
    .unwrap_err();
    assert!(
        matches!(
            err,
            ResolveError::EmptyNode {
                kind: EntityKind::Schema
            }
        ),
        "{err}"
    );
}

#[test]
fn test_reference_into_extension_value() {
    let doc = load(
        r##"
openapi: 3.0.3
x-library:
  Money:
    type: object
    properties:
      currency:
        $ref: '#/components/schemas/Currency'
components:
  schemas:
    Price:
      $ref: '#/x-library/Money'
    Currency:
      type: string
"##,
    )
    .unwrap();
    let price = schema(&doc, "Price");
    assert_eq!(price.schema_type, Some(json!("object")));
    let currency = price.properties["currency"].shared().unwrap();
    assert!(Arc::ptr_eq(currency, schema(&doc, "Currency")));
}

#[test]
fn test_additional_properties_and_composition() {
    let doc = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Tag:
      type: string
    Tags:
      type: object
      additionalProperties:
        $ref: '#/components/schemas/Tag'
    Either:
      oneOf:
        - $ref: '#/components/schemas/Tag'
      anyOf:
        - $ref: '#/components/schemas/Tags'
      not:
        $ref: '#/components/schemas/Tag'
"##,
    )
    .unwrap();
    let tag = schema(&doc, "Tag");
    match &schema(&doc, "Tags").additional_properties {
        Some(AdditionalProperties::Schema(node)) => assert!(Arc::ptr_eq(node.shared().unwrap(), tag)),
        other => panic!("unexpected additionalProperties: {other:?}"),
    }
    let either = schema(&doc, "Either");
    assert!(Arc::ptr_eq(either.one_of[0].shared().unwrap(), tag));
    assert!(Arc::ptr_eq(either.any_of[0].shared().unwrap(), schema(&doc, "Tags")));
    assert!(Arc::ptr_eq(either.not.as_ref().unwrap().shared().unwrap(), tag));
}

const PETSTORE: &str = r##"
openapi: 3.0.3
info:
  title: Pets
  version: "1.0"
paths:
  /alias:
    $ref: '#/paths/~1pets~1{id}'
  /pets/{id}:
    parameters:
      - $ref: '#/components/parameters/Id'
    post:
      operationId: update_pet
      parameters:
        - name: dry_run
          in: query
          schema:
            type: boolean
      requestBody:
        $ref: '#/components/requestBodies/PetBody'
      responses:
        200:
          $ref: '#/components/responses/PetOk'
        default:
          description: error
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'
components:
  parameters:
    Id:
      name: id
      in: path
      required: true
      schema:
        type: string
      examples:
        sample:
          $ref: '#/components/examples/IdSample'
  headers:
    Rate:
      schema:
        type: integer
  examples:
    IdSample:
      value: pet-1
    PetSample:
      value:
        id: pet-1
  links:
    SelfLink:
      operationId: update_pet
  securitySchemes:
    ApiKey:
      type: apiKey
      name: X-Api-Key
      in: header
    Alias:
      $ref: '#/components/securitySchemes/ApiKey'
  requestBodies:
    PetBody:
      required: true
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Pet'
          encoding:
            tags:
              headers:
                X-Tag:
                  $ref: '#/components/headers/Rate'
  responses:
    PetOk:
      description: ok
      headers:
        X-Rate:
          $ref: '#/components/headers/Rate'
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Pet'
          examples:
            one:
              $ref: '#/components/examples/PetSample'
      links:
        self:
          $ref: '#/components/links/SelfLink'
  schemas:
    Pet:
      type: object
      properties:
        id:
          type: string
    Error:
      type: object
"##;

#[test]
fn test_paths_operations_and_components() {
    let doc = load(PETSTORE).unwrap();
    let components = &doc.components;

    let item = doc.paths["/pets/{id}"].shared().unwrap();
    assert!(Arc::ptr_eq(doc.paths["/alias"].shared().unwrap(), item));
    assert!(Arc::ptr_eq(
        item.parameters[0].shared().unwrap(),
        components.parameters["Id"].shared().unwrap()
    ));

    let op = item.post.as_ref().unwrap();
    assert!(op.parameters[0].is_resolved());
    let body = op.request_body.as_ref().unwrap().value().unwrap();
    let media = &body.content["application/json"];
    assert!(Arc::ptr_eq(media.schema.as_ref().unwrap().shared().unwrap(), schema(&doc, "Pet")));
    let rate = components.headers["Rate"].shared().unwrap();
    assert!(Arc::ptr_eq(
        media.encoding["tags"].headers["X-Tag"].shared().unwrap(),
        rate
    ));

    let ok = op.responses["200"].value().unwrap();
    assert_eq!(ok.description, "ok");
    assert!(Arc::ptr_eq(ok.headers["X-Rate"].shared().unwrap(), rate));
    assert!(Arc::ptr_eq(
        ok.links["self"].shared().unwrap(),
        components.links["SelfLink"].shared().unwrap()
    ));
    let example = ok.content["application/json"].examples["one"].value().unwrap();
    assert_eq!(example.value, Some(json!({"id": "pet-1"})));

    let fallback = op.responses["default"].value().unwrap();
    let error = fallback.content["application/json"].schema.as_ref().unwrap();
    assert!(Arc::ptr_eq(error.shared().unwrap(), schema(&doc, "Error")));

    let id = components.parameters["Id"].value().unwrap();
    assert!(id.examples["sample"].is_resolved());
    assert!(Arc::ptr_eq(
        components.security_schemes["Alias"].shared().unwrap(),
        components.security_schemes["ApiKey"].shared().unwrap()
    ));
}

#[test]
fn test_resolved_document_serializes_references() {
    let doc = load(SHARED_TARGET).unwrap();
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(
        value["components"]["schemas"]["A"],
        json!({"$ref": "#/components/schemas/Target"})
    );
    assert_eq!(value["components"]["schemas"]["Target"]["type"], "object");
}

#[test]
fn test_resolve_refs_in_decoded_document() {
    let mut doc: Document = serde_json::from_value(json!({
        "openapi": "3.0.3",
        "components": { "schemas": {
            "Pet": { "$ref": "#/components/schemas/Animal" },
            "Animal": { "type": "object" }
        } }
    }))
    .unwrap();
    assert!(!doc.components.schemas["Pet"].is_resolved());

    Loader::new().resolve_refs_in(&mut doc, None).unwrap();
    assert!(Arc::ptr_eq(schema(&doc, "Pet"), schema(&doc, "Animal")));
}

#[test]
fn test_external_reference_disallowed_by_default() {
    let err = load(
        r##"
openapi: 3.0.3
components:
  schemas:
    Pet:
      $ref: 'pet.yaml#/components/schemas/Pet'
"##,
    )
    .unwrap_err();
    match err {
        ResolveError::ExternalRefNotAllowed { reference } => {
            assert_eq!(reference, "pet.yaml#/components/schemas/Pet");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_json_input() {
    let doc = Loader::new()
        .load_from_bytes(
            br##"{"openapi": "3.1.0", "components": {"schemas": {
                "A": {"$ref": "#/components/schemas/B"},
                "B": {"type": "string"}
            }}}"##,
        )
        .unwrap();
    assert!(Arc::ptr_eq(schema(&doc, "A"), schema(&doc, "B")));
}
