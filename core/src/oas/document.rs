#![deny(missing_docs)]

//! # Document Shims
//!
//! Order-preserving deserialization layer for the parts of an OpenAPI 3.x
//! document the compiler reads. Every map is an `IndexMap`, so paths,
//! properties and component tables come out in document order.
//!
//! Well-formedness is assumed to have been checked upstream; only the version
//! string is verified here.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use utoipa::openapi::RefOr;

/// Root of an OpenAPI document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Document {
    /// OpenAPI version (e.g. "3.1.0").
    pub openapi: Option<String>,
    /// Swagger version, only read to reject 2.0 documents.
    pub swagger: Option<String>,
    /// Metadata about the API.
    pub info: Option<Info>,
    /// Path items in document order.
    #[serde(default)]
    pub paths: Paths,
    /// Reusable definitions.
    #[serde(default)]
    pub components: Option<Components>,
}

/// Metadata about the API (Info Object).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Info {
    /// The title of the API.
    #[serde(default)]
    pub title: String,
    /// The version of the API document.
    #[serde(default)]
    pub version: String,
    /// A description of the API.
    pub description: Option<String>,
}

/// The Paths Object. Extensions (`x-...`) are kept apart from
/// the path items.
#[derive(Debug, Clone, Default)]
pub struct Paths {
    /// Path items keyed by path template.
    pub items: IndexMap<String, PathItem>,
    /// Extensions attached to the Paths Object.
    pub extensions: IndexMap<String, Value>,
}

impl<'de> Deserialize<'de> for Paths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();
        let mut extensions = IndexMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                extensions.insert(key, value);
                continue;
            }
            let path_item = serde_json::from_value::<PathItem>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, path_item);
        }

        Ok(Self { items, extensions })
    }
}

impl Serialize for Paths {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.items.len() + self.extensions.len()))?;
        for (key, value) in &self.items {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Components object holding reusable definitions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Named schemas, the only reference target for schema `$ref`s.
    #[serde(default)]
    pub schemas: IndexMap<String, RefOr<Schema>>,
    /// Reusable parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, RefOr<Parameter>>,
    /// Reusable request bodies.
    #[serde(default)]
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,
    /// Reusable responses.
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
}

/// A Path Item: the operations available on one path template.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PathItem {
    /// `$ref` to another path item. Not supported by the compiler.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    /// Short summary shared by all operations.
    pub summary: Option<String>,
    /// Description shared by all operations.
    pub description: Option<String>,
    /// GET slot.
    pub get: Option<Operation>,
    /// PUT slot.
    pub put: Option<Operation>,
    /// POST slot.
    pub post: Option<Operation>,
    /// DELETE slot.
    pub delete: Option<Operation>,
    /// OPTIONS slot.
    pub options: Option<Operation>,
    /// HEAD slot.
    pub head: Option<Operation>,
    /// PATCH slot.
    pub patch: Option<Operation>,
    /// TRACE slot.
    pub trace: Option<Operation>,
    /// Parameters shared by every operation on this path.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
}

/// An Operation Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Unique operation identifier; names the generated handler.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Whether the operation is deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    /// Request body, inline or referenced.
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status code (or `default`).
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path template segment.
    Path,
    /// Query string entry.
    Query,
    /// Whole query string (OAS 3.2).
    #[serde(rename = "querystring")]
    QueryString,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParameterLocation {
    /// The `in` keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::QueryString => "querystring",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

/// A Parameter Object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Parameter {
    /// Parameter name on the wire.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Description.
    pub description: Option<String>,
    /// Whether the parameter is mandatory. Path parameters always are.
    #[serde(default)]
    pub required: bool,
    /// Whether the parameter is deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Value schema.
    pub schema: Option<RefOr<Schema>>,
    /// Alternative to `schema`: a single media type entry.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A Request Body Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RequestBody {
    /// Description.
    pub description: Option<String>,
    /// Representations keyed by media type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
    /// Whether the body is mandatory.
    #[serde(default)]
    pub required: bool,
}

/// A Response Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Response {
    /// Description.
    pub description: Option<String>,
    /// Representations keyed by media type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A Media Type Object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaType {
    /// Schema of the payload.
    pub schema: Option<RefOr<Schema>>,
}

/// The `type` keyword: a single kind (3.0) or a list of kinds (3.1).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

impl SchemaType {
    /// The declared kinds in declaration order.
    pub fn kinds(&self) -> Vec<&str> {
        match self {
            Self::Single(kind) => vec![kind.as_str()],
            Self::Multiple(kinds) => kinds.iter().map(String::as_str).collect(),
        }
    }
}

/// The `items` keyword: a schema or the boolean-schema idiom.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Items {
    /// `items: true` / `items: false`
    Bool(bool),
    /// `items: {...}`
    Schema(Box<RefOr<Schema>>),
}

/// `exclusiveMaximum`/`exclusiveMinimum`: a flag in 3.0, the bound itself in 3.1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    /// 3.0 form, modifies `maximum`/`minimum`.
    Flag(bool),
    /// 3.1 form, the exclusive bound.
    Value(f64),
}

/// A Schema Object, restricted to the keywords the compiler models.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Primitive kind(s).
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    /// Format hint (`int32`, `double`, `date-time`, ...).
    pub format: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description, emitted as the type's docstring.
    pub description: Option<String>,
    /// OAS 3.0 nullability flag.
    #[serde(default)]
    pub nullable: bool,
    /// Whether the schema is deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Object properties in document order.
    #[serde(default)]
    pub properties: IndexMap<String, RefOr<Schema>>,
    /// Required property names.
    #[serde(default)]
    pub required: Vec<String>,
    /// Array item schema.
    pub items: Option<Items>,
    /// Exactly-one-of union.
    #[serde(default)]
    pub one_of: Vec<RefOr<Schema>>,
    /// Any-of union.
    #[serde(default)]
    pub any_of: Vec<RefOr<Schema>>,
    /// Composition; not modeled.
    #[serde(default)]
    pub all_of: Vec<RefOr<Schema>>,
    /// Maximum string length.
    pub max_length: Option<u64>,
    /// Minimum string length.
    pub min_length: Option<u64>,
    /// Upper numeric bound.
    pub maximum: Option<f64>,
    /// Lower numeric bound.
    pub minimum: Option<f64>,
    /// Exclusive upper bound (flag or value).
    pub exclusive_maximum: Option<ExclusiveBound>,
    /// Exclusive lower bound (flag or value).
    pub exclusive_minimum: Option<ExclusiveBound>,
    /// ECMA-262 pattern for strings.
    pub pattern: Option<String>,
    /// Maximum array length.
    pub max_items: Option<u64>,
    /// Minimum array length.
    pub min_items: Option<u64>,
    /// Allowed values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
}

/// Parses a raw OpenAPI YAML (or JSON) string.
///
/// Only 3.x documents are accepted.
pub fn parse_document(content: &str) -> AppResult<Document> {
    let document: Document = serde_yaml::from_str(content)
        .map_err(|e| AppError::Document(format!("Failed to parse OpenAPI YAML: {}", e)))?;

    match (&document.openapi, &document.swagger) {
        (Some(version), _) if version.starts_with("3.") => Ok(document),
        (Some(version), _) => Err(AppError::Document(format!(
            "Unsupported OpenAPI version: {}. Only 3.x is supported.",
            version
        ))),
        (None, Some(version)) => Err(AppError::Document(format!(
            "Unsupported Swagger version: {}. Convert the document to OpenAPI 3.x first.",
            version
        ))),
        (None, None) => Err(AppError::Document(
            "Invalid OpenAPI document: missing 'openapi' version field.".into(),
        )),
    }
}

/// True for `application/json`, with or without parameters, and `+json` suffixes.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

/// Picks the JSON representation out of a content map, preferring the exact
/// `application/json` key.
pub fn json_content(content: &IndexMap<String, MediaType>) -> Option<&MediaType> {
    content.get("application/json").or_else(|| {
        content
            .iter()
            .find(|(media_type, _)| is_json_media_type(media_type))
            .map(|(_, media)| media)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_document_order() {
        let yaml = r#"
openapi: 3.1.0
info: {title: T, version: 1.0.0}
paths:
  /zeta:
    get: {operationId: zeta, responses: {'200': {description: OK}}}
  /alpha:
    get: {operationId: alpha, responses: {'200': {description: OK}}}
  x-internal: true
components:
  schemas:
    Zebra:
      type: object
      properties:
        zz: {type: string}
        aa: {type: integer}
    Apple: {type: string}
"#;
        let doc = parse_document(yaml).unwrap();
        let paths: Vec<_> = doc.paths.items.keys().cloned().collect();
        assert_eq!(paths, vec!["/zeta", "/alpha"]);
        assert!(doc.paths.extensions.contains_key("x-internal"));

        let components = doc.components.unwrap();
        let names: Vec<_> = components.schemas.keys().cloned().collect();
        assert_eq!(names, vec!["Zebra", "Apple"]);
        let RefOr::T(zebra) = &components.schemas["Zebra"] else {
            panic!("inline schema expected")
        };
        let props: Vec<_> = zebra.properties.keys().cloned().collect();
        assert_eq!(props, vec!["zz", "aa"]);
    }

    #[test]
    fn test_items_and_type_forms() {
        let yaml = r#"
type: [array, "null"]
items: true
exclusiveMaximum: 10
"#;
        let schema: Schema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.schema_type.unwrap().kinds(), vec!["array", "null"]);
        assert_eq!(schema.items, Some(Items::Bool(true)));
        assert_eq!(schema.exclusive_maximum, Some(ExclusiveBound::Value(10.0)));
    }

    #[test]
    fn test_ref_items() {
        let schema: Schema =
            serde_yaml::from_str("type: array\nitems: {$ref: '#/components/schemas/Node'}\n")
                .unwrap();
        match schema.items {
            Some(Items::Schema(boxed)) => match *boxed {
                RefOr::Ref(r) => assert_eq!(r.ref_location, "#/components/schemas/Node"),
                RefOr::T(_) => panic!("reference expected"),
            },
            other => panic!("unexpected items {:?}", other),
        }
    }

    #[test]
    fn test_version_checks() {
        let err = parse_document("swagger: '2.0'\ninfo: {title: T, version: '1'}\npaths: {}\n")
            .unwrap_err();
        assert!(err.to_string().contains("Swagger"));

        let err = parse_document("info: {title: T, version: '1'}\npaths: {}\n").unwrap_err();
        assert!(err.to_string().contains("missing 'openapi'"));

        let err = parse_document("openapi: 4.0.0\npaths: {}\n").unwrap_err();
        assert!(err.to_string().contains("Only 3.x"));
    }

    #[test]
    fn test_json_media_detection() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("application/json; charset=utf-8"));
        assert!(is_json_media_type("application/merge-patch+json"));
        assert!(!is_json_media_type("text/plain"));

        let mut content = IndexMap::new();
        content.insert("text/plain".to_string(), MediaType::default());
        content.insert("application/problem+json".to_string(), MediaType::default());
        assert!(json_content(&content).is_some());
        content.shift_remove("application/problem+json");
        assert!(json_content(&content).is_none());
    }
}
