#![deny(missing_docs)]

//! # OpenAPI Models
//!
//! Intermediate Representation (IR) produced by the compiler.
//!
//! - [`Model`]: a resolved, named schema node. Objects and arrays own their
//!   children by value; a [`ModelKind::Reference`] is a name lookup, which is
//!   how recursive schemas stay finite.
//! - [`Type`]: a flattened, emission-ready declaration.
//! - [`Operation`] / [`Route`]: the handler table and its dispatch keys.

use crate::oas::document::ParameterLocation;
use crate::oas::validation::Constraint;
use serde::Serialize;
use std::fmt;

/// Primitive JSON kinds a scalar can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    /// `null`
    Null,
    /// `boolean`
    Boolean,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `string`
    String,
}

impl Primitive {
    /// Classifies a `type` keyword value.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "null" => Some(Self::Null),
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// The `type` keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

/// Target numeric representation selected by `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericRepr {
    /// Integer without a recognized format.
    Int,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// Number without a recognized format.
    Float,
    /// `float`
    Float32,
    /// `double`
    Float64,
}

impl NumericRepr {
    /// Picks the representation for a numeric primitive. A recognized format
    /// wins regardless of whether the kind is `integer` or `number`.
    pub fn select(primitive: Primitive, format: Option<&str>) -> Option<Self> {
        let default = match primitive {
            Primitive::Integer => Self::Int,
            Primitive::Number => Self::Float,
            _ => return None,
        };
        Some(match format {
            Some("int32") => Self::Int32,
            Some("int64") => Self::Int64,
            Some("float") => Self::Float32,
            Some("double") => Self::Float64,
            _ => default,
        })
    }
}

/// Schema-level metadata carried by every model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelMeta {
    /// Description from the schema.
    pub description: Option<String>,
    /// `deprecated: true`
    pub deprecated: bool,
    /// `nullable: true` or a `"null"` entry in a type list.
    pub nullable: bool,
    /// Compiled validation rules.
    pub constraints: Vec<Constraint>,
}

/// A resolved, named schema node.
///
/// Invariant: `name` is non-empty once the model is part of a compilation
/// unit. For a reference it is the target's type name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    /// Canonical (PascalCase) type name.
    pub name: String,
    /// Description, flags and constraints.
    pub meta: ModelMeta,
    /// Shape of the node.
    pub kind: ModelKind,
}

/// The closed set of model shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ModelKind {
    /// A leaf value.
    Scalar {
        /// JSON kind.
        primitive: Primitive,
        /// Format hint as written in the schema.
        format: Option<String>,
    },
    /// Properties in document order.
    Object(Vec<Field>),
    /// Homogeneous sequence.
    Array(Box<Model>),
    /// Name of a component schema; never owns the target.
    Reference,
    /// One of several independently resolved variants.
    Union(Vec<Model>),
}

/// One property of an object model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// camelCase field name.
    pub name: String,
    /// Property key as written in the document.
    pub wire_name: String,
    /// Listed in the parent's `required`.
    pub required: bool,
    /// The property's model.
    pub model: Model,
}

impl Model {
    /// True for [`ModelKind::Reference`].
    pub fn is_reference(&self) -> bool {
        matches!(self.kind, ModelKind::Reference)
    }

    /// Builds a reference to a component schema.
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: ModelMeta::default(),
            kind: ModelKind::Reference,
        }
    }
}

/// A flattened declaration, one level deep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    /// Unique type name.
    pub name: String,
    /// Documentation line(s), `Deprecated: ` prefixed when deprecated.
    pub docstring: Option<String>,
    /// Whether the source schema was deprecated.
    pub deprecated: bool,
    /// Shape, with children referred to by name.
    pub definition: Definition,
    /// Checks run by the type's validation routine.
    pub validation: Vec<Constraint>,
}

/// Shape of a [`Type`]; children are names of other Types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Definition {
    /// Primitive alias.
    Scalar {
        /// JSON kind.
        primitive: Primitive,
        /// Format hint as written in the schema.
        format: Option<String>,
    },
    /// Field list in declared order.
    Object(Vec<FieldDef>),
    /// Element-typed sequence.
    Array {
        /// Element type name.
        item: String,
    },
    /// Variant type names in declared order.
    Union(Vec<String>),
    /// A component schema that is itself a `$ref`.
    Alias(String),
}

/// A field of an object [`Definition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDef {
    /// camelCase field name.
    pub name: String,
    /// Property key as written in the document.
    pub wire_name: String,
    /// Name of the field's Type.
    pub type_name: String,
    /// Listed in `required`.
    pub required: bool,
    /// May hold `null`.
    pub nullable: bool,
}

/// HTTP method slots of a path item, in extraction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Every slot, in the order operations are extracted.
    pub const ALL: [HttpMethod; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Upper-case method token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handler parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// camelCase parameter name.
    pub name: String,
    /// Name on the wire.
    pub wire_name: String,
    /// Where the value is carried.
    pub location: ParameterLocation,
    /// Mandatory (always true for path parameters).
    pub required: bool,
    /// Name of the value's Type.
    pub type_name: String,
    /// Description.
    pub description: Option<String>,
    /// Whether the parameter is deprecated.
    pub deprecated: bool,
}

/// One entry of an operation's response set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDef {
    /// Status code or `default`.
    pub status: String,
    /// Description.
    pub description: Option<String>,
    /// JSON body Type, absent for empty or non-JSON responses.
    pub type_name: Option<String>,
}

/// One HTTP-method slot of a path item. Never mutated after extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// PascalCase `operationId`.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// OpenAPI path template.
    pub path: String,
    /// Summary, falling back to the path item's.
    pub summary: Option<String>,
    /// Description, falling back to the path item's.
    pub description: Option<String>,
    /// Whether the operation is deprecated.
    pub deprecated: bool,
    /// JSON request body Type.
    pub request_body_type: Option<String>,
    /// Whether the request body is mandatory.
    pub request_body_required: bool,
    /// Path-item parameters first, then operation parameters.
    pub parameters: Vec<Parameter>,
    /// Responses in document order.
    pub responses: Vec<ResponseDef>,
}

/// Dispatch key joining a path to an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Route {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path in the router's placeholder syntax.
    pub path: String,
    /// Name of the [`Operation`] handling it.
    pub operation_name: String,
}
