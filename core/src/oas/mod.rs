#![deny(missing_docs)]

//! # OpenAPI Compilation Module
//!
//! - **document**: Order-preserving document shims and parsing.
//! - **naming**: Identifier and route path normalization.
//! - **refs**: `$ref` classification and decoding.
//! - **resolver**: Schema -> Model resolution.
//! - **registry**: The component schema table.
//! - **flatten**: Model -> Type flattening.
//! - **routes**: Operation and route extraction.
//! - **validation**: Constraint compilation and checks.
//! - **models**: Intermediate Representation definitions.

pub mod document;
pub mod flatten;
pub mod models;
pub mod naming;
pub mod refs;
pub mod registry;
pub mod resolver;
pub mod routes;
pub mod validation;

pub use document::{parse_document, Document};
pub use flatten::{flatten, flatten_all, Flattener};
pub use models::{
    Definition, Field, FieldDef, HttpMethod, Model, ModelKind, ModelMeta, NumericRepr, Operation,
    Parameter, Primitive, ResponseDef, Route, Type,
};
pub use naming::{
    from_router_path, normalize_field_name, normalize_type_name, path_parameter_names,
    to_router_path,
};
pub use registry::SchemaTable;
pub use resolver::resolve;
pub use routes::{extract_operations, Extraction};
pub use validation::{compile_constraints, CompiledPattern, Constraint, Violation};
