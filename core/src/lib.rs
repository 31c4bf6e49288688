#![deny(missing_docs)]

//! # oasgen core
//!
//! Compiles an OpenAPI 3.x document into a normalized model of types,
//! operations and routes, and renders that model as source code.
//!
//! ```text
//! parse_document -> compile -> CompiledApi -> generate_sources(Emitter)
//! ```

/// Shared error types.
pub mod error;

/// Compiler options.
pub mod config;

/// OpenAPI (OAS) parsing, resolution and flattening.
pub mod oas;

/// The compile pipeline.
pub mod compiler;

/// Type mapping logic (IR -> target types).
pub mod type_mapping;

/// Code generation utilities.
pub mod codegen;

/// Strategy Pattern Interfaces.
pub mod strategies;

pub use codegen::{generate_sources, generated_header, GeneratedSources, TypeGraph};
pub use compiler::{compile, compile_str, CompiledApi};
pub use config::{CompilerConfig, FieldNaming, PathStyle};
pub use error::{AppError, AppResult};
pub use oas::{
    normalize_field_name, normalize_type_name, parse_document, to_router_path, Constraint,
    Definition, Document, Operation, Route, Type, Violation,
};
pub use strategies::{Emitter, RustEmitter};
pub use type_mapping::{RustTypeMapper, TypeMapper};
