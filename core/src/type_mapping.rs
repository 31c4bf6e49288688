#![deny(missing_docs)]

//! # Type Mapping
//!
//! Converts IR primitives into target-language type expressions and wraps
//! field types for optionality and indirection.

use crate::oas::models::{NumericRepr, Primitive};

/// Trait for converting IR scalars to target type strings.
pub trait TypeMapper {
    /// Maps a primitive and its `format` hint (e.g. `integer` + `int32`).
    fn map_scalar(&self, primitive: Primitive, format: Option<&str>) -> String;

    /// Wraps a named type as a field type.
    ///
    /// # Arguments
    ///
    /// * `type_name` - The field's (already mapped) type.
    /// * `optional` - Absent or `null` values are allowed.
    /// * `boxed` - The edge is recursive and needs indirection.
    fn field_type(&self, type_name: &str, optional: bool, boxed: bool) -> String;

    /// A homogeneous sequence of `item`.
    fn sequence_type(&self, item: &str) -> String;
}

/// Mapping onto Rust std types. Widths without a recognized `format` fall
/// back to `i64` / `f64`; string formats carry no extra dependency and stay
/// `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTypeMapper;

impl TypeMapper for RustTypeMapper {
    fn map_scalar(&self, primitive: Primitive, format: Option<&str>) -> String {
        let ty = match primitive {
            Primitive::Null => "()",
            Primitive::Boolean => "bool",
            Primitive::String => "String",
            Primitive::Integer | Primitive::Number => {
                match NumericRepr::select(primitive, format) {
                    Some(NumericRepr::Int32) => "i32",
                    Some(NumericRepr::Float32) => "f32",
                    Some(NumericRepr::Float) | Some(NumericRepr::Float64) => "f64",
                    Some(NumericRepr::Int) | Some(NumericRepr::Int64) | None => "i64",
                }
            }
        };
        ty.to_string()
    }

    fn field_type(&self, type_name: &str, optional: bool, boxed: bool) -> String {
        let inner = if boxed {
            format!("Box<{}>", type_name)
        } else {
            type_name.to_string()
        };
        if optional {
            format!("Option<{}>", inner)
        } else {
            inner
        }
    }

    fn sequence_type(&self, item: &str) -> String {
        format!("Vec<{}>", item)
    }
}
