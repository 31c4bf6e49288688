#![deny(missing_docs)]

//! # Schema Resolver
//!
//! Turns a raw [`Schema`] into a [`Model`] tree.
//!
//! - References become [`ModelKind::Reference`] leaves naming the target.
//! - Properties resolve under `<Parent><Property>` (or `<Property>` with
//!   [`FieldNaming::Bare`]), array items under `<Name>Item`, union variants
//!   under `<Name>Variant<N>`.
//! - A `"null"` kind marks the model nullable instead of producing a union.

use crate::config::{CompilerConfig, FieldNaming};
use crate::error::{AppError, AppResult};
use crate::oas::document::{Items, Schema};
use crate::oas::models::{Field, Model, ModelKind, ModelMeta, Primitive};
use crate::oas::naming::{normalize_field_name, normalize_type_name};
use crate::oas::refs::schema_ref_name;
use crate::oas::validation::{compile_constraints, Target};
use std::collections::HashSet;
use utoipa::openapi::RefOr;

/// Resolves a schema (inline or `$ref`) into a model named after `name`.
///
/// # Arguments
///
/// * `name` - Raw name; normalized with [`normalize_type_name`].
/// * `schema` - The schema or reference to resolve.
/// * `config` - Naming options.
pub fn resolve(name: &str, schema: &RefOr<Schema>, config: &CompilerConfig) -> AppResult<Model> {
    match schema {
        RefOr::Ref(r) => {
            let target = schema_ref_name(&r.ref_location, name)?;
            let type_name = normalize_type_name(&target);
            if type_name.is_empty() {
                return Err(AppError::UnsupportedReference {
                    reference: r.ref_location.clone(),
                    context: name.to_string(),
                });
            }
            Ok(Model::reference(type_name))
        }
        RefOr::T(schema) => resolve_schema(name, schema, config),
    }
}

/// Resolves an inline schema.
pub fn resolve_schema(name: &str, schema: &Schema, config: &CompilerConfig) -> AppResult<Model> {
    let type_name = normalize_type_name(name);
    if type_name.is_empty() {
        return Err(AppError::UnsupportedSchemaType {
            schema: name.to_string(),
            found: "a name without alphanumeric characters".into(),
        });
    }

    let meta = ModelMeta {
        description: schema.description.clone(),
        deprecated: schema.deprecated,
        nullable: schema.nullable,
        constraints: Vec::new(),
    };

    if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        if !schema.all_of.is_empty() {
            tracing::warn!(schema = %type_name, "allOf next to oneOf/anyOf is ignored");
        }
        return resolve_union(type_name, schema, meta, config);
    }

    let kinds = declared_kinds(&type_name, schema)?;
    let nullable = kinds.iter().any(|k| *k == "null");
    let concrete: Vec<&str> = kinds.into_iter().filter(|k| *k != "null").collect();

    let mut model = match concrete.as_slice() {
        [] => resolve_kind(type_name, "null", schema, meta, config)?,
        [kind] => resolve_kind(type_name, kind, schema, meta, config)?,
        several => {
            let mut variants = Vec::with_capacity(several.len());
            for (i, kind) in several.iter().enumerate() {
                let variant_name = format!("{}Variant{}", type_name, i + 1);
                variants.push(resolve_kind(variant_name, kind, schema, ModelMeta::default(), config)?);
            }
            let constraints = compile_constraints(&type_name, schema, Target::Union)?;
            Model {
                name: type_name,
                meta: ModelMeta { constraints, ..meta },
                kind: ModelKind::Union(variants),
            }
        }
    };
    model.meta.nullable |= nullable;
    Ok(model)
}

/// The `type` keyword, or the kind implied by `properties`/`items`.
fn declared_kinds<'a>(type_name: &str, schema: &'a Schema) -> AppResult<Vec<&'a str>> {
    if let Some(declared) = &schema.schema_type {
        return Ok(declared.kinds());
    }
    if !schema.properties.is_empty() {
        return Ok(vec!["object"]);
    }
    if schema.items.is_some() {
        return Ok(vec!["array"]);
    }
    let found = if schema.all_of.is_empty() {
        "no type".to_string()
    } else {
        "allOf composition".to_string()
    };
    Err(AppError::UnsupportedSchemaType {
        schema: type_name.to_string(),
        found,
    })
}

fn resolve_kind(
    type_name: String,
    kind: &str,
    schema: &Schema,
    meta: ModelMeta,
    config: &CompilerConfig,
) -> AppResult<Model> {
    let (kind, target) = match kind {
        "object" => (
            ModelKind::Object(resolve_fields(&type_name, schema, config)?),
            Target::Object,
        ),
        "array" => {
            let item = match &schema.items {
                None => {
                    return Err(AppError::InvalidArraySchema {
                        schema: type_name,
                    })
                }
                Some(Items::Bool(_)) => {
                    return Err(AppError::UnsupportedItemsType {
                        schema: type_name,
                    })
                }
                Some(Items::Schema(item)) => resolve(&format!("{}Item", type_name), item, config)?,
            };
            (ModelKind::Array(Box::new(item)), Target::Array)
        }
        other => {
            let primitive =
                Primitive::from_kind(other).ok_or_else(|| AppError::UnsupportedSchemaType {
                    schema: type_name.clone(),
                    found: other.to_string(),
                })?;
            (
                ModelKind::Scalar {
                    primitive,
                    format: schema.format.clone(),
                },
                Target::Scalar(primitive),
            )
        }
    };

    let constraints = compile_constraints(&type_name, schema, target)?;
    Ok(Model {
        name: type_name,
        meta: ModelMeta { constraints, ..meta },
        kind,
    })
}

fn resolve_fields(type_name: &str, schema: &Schema, config: &CompilerConfig) -> AppResult<Vec<Field>> {
    let mut fields = Vec::with_capacity(schema.properties.len());
    let mut names = HashSet::new();

    for (property, property_schema) in &schema.properties {
        let field_name = normalize_field_name(property);
        if !names.insert(field_name.clone()) {
            return Err(AppError::NameCollision {
                name: format!("{}.{}", type_name, field_name),
                detail: format!("property '{}' normalizes to an existing field", property),
            });
        }

        let child_name = match config.field_naming {
            FieldNaming::Prefixed => format!("{}{}", type_name, normalize_type_name(property)),
            FieldNaming::Bare => normalize_type_name(property),
        };
        let model = resolve(&child_name, property_schema, config)?;

        fields.push(Field {
            name: field_name,
            wire_name: property.clone(),
            required: schema.required.iter().any(|r| r == property),
            model,
        });
    }
    Ok(fields)
}

fn resolve_union(
    type_name: String,
    schema: &Schema,
    meta: ModelMeta,
    config: &CompilerConfig,
) -> AppResult<Model> {
    let members: Vec<&RefOr<Schema>> = schema.one_of.iter().chain(schema.any_of.iter()).collect();
    let (nulls, others): (Vec<&RefOr<Schema>>, Vec<&RefOr<Schema>>) =
        members.into_iter().partition(|m| is_null_schema(m));

    // `oneOf: [X, {type: null}]` is a nullable X.
    if let ([_, ..], [single]) = (nulls.as_slice(), others.as_slice()) {
        let mut model = resolve(&type_name, single, config)?;
        model.meta.nullable = true;
        if model.meta.description.is_none() {
            model.meta.description = meta.description;
        }
        model.meta.deprecated |= meta.deprecated;
        return Ok(model);
    }

    let mut variants = Vec::with_capacity(others.len() + nulls.len());
    for (i, member) in others.iter().enumerate() {
        variants.push(resolve(&format!("{}Variant{}", type_name, i + 1), member, config)?);
    }
    let constraints = compile_constraints(&type_name, schema, Target::Union)?;
    Ok(Model {
        name: type_name,
        meta: ModelMeta {
            nullable: meta.nullable || !nulls.is_empty(),
            constraints,
            ..meta
        },
        kind: ModelKind::Union(variants),
    })
}

fn is_null_schema(schema: &RefOr<Schema>) -> bool {
    match schema {
        RefOr::T(s) => s
            .schema_type
            .as_ref()
            .is_some_and(|t| t.kinds().iter().all(|k| *k == "null")),
        RefOr::Ref(_) => false,
    }
}
