#![deny(missing_docs)]

//! # Model Flattener
//!
//! Walks model trees depth-first (parent before children, children in
//! declared order) and emits one [`Type`] per named node. References end the
//! walk, which is what keeps recursive schemas finite.

use crate::error::{AppError, AppResult};
use crate::oas::models::{Definition, FieldDef, Model, ModelKind, Type};
use crate::oas::registry::SchemaTable;
use std::collections::{HashMap, HashSet};

/// Accumulates Types across several roots with one shared seen-set.
#[derive(Debug, Default)]
pub struct Flattener<'a> {
    table: Option<&'a SchemaTable>,
    types: Vec<Type>,
    index: HashMap<String, usize>,
}

impl<'a> Flattener<'a> {
    /// A flattener that does not check references.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flattener that requires every reference to name a table entry.
    pub fn with_table(table: &'a SchemaTable) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }

    /// Flattens one tree.
    pub fn add(&mut self, root: &Model) -> AppResult<()> {
        self.visit(root, &root.name)
    }

    /// Declares `name` as another name for the component `target`.
    pub fn add_alias(&mut self, name: &str, target: &Model) -> AppResult<()> {
        self.check_reference(&target.name, name)?;
        self.insert(Type {
            name: name.to_string(),
            docstring: docstring(target),
            deprecated: target.meta.deprecated,
            definition: Definition::Alias(target.name.clone()),
            validation: Vec::new(),
        })
    }

    /// The Types collected so far, in emission order.
    pub fn finish(self) -> Vec<Type> {
        self.types
    }

    fn visit(&mut self, model: &Model, context: &str) -> AppResult<()> {
        let definition = match &model.kind {
            ModelKind::Reference => return self.check_reference(&model.name, context),
            ModelKind::Scalar { primitive, format } => Definition::Scalar {
                primitive: *primitive,
                format: format.clone(),
            },
            ModelKind::Object(fields) => Definition::Object(
                fields
                    .iter()
                    .map(|f| FieldDef {
                        name: f.name.clone(),
                        wire_name: f.wire_name.clone(),
                        type_name: f.model.name.clone(),
                        required: f.required,
                        nullable: f.model.meta.nullable,
                    })
                    .collect(),
            ),
            ModelKind::Array(item) => Definition::Array {
                item: item.name.clone(),
            },
            ModelKind::Union(variants) => {
                Definition::Union(variants.iter().map(|v| v.name.clone()).collect())
            }
        };

        self.insert(Type {
            name: model.name.clone(),
            docstring: docstring(model),
            deprecated: model.meta.deprecated,
            definition,
            validation: model.meta.constraints.clone(),
        })?;

        // A merged parent only matched one level deep; its children still
        // have to agree. Trees stop at references, so this terminates.
        match &model.kind {
            ModelKind::Object(fields) => {
                for field in fields {
                    self.visit(&field.model, &model.name)?;
                }
            }
            ModelKind::Array(item) => self.visit(item, &model.name)?,
            ModelKind::Union(variants) => {
                for variant in variants {
                    self.visit(variant, &model.name)?;
                }
            }
            ModelKind::Scalar { .. } | ModelKind::Reference => {}
        }
        Ok(())
    }

    /// Adds `ty` unless an identical Type is already present.
    fn insert(&mut self, ty: Type) -> AppResult<()> {
        if let Some(&at) = self.index.get(&ty.name) {
            let existing = &self.types[at];
            if existing.definition == ty.definition && existing.validation == ty.validation {
                tracing::trace!(type_name = %ty.name, "merged duplicate type");
                return Ok(());
            }
            return Err(AppError::NameCollision {
                name: ty.name,
                detail: format!(
                    "{:?} conflicts with {:?}",
                    existing.definition, ty.definition
                ),
            });
        }
        self.index.insert(ty.name.clone(), self.types.len());
        self.types.push(ty);
        Ok(())
    }

    fn check_reference(&self, name: &str, context: &str) -> AppResult<()> {
        match self.table {
            Some(table) if !table.contains(name) => Err(AppError::UnresolvedReference {
                name: name.to_string(),
                context: context.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// `Deprecated: <description>`, `Deprecated`, the description, or nothing.
fn docstring(model: &Model) -> Option<String> {
    match (model.meta.deprecated, &model.meta.description) {
        (true, Some(description)) => Some(format!("Deprecated: {}", description)),
        (true, None) => Some("Deprecated".to_string()),
        (false, Some(description)) => Some(description.clone()),
        (false, None) => None,
    }
}

/// Flattens a single tree without checking references.
pub fn flatten(root: &Model) -> AppResult<Vec<Type>> {
    let mut flattener = Flattener::new();
    flattener.add(root)?;
    Ok(flattener.finish())
}

/// Flattens every component of `table`, then `extra` roots (operation
/// parameters, bodies, responses), into one de-duplicated Type list.
///
/// Alias chains that loop back on themselves are reported as unresolved.
pub fn flatten_all<'m>(
    table: &SchemaTable,
    extra: impl IntoIterator<Item = &'m Model>,
) -> AppResult<Vec<Type>> {
    let mut flattener = Flattener::with_table(table);
    for (name, model) in table.iter() {
        if model.is_reference() {
            check_alias_chain(table, name)?;
            flattener.add_alias(name, model)?;
        } else {
            flattener.add(model)?;
        }
    }
    for model in extra {
        flattener.add(model)?;
    }
    Ok(flattener.finish())
}

fn check_alias_chain(table: &SchemaTable, start: &str) -> AppResult<()> {
    let mut seen = HashSet::new();
    let mut current = start;
    while let Some(model) = table.get(current) {
        if !model.is_reference() {
            return Ok(());
        }
        if !seen.insert(current) {
            return Err(AppError::UnresolvedReference {
                name: start.to_string(),
                context: "alias cycle".to_string(),
            });
        }
        current = &model.name;
    }
    Ok(())
}
