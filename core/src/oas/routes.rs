#![deny(missing_docs)]

//! # Operation & Route Extraction
//!
//! Walks `paths` in document order and produces one [`Operation`] and one
//! [`Route`] per populated method slot. Inline parameter, request body and
//! response schemas are resolved to models named after the operation so the
//! compiler can flatten them alongside the component schemas.

use crate::config::CompilerConfig;
use crate::error::{AppError, AppResult};
use crate::oas::document::{
    self, json_content, Components, Document, ParameterLocation, PathItem,
};
use crate::oas::models::{HttpMethod, Model, Operation, Parameter, ResponseDef, Route};
use crate::oas::naming::{normalize_field_name, normalize_type_name, to_router_path};
use crate::oas::refs::{component_ref_name, PARAMETERS, REQUEST_BODIES, RESPONSES};
use crate::oas::resolver::resolve;
use indexmap::IndexMap;
use std::collections::HashMap;
use utoipa::openapi::RefOr;

/// Result of walking the path table.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Operations in path, then method order.
    pub operations: Vec<Operation>,
    /// One route per operation, same order.
    pub routes: Vec<Route>,
    /// Models resolved from inline schemas (and references to components).
    pub models: Vec<Model>,
}

/// The method slot of a path item.
fn slot(item: &PathItem, method: HttpMethod) -> Option<&document::Operation> {
    match method {
        HttpMethod::Get => item.get.as_ref(),
        HttpMethod::Put => item.put.as_ref(),
        HttpMethod::Post => item.post.as_ref(),
        HttpMethod::Delete => item.delete.as_ref(),
        HttpMethod::Options => item.options.as_ref(),
        HttpMethod::Head => item.head.as_ref(),
        HttpMethod::Patch => item.patch.as_ref(),
        HttpMethod::Trace => item.trace.as_ref(),
    }
}

/// Follows one level of `$ref` into a component section.
fn lookup<'a, T>(
    item: &'a RefOr<T>,
    section: &str,
    table: &'a IndexMap<String, RefOr<T>>,
    context: &str,
) -> AppResult<&'a T> {
    match item {
        RefOr::T(value) => Ok(value),
        RefOr::Ref(r) => {
            let key = component_ref_name(&r.ref_location, section, context)?;
            match table.get(&key) {
                Some(RefOr::T(value)) => Ok(value),
                Some(RefOr::Ref(nested)) => Err(AppError::UnsupportedReference {
                    reference: nested.ref_location.clone(),
                    context: format!("{} (chained component reference)", context),
                }),
                None => Err(AppError::UnresolvedReference {
                    name: key,
                    context: context.to_string(),
                }),
            }
        }
    }
}

/// Extracts every operation of the document.
///
/// # Arguments
///
/// * `document` - The parsed document.
/// * `config` - Route path style and naming options.
pub fn extract_operations(document: &Document, config: &CompilerConfig) -> AppResult<Extraction> {
    let empty = Components::default();
    let components = document.components.as_ref().unwrap_or(&empty);
    let mut extraction = Extraction::default();
    let mut owners: HashMap<String, String> = HashMap::new();

    for (path, item) in &document.paths.items {
        if let Some(reference) = &item.ref_path {
            return Err(AppError::UnsupportedReference {
                reference: reference.clone(),
                context: path.clone(),
            });
        }

        for method in HttpMethod::ALL {
            let Some(op) = slot(item, method) else {
                continue;
            };
            let missing = || AppError::MissingOperationId {
                method: method.to_string(),
                path: path.clone(),
            };
            let raw_id = op.operation_id.as_deref().map(str::trim).unwrap_or_default();
            let name = normalize_type_name(raw_id);
            if name.is_empty() {
                return Err(missing());
            }

            let location = format!("{} {}", method, path);
            if let Some(previous) = owners.insert(name.clone(), location.clone()) {
                return Err(AppError::NameCollision {
                    name,
                    detail: format!("operation used by {} and {}", previous, location),
                });
            }

            let operation = extract_operation(
                &name,
                method,
                path,
                item,
                op,
                components,
                config,
                &mut extraction.models,
            )?;
            tracing::debug!(operation = %name, %method, %path, "extracted operation");

            extraction.routes.push(Route {
                method,
                path: to_router_path(path, config.path_style),
                operation_name: name,
            });
            extraction.operations.push(operation);
        }
    }

    if !document.paths.extensions.is_empty() {
        tracing::debug!(
            count = document.paths.extensions.len(),
            "ignoring extensions on the paths object"
        );
    }
    Ok(extraction)
}

#[allow(clippy::too_many_arguments)]
fn extract_operation(
    name: &str,
    method: HttpMethod,
    path: &str,
    item: &PathItem,
    op: &document::Operation,
    components: &Components,
    config: &CompilerConfig,
    models: &mut Vec<Model>,
) -> AppResult<Operation> {
    let mut merged: Vec<&document::Parameter> = Vec::new();
    for raw in item.parameters.iter().chain(op.parameters.iter()) {
        let param = lookup(raw, PARAMETERS, &components.parameters, name)?;
        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => merged.push(param),
        }
    }

    let mut parameters = Vec::with_capacity(merged.len());
    let mut arg_names = HashMap::new();
    for param in merged {
        let field_name = normalize_field_name(&param.name);
        if let Some(other) = arg_names.insert(field_name.clone(), param.name.clone()) {
            return Err(AppError::NameCollision {
                name: format!("{}.{}", name, field_name),
                detail: format!("parameters '{}' and '{}'", other, param.name),
            });
        }

        let schema = param
            .schema
            .as_ref()
            .or_else(|| json_content(&param.content).and_then(|m| m.schema.as_ref()))
            .ok_or_else(|| AppError::UnsupportedSchemaType {
                schema: format!("{}{}", name, normalize_type_name(&param.name)),
                found: "parameter without schema".into(),
            })?;
        let model = resolve(
            &format!("{}{}", name, normalize_type_name(&param.name)),
            schema,
            config,
        )?;

        if matches!(
            param.location,
            ParameterLocation::Header | ParameterLocation::Cookie
        ) {
            tracing::debug!(operation = %name, parameter = %param.name, "header/cookie parameter passed through as a plain value");
        }

        parameters.push(Parameter {
            name: field_name,
            wire_name: param.name.clone(),
            location: param.location,
            required: param.required || param.location == ParameterLocation::Path,
            type_name: model.name.clone(),
            description: param.description.clone(),
            deprecated: param.deprecated,
        });
        models.push(model);
    }

    let (request_body_type, request_body_required) = match &op.request_body {
        Some(raw) => {
            let body = lookup(raw, REQUEST_BODIES, &components.request_bodies, name)?;
            let schema = json_content(&body.content)
                .and_then(|m| m.schema.as_ref())
                .ok_or_else(|| AppError::MissingJsonContent {
                    operation: name.to_string(),
                })?;
            let model = resolve(&format!("{}RequestBody", name), schema, config)?;
            let type_name = model.name.clone();
            models.push(model);
            (Some(type_name), body.required)
        }
        None => (None, false),
    };

    let mut responses = Vec::with_capacity(op.responses.len());
    for (status, raw) in &op.responses {
        let response = lookup(raw, RESPONSES, &components.responses, name)?;
        let type_name = match json_content(&response.content).and_then(|m| m.schema.as_ref()) {
            Some(schema) => {
                let model = resolve(
                    &format!("{}Response{}", name, normalize_type_name(status)),
                    schema,
                    config,
                )?;
                let type_name = model.name.clone();
                models.push(model);
                Some(type_name)
            }
            None => {
                if !response.content.is_empty() {
                    tracing::debug!(operation = %name, %status, "response has no JSON content; left untyped");
                }
                None
            }
        };
        responses.push(ResponseDef {
            status: status.clone(),
            description: response.description.clone(),
            type_name,
        });
    }

    Ok(Operation {
        name: name.to_string(),
        method,
        path: path.to_string(),
        summary: op.summary.clone().or_else(|| item.summary.clone()),
        description: op.description.clone().or_else(|| item.description.clone()),
        deprecated: op.deprecated,
        request_body_type,
        request_body_required,
        parameters,
        responses,
    })
}
