#![deny(missing_docs)]

//! # Rust Emitter
//!
//! Emits serde models and an async handler trait.
//!
//! Models:
//! - Scalars and arrays are `#[serde(transparent)]` newtypes.
//! - Objects are structs; optional or nullable fields are `Option`.
//! - Unions are `#[serde(untagged)]` enums, aliases are `pub type`.
//! - Every non-alias type gets a `validate()` that returns every failure.
//!
//! Interface:
//! - One response enum per operation with typed responses.
//! - A trait with one method per operation, plus a route table constant.

use crate::codegen::{
    doc_comment, rust_const_ident, rust_field_ident, rust_type_ident, unraw, TypeGraph,
};
use crate::config::CompilerConfig;
use crate::error::{AppError, AppResult};
use crate::oas::models::{Definition, FieldDef, Operation, Primitive, Route, Type};
use crate::oas::naming::normalize_type_name;
use crate::oas::validation::Constraint;
use crate::strategies::traits::Emitter;
use crate::type_mapping::{RustTypeMapper, TypeMapper};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

const DERIVES: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n";

/// Identifiers the handler signature reserves.
const RESERVED_ARGS: &[&str] = &["ctx", "body"];

/// Emission backend for Rust.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustEmitter {
    mapper: RustTypeMapper,
}

impl RustEmitter {
    /// A new emitter with the std type mapping.
    pub fn new() -> Self {
        Self::default()
    }

    fn scalar_type(&self, ty: &Type, graph: &TypeGraph<'_>) -> Option<(Primitive, String)> {
        match &ty.definition {
            Definition::Scalar { primitive, format } => Some((
                *primitive,
                self.mapper.map_scalar(*primitive, format.as_deref()),
            )),
            Definition::Alias(target) => graph
                .get(target)
                .and_then(|t| self.scalar_type(t, graph)),
            _ => None,
        }
    }

    fn render_struct(&self, ty: &Type, fields: &[FieldDef], graph: &TypeGraph<'_>) -> String {
        let mut code = String::from(DERIVES);
        code.push_str(&format!("pub struct {} {{\n", rust_type_ident(&ty.name)));
        for field in fields {
            let ident = rust_field_ident(&field.name);
            let mut attrs = Vec::new();
            if unraw(&ident) != field.wire_name {
                attrs.push(format!("rename = {:?}", field.wire_name));
            }
            if !field.required {
                attrs.push("default".to_string());
                attrs.push("skip_serializing_if = \"Option::is_none\"".to_string());
            }
            if !attrs.is_empty() {
                code.push_str(&format!("    #[serde({})]\n", attrs.join(", ")));
            }
            let field_type = self.mapper.field_type(
                &rust_type_ident(&field.type_name),
                !field.required || field.nullable,
                graph.is_recursive_edge(&ty.name, &field.type_name),
            );
            code.push_str(&format!("    pub {}: {},\n", ident, field_type));
        }
        code.push_str("}\n");
        code
    }

    fn render_union(&self, ty: &Type, variants: &[String], graph: &TypeGraph<'_>) -> String {
        let mut code = String::from(DERIVES);
        code.push_str("#[serde(untagged)]\n");
        code.push_str(&format!("pub enum {} {{\n", rust_type_ident(&ty.name)));
        for variant in variants {
            let payload = self.mapper.field_type(
                &rust_type_ident(variant),
                false,
                graph.is_recursive_edge(&ty.name, variant),
            );
            code.push_str(&format!(
                "    {}({}),\n",
                variant_ident(&ty.name, variant),
                payload
            ));
        }
        code.push_str("}\n");
        code
    }

    /// Check statements for a newtype over `primitive`.
    fn scalar_checks(&self, primitive: Primitive, rules: &[Constraint]) -> Vec<String> {
        let mut checks = Vec::new();
        for rule in rules {
            match (rule, primitive) {
                (Constraint::MaxLength { bound }, Primitive::String) => {
                    checks.push(length_check("self.0.chars().count()", ">", "maxLength", *bound))
                }
                (Constraint::MinLength { bound }, Primitive::String) => {
                    checks.push(length_check("self.0.chars().count()", "<", "minLength", *bound))
                }
                (Constraint::Pattern { pattern }, Primitive::String) => {
                    let pattern = pattern.as_str();
                    checks.push(format!(
                        "        match regex::Regex::new({pattern:?}) {{\n            \
                         Ok(re) if !re.is_match(&self.0) => {{\n                \
                         errors.push(format!(\"pattern: {{:?}} does not match {{}}\", self.0, {pattern:?}));\n            \
                         }}\n            \
                         _ => {{}}\n        \
                         }}\n"
                    ))
                }
                (Constraint::Maximum { bound, exclusive }, Primitive::Integer | Primitive::Number) => {
                    let op = if *exclusive { ">=" } else { ">" };
                    checks.push(bound_check(op, "maximum", *bound));
                }
                (Constraint::Minimum { bound, exclusive }, Primitive::Integer | Primitive::Number) => {
                    let op = if *exclusive { "<=" } else { "<" };
                    checks.push(bound_check(op, "minimum", *bound));
                }
                (Constraint::Enum { values }, _) => {
                    if let Some(check) = enum_check(primitive, values) {
                        checks.push(check);
                    }
                }
                _ => {}
            }
        }
        checks
    }

    fn render_validate(&self, ty: &Type, graph: &TypeGraph<'_>) -> String {
        let ident = rust_type_ident(&ty.name);
        let mut code = format!("impl {} {{\n", ident);
        code.push_str("    /// Checks every schema constraint, returning all failures.\n");
        code.push_str("    pub fn validate(&self) -> Result<(), Vec<String>> {\n");

        let checks = match &ty.definition {
            Definition::Union(variants) => {
                code.push_str(&union_validate_body(&ty.name, variants));
                code.push_str("    }\n}\n");
                return code;
            }
            Definition::Scalar { .. } => match self.scalar_type(ty, graph) {
                Some((primitive, _)) => self.scalar_checks(primitive, &ty.validation),
                None => Vec::new(),
            },
            Definition::Array { .. } => {
                let mut checks = Vec::new();
                for rule in &ty.validation {
                    match rule {
                        Constraint::MaxItems { bound } => {
                            checks.push(length_check("self.0.len()", ">", "maxItems", *bound))
                        }
                        Constraint::MinItems { bound } => {
                            checks.push(length_check("self.0.len()", "<", "minItems", *bound))
                        }
                        _ => {}
                    }
                }
                checks.push(
                    "        for (i, item) in self.0.iter().enumerate() {\n            \
                     if let Err(nested) = item.validate() {\n                \
                     errors.extend(nested.into_iter().map(|m| format!(\"[{}]: {}\", i, m)));\n            \
                     }\n        \
                     }\n"
                        .to_string(),
                );
                checks
            }
            Definition::Object(fields) => fields.iter().map(field_check).collect(),
            Definition::Alias(_) => Vec::new(),
        };

        if checks.is_empty() {
            code.push_str("        Ok(())\n");
        } else {
            code.push_str("        let mut errors = Vec::new();\n");
            for check in checks {
                code.push_str(&check);
            }
            code.push_str("        if errors.is_empty() {\n            Ok(())\n        } else {\n            Err(errors)\n        }\n");
        }
        code.push_str("    }\n}\n");
        code
    }

    fn render_response_enum(&self, op: &Operation, enum_name: &str) -> String {
        let mut code = format!("/// Responses of `{}`.\n", op.name);
        code.push_str("#[derive(Debug, Clone, PartialEq)]\n");
        code.push_str(&format!("pub enum {} {{\n", enum_name));
        for response in &op.responses {
            code.push_str(&doc_comment(response.description.as_deref(), "    "));
            let variant = status_variant(&response.status);
            match &response.type_name {
                Some(type_name) => code.push_str(&format!(
                    "    {}({}),\n",
                    variant,
                    rust_type_ident(type_name)
                )),
                None => code.push_str(&format!("    {},\n", variant)),
            }
        }
        code.push_str("}\n");
        code
    }

    fn render_method(&self, op: &Operation, response_type: &str) -> String {
        let mut code = String::new();
        let doc = op.summary.as_deref().or(op.description.as_deref());
        code.push_str(&doc_comment(doc, "    "));
        if doc.is_some() {
            code.push_str("    ///\n");
        }
        code.push_str(&format!("    /// `{} {}`\n", op.method, op.path));
        if op.deprecated {
            code.push_str("    ///\n    /// Deprecated.\n");
        }
        if !op.parameters.is_empty() {
            code.push_str("    ///\n    /// # Parameters\n    ///\n");
            for param in &op.parameters {
                let mut line = format!(
                    "    /// * `{}` ({})",
                    param.wire_name,
                    param.location.as_str()
                );
                if let Some(description) = &param.description {
                    line.push_str(&format!(": {}", description.lines().next().unwrap_or_default()));
                }
                code.push_str(&line);
                code.push('\n');
            }
        }

        code.push_str(&format!("    fn {}(\n", rust_field_ident(&op.name)));
        code.push_str("        &self,\n");
        code.push_str("        ctx: &Self::Context,\n");
        for param in &op.parameters {
            let mut ident = rust_field_ident(&param.name);
            if RESERVED_ARGS.contains(&ident.as_str()) {
                ident.push_str("_param");
            }
            let ty = self
                .mapper
                .field_type(&rust_type_ident(&param.type_name), !param.required, false);
            code.push_str(&format!("        {}: {},\n", ident, ty));
        }
        if let Some(body) = &op.request_body_type {
            let ty = self.mapper.field_type(
                &rust_type_ident(body),
                !op.request_body_required,
                false,
            );
            code.push_str(&format!("        body: {},\n", ty));
        }
        code.push_str(&format!(
            "    ) -> impl std::future::Future<Output = Result<{}, Self::Error>> + Send;\n",
            response_type
        ));
        code
    }
}

impl Emitter for RustEmitter {
    fn model_imports(&self, types: &[Type]) -> String {
        if types
            .iter()
            .all(|t| matches!(t.definition, Definition::Alias(_)))
        {
            return String::new();
        }
        "use serde::{Deserialize, Serialize};\n".to_string()
    }

    fn check_names(&self, types: &[Type]) -> AppResult<()> {
        let mut seen: HashMap<String, &str> = HashMap::with_capacity(types.len());
        for ty in types {
            let ident = rust_type_ident(&ty.name);
            if let Some(first) = seen.insert(ident.clone(), &ty.name) {
                return Err(AppError::NameCollision {
                    detail: format!("types '{}' and '{}' both emit as {}", first, ty.name, ident),
                    name: ident,
                });
            }
        }
        Ok(())
    }

    fn render_type(&self, ty: &Type, graph: &TypeGraph<'_>) -> AppResult<String> {
        let ident = rust_type_ident(&ty.name);
        let mut code = doc_comment(ty.docstring.as_deref(), "");

        match &ty.definition {
            Definition::Alias(target) => {
                code.push_str(&format!("pub type {} = {};\n", ident, rust_type_ident(target)));
                return Ok(code);
            }
            Definition::Scalar { primitive, format } => {
                code.push_str(DERIVES);
                code.push_str("#[serde(transparent)]\n");
                code.push_str(&format!(
                    "pub struct {}(pub {});\n",
                    ident,
                    self.mapper.map_scalar(*primitive, format.as_deref())
                ));
            }
            Definition::Array { item } => {
                code.push_str(DERIVES);
                code.push_str("#[serde(transparent)]\n");
                code.push_str(&format!(
                    "pub struct {}(pub {});\n",
                    ident,
                    self.mapper.sequence_type(&rust_type_ident(item))
                ));
            }
            Definition::Object(fields) => code.push_str(&self.render_struct(ty, fields, graph)),
            Definition::Union(variants) => code.push_str(&self.render_union(ty, variants, graph)),
        }

        code.push('\n');
        code.push_str(&self.render_validate(ty, graph));
        Ok(code)
    }

    fn render_interface(
        &self,
        operations: &[Operation],
        routes: &[Route],
        types: &[Type],
        config: &CompilerConfig,
    ) -> AppResult<String> {
        let interface = rust_type_ident(&normalize_type_name(&config.interface_name));
        if interface.is_empty() {
            return Err(AppError::General(format!(
                "interface name '{}' is not a valid identifier",
                config.interface_name
            )));
        }

        let taken: HashSet<String> = types.iter().map(|t| rust_type_ident(&t.name)).collect();
        if taken.contains(&interface) {
            return Err(AppError::NameCollision {
                name: interface,
                detail: "interface name clashes with a model type".into(),
            });
        }

        let mut code = String::new();
        let uses_models = operations.iter().any(|op| {
            !op.parameters.is_empty()
                || op.request_body_type.is_some()
                || op.responses.iter().any(|r| r.type_name.is_some())
        });
        if uses_models {
            code.push_str(&format!("use {}::*;\n\n", config.models_path));
        }

        let mut response_types = Vec::with_capacity(operations.len());
        for op in operations {
            if op.responses.is_empty() {
                response_types.push("()".to_string());
                continue;
            }
            let enum_name = rust_type_ident(&format!("{}Response", op.name));
            if taken.contains(&enum_name) || enum_name == interface {
                return Err(AppError::NameCollision {
                    name: enum_name,
                    detail: format!("response enum of {} clashes with another type", op.name),
                });
            }
            code.push_str(&self.render_response_enum(op, &enum_name));
            code.push('\n');
            response_types.push(enum_name);
        }

        code.push_str(&format!(
            "/// Handlers for every operation of the API.\npub trait {} {{\n",
            interface
        ));
        code.push_str("    /// Per-request context (authentication, request ids, ...).\n");
        code.push_str("    type Context;\n");
        code.push_str("    /// Error returned by every handler.\n");
        code.push_str("    type Error;\n");
        for (op, response_type) in operations.iter().zip(&response_types) {
            code.push('\n');
            code.push_str(&self.render_method(op, response_type));
        }
        code.push_str("}\n\n");

        code.push_str("/// Dispatch table: `(method, path, handler)`.\n");
        code.push_str(&format!(
            "pub const {}_ROUTES: &[(&str, &str, &str)] = &[\n",
            rust_const_ident(&interface)
        ));
        for route in routes {
            code.push_str(&format!(
                "    ({:?}, {:?}, {:?}),\n",
                route.method.as_str(),
                route.path,
                unraw(&rust_field_ident(&route.operation_name))
            ));
        }
        code.push_str("];\n");
        Ok(code)
    }
}

fn length_check(measure: &str, op: &str, keyword: &str, bound: u64) -> String {
    format!(
        "        let got = {measure};\n        \
         if got {op} {bound} {{\n            \
         errors.push(format!(\"{keyword}: got {{}}, want {bound}\", got));\n        \
         }}\n"
    )
}

fn bound_check(op: &str, keyword: &str, bound: f64) -> String {
    let literal = format!("{:?}_f64", bound);
    format!(
        "        if (self.0 as f64) {op} {literal} {{\n            \
         errors.push(format!(\"{keyword}: got {{}}, want {{}}\", self.0, {literal}));\n        \
         }}\n"
    )
}

/// Allowed-set check for values of the newtype's kind; `None` when no
/// listed value fits the kind.
fn enum_check(primitive: Primitive, values: &[Value]) -> Option<String> {
    let (literals, subject, shown): (Vec<String>, &str, &str) = match primitive {
        Primitive::String => (
            values
                .iter()
                .filter_map(Value::as_str)
                .map(|s| format!("{:?}", s))
                .collect(),
            "&self.0.as_str()",
            "{:?}",
        ),
        Primitive::Integer => (
            values
                .iter()
                .filter_map(Value::as_i64)
                .map(|n| n.to_string())
                .collect(),
            "&self.0",
            "{}",
        ),
        Primitive::Number => (
            values
                .iter()
                .filter_map(Value::as_f64)
                .map(|n| format!("{:?}", n))
                .collect(),
            "&self.0",
            "{}",
        ),
        Primitive::Boolean => (
            values
                .iter()
                .filter_map(Value::as_bool)
                .map(|b| b.to_string())
                .collect(),
            "&self.0",
            "{}",
        ),
        Primitive::Null => return None,
    };
    if literals.is_empty() {
        return None;
    }
    Some(format!(
        "        if ![{}].contains({subject}) {{\n            \
         errors.push(format!(\"enum: {shown} is not an allowed value\", self.0));\n        \
         }}\n",
        literals.join(", ")
    ))
}

fn field_check(field: &FieldDef) -> String {
    let ident = rust_field_ident(&field.name);
    let prefix = format!(
        "{}: {{}}",
        field.wire_name.replace('{', "{{").replace('}', "}}")
    );
    let report = format!(
        "errors.extend(nested.into_iter().map(|m| format!({:?}, m)));",
        prefix
    );
    if !field.required || field.nullable {
        format!(
            "        if let Some(value) = &self.{ident} {{\n            \
             if let Err(nested) = value.validate() {{\n                \
             {report}\n            \
             }}\n        \
             }}\n"
        )
    } else {
        format!(
            "        if let Err(nested) = self.{ident}.validate() {{\n            \
             {report}\n        \
             }}\n"
        )
    }
}

fn union_validate_body(union_name: &str, variants: &[String]) -> String {
    if variants.is_empty() {
        return "        match *self {}\n".to_string();
    }
    let mut code = String::from("        match self {\n");
    for variant in variants {
        code.push_str(&format!(
            "            Self::{}(value) => value.validate(),\n",
            variant_ident(union_name, variant)
        ));
    }
    code.push_str("        }\n");
    code
}

/// Variant identifier: the variant's type name with the union's prefix
/// dropped (`PetVariant2` in `Pet` -> `Variant2`).
fn variant_ident(union_name: &str, variant: &str) -> String {
    match variant.strip_prefix(union_name) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => rest.to_string(),
        _ => rust_type_ident(variant),
    }
}

/// `200` -> `Status200`, `default` -> `Default`, `4XX` -> `Status4XX`.
fn status_variant(status: &str) -> String {
    let name = normalize_type_name(status);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Status{}", name)
    } else if name.is_empty() {
        "Unknown".to_string()
    } else {
        name
    }
}
