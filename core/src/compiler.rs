#![deny(missing_docs)]

//! # Compiler Pipeline
//!
//! Document -> schema table -> operations -> flattened Types.
//!
//! The whole run is a pure function of the document and the config: the same
//! input always yields the same Types, Operations and Routes in the same
//! order. The first error aborts the run.

use crate::config::CompilerConfig;
use crate::error::AppResult;
use crate::oas::document::{parse_document, Document};
use crate::oas::flatten::flatten_all;
use crate::oas::models::{Definition, Operation, Route, Type};
use crate::oas::registry::SchemaTable;
use crate::oas::routes::extract_operations;
use serde::Serialize;
use serde_json::Value;

/// Everything an emitter needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledApi {
    /// Unique, flattened declarations. Components first, in document order,
    /// followed by types introduced by operations.
    pub types: Vec<Type>,
    /// Operations in path, then method order.
    pub operations: Vec<Operation>,
    /// Routes, parallel to `operations`.
    pub routes: Vec<Route>,
}

/// Compiles a parsed document.
pub fn compile(document: &Document, config: &CompilerConfig) -> AppResult<CompiledApi> {
    let table = SchemaTable::from_components(document.components.as_ref(), config)?;
    let extraction = extract_operations(document, config)?;
    let types = flatten_all(&table, &extraction.models)?;

    tracing::info!(
        types = types.len(),
        operations = extraction.operations.len(),
        "compiled document"
    );

    Ok(CompiledApi {
        types,
        operations: extraction.operations,
        routes: extraction.routes,
    })
}

/// Parses and compiles a YAML or JSON document.
pub fn compile_str(content: &str, config: &CompilerConfig) -> AppResult<CompiledApi> {
    let document = parse_document(content)?;
    compile(&document, config)
}

impl CompiledApi {
    /// Looks a Type up by name.
    pub fn find_type(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Looks an Operation up by name.
    pub fn find_operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|o| o.name == name)
    }

    /// Validates a JSON value against a Type and everything it contains.
    ///
    /// Messages are prefixed with the JSON path of the offending value
    /// (`$.board[2]: maxLength: got 2, want 1`).
    pub fn validate(&self, type_name: &str, value: &Value) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        self.validate_at(type_name, value, "$", &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_at(&self, type_name: &str, value: &Value, at: &str, errors: &mut Vec<String>) {
        let Some(ty) = self.find_type(type_name) else {
            errors.push(format!("{}: unknown type {}", at, type_name));
            return;
        };
        if let Err(violations) = ty.validate(value) {
            errors.extend(violations.into_iter().map(|v| format!("{}: {}", at, v)));
        }

        match (&ty.definition, value) {
            (Definition::Alias(target), _) => self.validate_at(target, value, at, errors),
            (Definition::Object(fields), Value::Object(map)) => {
                for field in fields {
                    let Some(child) = map.get(&field.wire_name) else {
                        continue;
                    };
                    if child.is_null() && field.nullable {
                        continue;
                    }
                    let path = format!("{}.{}", at, field.wire_name);
                    self.validate_at(&field.type_name, child, &path, errors);
                }
            }
            (Definition::Array { item }, Value::Array(items)) => {
                for (i, child) in items.iter().enumerate() {
                    let path = format!("{}[{}]", at, i);
                    self.validate_at(item, child, &path, errors);
                }
            }
            (Definition::Union(variants), _) if !variants.is_empty() => {
                let matched = variants.iter().any(|variant| {
                    let mut scratch = Vec::new();
                    self.validate_at(variant, value, at, &mut scratch);
                    scratch.is_empty()
                });
                if !matched {
                    errors.push(format!("{}: matches no variant of {}", at, ty.name));
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const GAME: &str = r#"
openapi: 3.1.0
info: {title: Game, version: 1.0.0}
paths:
  /board:
    get:
      operationId: getBoard
      responses:
        '200':
          description: Board
          content:
            application/json:
              schema: {$ref: '#/components/schemas/status'}
components:
  schemas:
    errorMessage: {type: string, maxLength: 256}
    mark: {type: string, maxLength: 1}
    status:
      type: object
      required: [winner, board]
      properties:
        winner: {$ref: '#/components/schemas/mark'}
        board:
          type: array
          maxItems: 9
          items: {$ref: '#/components/schemas/mark'}
"#;

    #[test]
    fn test_compile_is_deterministic() {
        let config = CompilerConfig::default();
        let first = compile_str(GAME, &config).unwrap();
        let second = compile_str(GAME, &config).unwrap();
        assert_eq!(first, second);

        let names: Vec<_> = first.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ErrorMessage", "Mark", "Status", "StatusBoard"]);
        assert_eq!(first.routes.len(), 1);
        assert_eq!(
            first.find_operation("GetBoard").unwrap().responses[0].type_name.as_deref(),
            Some("Status")
        );
    }

    #[test]
    fn test_error_message_length_check() {
        let api = compile_str(GAME, &CompilerConfig::default()).unwrap();
        assert!(api.validate("ErrorMessage", &json!("a".repeat(256))).is_ok());
        assert_eq!(
            api.validate("ErrorMessage", &json!("a".repeat(257))).unwrap_err(),
            vec!["$: maxLength: got 257, want 256".to_string()]
        );
    }

    #[test]
    fn test_nested_validation_paths() {
        let api = compile_str(GAME, &CompilerConfig::default()).unwrap();
        assert!(api
            .validate("Status", &json!({"winner": "X", "board": ["X", "O", "."]}))
            .is_ok());

        let errors = api
            .validate("Status", &json!({"winner": "XX", "board": ["X", "OO"]}))
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                "$.winner: maxLength: got 2, want 1".to_string(),
                "$.board[1]: maxLength: got 2, want 1".to_string(),
            ]
        );

        let errors = api.validate("Status", &json!({})).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
