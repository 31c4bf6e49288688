#![deny(missing_docs)]

//! # Schema Table
//!
//! Every component schema resolved once, keyed by normalized type name.
//! The table is complete before anything is flattened, so references can be
//! checked regardless of declaration order.

use crate::config::CompilerConfig;
use crate::error::{AppError, AppResult};
use crate::oas::document::Components;
use crate::oas::models::Model;
use crate::oas::naming::normalize_type_name;
use crate::oas::resolver::resolve;
use indexmap::IndexMap;

/// Component schemas by type name, in document order.
///
/// A component that is itself a `$ref` is stored as a reference model whose
/// `name` is the target; its key is the alias name.
#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    models: IndexMap<String, Model>,
    sources: IndexMap<String, String>,
}

impl SchemaTable {
    /// Resolves every entry of `components.schemas`.
    ///
    /// Two component keys normalizing to the same type name are a
    /// `NameCollision`.
    pub fn from_components(
        components: Option<&Components>,
        config: &CompilerConfig,
    ) -> AppResult<Self> {
        let mut table = Self::default();
        let Some(components) = components else {
            return Ok(table);
        };

        for (key, schema) in &components.schemas {
            let name = normalize_type_name(key);
            if name.is_empty() {
                return Err(AppError::UnsupportedSchemaType {
                    schema: key.clone(),
                    found: "a name without alphanumeric characters".into(),
                });
            }
            if let Some(previous) = table.sources.get(&name) {
                return Err(AppError::NameCollision {
                    name,
                    detail: format!("components '{}' and '{}' normalize to it", previous, key),
                });
            }
            let model = resolve(key, schema, config)?;
            tracing::debug!(component = %key, type_name = %name, "resolved component schema");
            table.sources.insert(name.clone(), key.clone());
            table.models.insert(name, model);
        }
        Ok(table)
    }

    /// Looks a type name up.
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// True if `name` is a component type.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Component key a type name came from.
    pub fn source_key(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(String::as_str)
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True when the document declares no schemas.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::ModelKind;

    fn components(yaml: &str) -> Components {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_table_in_document_order() {
        let c = components(
            r#"
schemas:
  winner: {type: string, maxLength: 1}
  board: {type: string}
  status:
    type: object
    properties:
      winner: {$ref: '#/components/schemas/winner'}
"#,
        );
        let table = SchemaTable::from_components(Some(&c), &CompilerConfig::default()).unwrap();
        let names: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Winner", "Board", "Status"]);
        assert_eq!(table.source_key("Status"), Some("status"));
        assert!(matches!(
            table.get("Status").unwrap().kind,
            ModelKind::Object(_)
        ));
    }

    #[test]
    fn test_alias_component() {
        let c = components("schemas:\n  User: {type: object}\n  Owner: {$ref: '#/components/schemas/User'}\n");
        let table = SchemaTable::from_components(Some(&c), &CompilerConfig::default()).unwrap();
        let owner = table.get("Owner").unwrap();
        assert!(owner.is_reference());
        assert_eq!(owner.name, "User");
    }

    #[test]
    fn test_normalized_key_collision() {
        let c = components("schemas:\n  user_id: {type: string}\n  UserId: {type: integer}\n");
        let err = SchemaTable::from_components(Some(&c), &CompilerConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::NameCollision { .. }));
    }

    #[test]
    fn test_empty_components() {
        let table = SchemaTable::from_components(None, &CompilerConfig::default()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}
