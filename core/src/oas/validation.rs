#![deny(missing_docs)]

//! # Validation Constraints
//!
//! Compiles schema-level constraint keywords into [`Constraint`] checks that
//! travel with each [`Type`] and can be run against JSON values.
//!
//! Only the keywords that apply to a model's shape are compiled: lengths and
//! patterns for strings, bounds for numbers, item counts for arrays and
//! required-ness for objects. `enum` applies to every scalar.

use crate::error::{AppError, AppResult};
use crate::oas::document::{ExclusiveBound, Schema};
use crate::oas::models::{Primitive, Type};
use derive_more::Display;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// What a constraint set is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A scalar of the given kind.
    Scalar(Primitive),
    /// An array.
    Array,
    /// An object.
    Object,
    /// A union; only `enum` applies.
    Union,
}

/// A regular expression compiled when its constraint is compiled.
///
/// Compared and serialized by its source text.
#[derive(Clone)]
pub struct CompiledPattern(Regex);

impl CompiledPattern {
    /// Compiles `source`.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// The expression as written in the schema.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True if `haystack` contains a match.
    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for CompiledPattern {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A single check embedded in a type's validation routine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "camelCase")]
pub enum Constraint {
    /// String length (Unicode scalar values) must not exceed `bound`.
    MaxLength {
        /// Inclusive upper bound.
        bound: u64,
    },
    /// String length must be at least `bound`.
    MinLength {
        /// Inclusive lower bound.
        bound: u64,
    },
    /// Upper numeric bound.
    Maximum {
        /// The bound.
        bound: f64,
        /// `value < bound` instead of `value <= bound`.
        exclusive: bool,
    },
    /// Lower numeric bound.
    Minimum {
        /// The bound.
        bound: f64,
        /// `value > bound` instead of `value >= bound`.
        exclusive: bool,
    },
    /// String must match the regular expression.
    Pattern {
        /// The expression, compiled once.
        pattern: CompiledPattern,
    },
    /// Array length must not exceed `bound`.
    MaxItems {
        /// Inclusive upper bound.
        bound: u64,
    },
    /// Array length must be at least `bound`.
    MinItems {
        /// Inclusive lower bound.
        bound: u64,
    },
    /// Value must be one of `values`.
    Enum {
        /// Allowed values.
        values: Vec<Value>,
    },
    /// Object must carry the property.
    Required {
        /// Property key as written in the document.
        field: String,
    },
}

/// A failed check.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum Violation {
    /// String too long.
    #[display("maxLength: got {got}, want {want}")]
    MaxLength {
        /// Actual length.
        got: u64,
        /// Bound.
        want: u64,
    },
    /// String too short.
    #[display("minLength: got {got}, want {want}")]
    MinLength {
        /// Actual length.
        got: u64,
        /// Bound.
        want: u64,
    },
    /// Number above the bound.
    #[display("maximum: got {got}, want {want}")]
    Maximum {
        /// Actual value.
        got: f64,
        /// Bound.
        want: f64,
    },
    /// Number below the bound.
    #[display("minimum: got {got}, want {want}")]
    Minimum {
        /// Actual value.
        got: f64,
        /// Bound.
        want: f64,
    },
    /// String does not match.
    #[display("pattern: {got:?} does not match {pattern}")]
    Pattern {
        /// Actual string.
        got: String,
        /// Expression.
        pattern: String,
    },
    /// Too many items.
    #[display("maxItems: got {got}, want {want}")]
    MaxItems {
        /// Actual length.
        got: u64,
        /// Bound.
        want: u64,
    },
    /// Too few items.
    #[display("minItems: got {got}, want {want}")]
    MinItems {
        /// Actual length.
        got: u64,
        /// Bound.
        want: u64,
    },
    /// Value outside the allowed set.
    #[display("enum: {got} is not an allowed value")]
    Enum {
        /// Actual value.
        got: Value,
    },
    /// Missing property.
    #[display("required: missing {field}")]
    Required {
        /// Property key.
        field: String,
    },
}

impl std::error::Error for Violation {}

fn upper_bound(inclusive: Option<f64>, exclusive: Option<ExclusiveBound>) -> Vec<Constraint> {
    bounds(inclusive, exclusive, |bound, exclusive| Constraint::Maximum {
        bound,
        exclusive,
    })
}

fn lower_bound(inclusive: Option<f64>, exclusive: Option<ExclusiveBound>) -> Vec<Constraint> {
    bounds(inclusive, exclusive, |bound, exclusive| Constraint::Minimum {
        bound,
        exclusive,
    })
}

/// Folds the 3.0 flag form and the 3.1 value form into bound checks.
fn bounds(
    inclusive: Option<f64>,
    exclusive: Option<ExclusiveBound>,
    make: impl Fn(f64, bool) -> Constraint,
) -> Vec<Constraint> {
    match (inclusive, exclusive) {
        (Some(bound), Some(ExclusiveBound::Flag(flag))) => vec![make(bound, flag)],
        (Some(bound), Some(ExclusiveBound::Value(strict))) => {
            vec![make(bound, false), make(strict, true)]
        }
        (Some(bound), None) => vec![make(bound, false)],
        (None, Some(ExclusiveBound::Value(strict))) => vec![make(strict, true)],
        (None, Some(ExclusiveBound::Flag(_))) | (None, None) => Vec::new(),
    }
}

/// Compiles the constraint keywords of `schema` that apply to `target`.
///
/// # Arguments
///
/// * `name` - Type name the schema resolves to, for diagnostics.
/// * `schema` - The schema carrying the keywords.
/// * `target` - The shape the schema resolved to.
pub fn compile_constraints(name: &str, schema: &Schema, target: Target) -> AppResult<Vec<Constraint>> {
    let mut rules = Vec::new();

    match target {
        Target::Scalar(Primitive::String) => {
            if let Some(bound) = schema.max_length {
                rules.push(Constraint::MaxLength { bound });
            }
            if let Some(bound) = schema.min_length {
                rules.push(Constraint::MinLength { bound });
            }
            if let Some(pattern) = &schema.pattern {
                let pattern =
                    CompiledPattern::new(pattern).map_err(|e| AppError::InvalidConstraint {
                        schema: name.to_string(),
                        detail: format!("pattern {:?}: {}", pattern, e),
                    })?;
                rules.push(Constraint::Pattern { pattern });
            }
        }
        Target::Scalar(Primitive::Integer) | Target::Scalar(Primitive::Number) => {
            rules.extend(upper_bound(schema.maximum, schema.exclusive_maximum));
            rules.extend(lower_bound(schema.minimum, schema.exclusive_minimum));
        }
        Target::Array => {
            if let Some(bound) = schema.max_items {
                rules.push(Constraint::MaxItems { bound });
            }
            if let Some(bound) = schema.min_items {
                rules.push(Constraint::MinItems { bound });
            }
        }
        Target::Object => {
            for field in &schema.required {
                rules.push(Constraint::Required {
                    field: field.clone(),
                });
            }
        }
        Target::Scalar(_) | Target::Union => {}
    }

    if !matches!(target, Target::Object | Target::Array) {
        if let Some(values) = &schema.enum_values {
            rules.push(Constraint::Enum {
                values: values.clone(),
            });
        }
    }

    Ok(rules)
}

impl Constraint {
    /// Runs the check. Values of a kind the check does not apply to pass.
    pub fn check(&self, value: &Value) -> Result<(), Violation> {
        match (self, value) {
            (Self::MaxLength { bound }, Value::String(s)) => {
                let got = s.chars().count() as u64;
                if got > *bound {
                    return Err(Violation::MaxLength { got, want: *bound });
                }
            }
            (Self::MinLength { bound }, Value::String(s)) => {
                let got = s.chars().count() as u64;
                if got < *bound {
                    return Err(Violation::MinLength { got, want: *bound });
                }
            }
            (Self::Maximum { bound, exclusive }, Value::Number(n)) => {
                let got = n.as_f64().unwrap_or(f64::NAN);
                let over = if *exclusive { got >= *bound } else { got > *bound };
                if over {
                    return Err(Violation::Maximum { got, want: *bound });
                }
            }
            (Self::Minimum { bound, exclusive }, Value::Number(n)) => {
                let got = n.as_f64().unwrap_or(f64::NAN);
                let under = if *exclusive { got <= *bound } else { got < *bound };
                if under {
                    return Err(Violation::Minimum { got, want: *bound });
                }
            }
            (Self::Pattern { pattern }, Value::String(s)) => {
                if !pattern.is_match(s) {
                    return Err(Violation::Pattern {
                        got: s.clone(),
                        pattern: pattern.as_str().to_string(),
                    });
                }
            }
            (Self::MaxItems { bound }, Value::Array(items)) => {
                let got = items.len() as u64;
                if got > *bound {
                    return Err(Violation::MaxItems { got, want: *bound });
                }
            }
            (Self::MinItems { bound }, Value::Array(items)) => {
                let got = items.len() as u64;
                if got < *bound {
                    return Err(Violation::MinItems { got, want: *bound });
                }
            }
            (Self::Enum { values }, v) => {
                if !values.contains(v) {
                    return Err(Violation::Enum { got: v.clone() });
                }
            }
            (Self::Required { field }, Value::Object(map)) => {
                if !map.contains_key(field) {
                    return Err(Violation::Required {
                        field: field.clone(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl Type {
    /// Runs every rule of this type against `value`, collecting all failures.
    ///
    /// Only this type's own rules run; nested fields are validated through
    /// their own types.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> = self
            .validation
            .iter()
            .filter_map(|rule| rule.check(value).err())
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::Definition;
    use serde_json::json;

    fn string_schema(yaml: &str) -> Schema {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_max_length_boundary() {
        let schema = string_schema("type: string\nmaxLength: 256\n");
        let rules = compile_constraints("ErrorMessage", &schema, Target::Scalar(Primitive::String))
            .unwrap();
        assert_eq!(rules, vec![Constraint::MaxLength { bound: 256 }]);

        let ok = json!("x".repeat(256));
        let too_long = json!("x".repeat(257));
        assert!(rules[0].check(&ok).is_ok());
        assert_eq!(
            rules[0].check(&too_long).unwrap_err(),
            Violation::MaxLength { got: 257, want: 256 }
        );
        assert_eq!(
            rules[0].check(&too_long).unwrap_err().to_string(),
            "maxLength: got 257, want 256"
        );
    }

    #[test]
    fn test_length_counts_characters() {
        let rule = Constraint::MaxLength { bound: 2 };
        assert!(rule.check(&json!("éé")).is_ok());
    }

    #[test]
    fn test_numeric_bounds_both_dialects() {
        let v30 = string_schema("type: integer\nmaximum: 10\nexclusiveMaximum: true\nminimum: 0\n");
        let rules = compile_constraints("N", &v30, Target::Scalar(Primitive::Integer)).unwrap();
        assert_eq!(
            rules,
            vec![
                Constraint::Maximum { bound: 10.0, exclusive: true },
                Constraint::Minimum { bound: 0.0, exclusive: false },
            ]
        );
        assert!(rules[0].check(&json!(9)).is_ok());
        assert!(rules[0].check(&json!(10)).is_err());
        assert!(rules[1].check(&json!(0)).is_ok());
        assert!(rules[1].check(&json!(-1)).is_err());

        let v31 = string_schema("type: number\nexclusiveMinimum: 1.5\n");
        let rules = compile_constraints("N", &v31, Target::Scalar(Primitive::Number)).unwrap();
        assert_eq!(rules, vec![Constraint::Minimum { bound: 1.5, exclusive: true }]);
    }

    #[test]
    fn test_keywords_filtered_by_target() {
        let schema = string_schema("type: integer\nmaxLength: 3\nmaximum: 5\n");
        let rules = compile_constraints("N", &schema, Target::Scalar(Primitive::Integer)).unwrap();
        assert_eq!(rules, vec![Constraint::Maximum { bound: 5.0, exclusive: false }]);
    }

    #[test]
    fn test_pattern_compiled_once_and_checked() {
        let schema = string_schema("type: string\npattern: '^[A-Z]{2}$'\n");
        let rules =
            compile_constraints("Code", &schema, Target::Scalar(Primitive::String)).unwrap();
        let Constraint::Pattern { pattern } = &rules[0] else {
            panic!("pattern expected")
        };
        assert_eq!(pattern.as_str(), "^[A-Z]{2}$");
        assert_eq!(*pattern, CompiledPattern::new("^[A-Z]{2}$").unwrap());

        assert!(rules[0].check(&json!("AB")).is_ok());
        assert_eq!(
            rules[0].check(&json!("abc")).unwrap_err().to_string(),
            "pattern: \"abc\" does not match ^[A-Z]{2}$"
        );
        assert_eq!(
            serde_json::to_value(&rules[0]).unwrap(),
            json!({"check": "pattern", "pattern": "^[A-Z]{2}$"})
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let schema = string_schema("type: string\npattern: '(unclosed'\n");
        let err =
            compile_constraints("Code", &schema, Target::Scalar(Primitive::String)).unwrap_err();
        assert!(matches!(err, AppError::InvalidConstraint { .. }));
    }

    #[test]
    fn test_type_validate_collects_everything() {
        let schema = string_schema("type: object\nrequired: [winner, board]\n");
        let rules = compile_constraints("Status", &schema, Target::Object).unwrap();
        let ty = Type {
            name: "Status".into(),
            docstring: None,
            deprecated: false,
            definition: Definition::Object(Vec::new()),
            validation: rules,
        };
        assert!(ty.validate(&json!({"winner": ".", "board": "..."})).is_ok());
        let errs = ty.validate(&json!({})).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].to_string(), "required: missing winner");
    }

    #[test]
    fn test_enum_and_items() {
        let schema = string_schema("type: string\nenum: [X, O]\n");
        let rules = compile_constraints("Mark", &schema, Target::Scalar(Primitive::String)).unwrap();
        assert!(rules[0].check(&json!("X")).is_ok());
        assert!(rules[0].check(&json!("Z")).is_err());

        let schema = string_schema("type: array\nminItems: 1\nmaxItems: 3\n");
        let rules = compile_constraints("Row", &schema, Target::Array).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules[0].check(&json!([1, 2, 3, 4])).is_err());
        assert!(rules[1].check(&json!([])).is_err());
    }
}
