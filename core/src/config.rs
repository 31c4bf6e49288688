//! # Compiler Configuration
//!
//! Knobs that change naming and emission without changing the model's
//! structure. Deserializable so the CLI can load them from a YAML file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder syntax used for path parameters in emitted routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `/board/:row` (Fiber, Express, axum 0.7).
    #[default]
    Colon,
    /// `/board/{row}` (Actix, axum 0.8), i.e. the OpenAPI template unchanged.
    Braces,
}

/// How nested property types are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldNaming {
    /// `<ParentName><PropertyName>`; unique as long as sibling names are.
    #[default]
    Prefixed,
    /// `<PropertyName>` alone. Shorter, but unrelated objects sharing a
    /// property name with a different shape end in a name collision.
    Bare,
}

/// Options for one compilation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompilerConfig {
    /// Name of the generated handler interface.
    pub interface_name: String,
    /// Placeholder syntax for route paths.
    pub path_style: PathStyle,
    /// Naming scheme for nested property types.
    pub field_naming: FieldNaming,
    /// Module path the interface file imports model types from.
    pub models_path: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            interface_name: "Handlers".to_string(),
            path_style: PathStyle::default(),
            field_naming: FieldNaming::default(),
            models_path: "crate::models".to_string(),
        }
    }
}

impl FromStr for PathStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "colon" => Ok(Self::Colon),
            "braces" => Ok(Self::Braces),
            other => Err(format!("unknown path style '{}' (colon|braces)", other)),
        }
    }
}

impl fmt::Display for PathStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Colon => write!(f, "colon"),
            Self::Braces => write!(f, "braces"),
        }
    }
}

impl FromStr for FieldNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prefixed" => Ok(Self::Prefixed),
            "bare" => Ok(Self::Bare),
            other => Err(format!("unknown field naming '{}' (prefixed|bare)", other)),
        }
    }
}

impl fmt::Display for FieldNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefixed => write!(f, "prefixed"),
            Self::Bare => write!(f, "bare"),
        }
    }
}
