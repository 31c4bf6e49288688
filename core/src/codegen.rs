#![deny(missing_docs)]

//! # Code Generation
//!
//! Drives an [`Emitter`] over a [`CompiledApi`] and provides the identifier
//! and comment helpers emitters share.
//!
//! - Field and method identifiers are snake_case, with keywords raw-escaped.
//! - Type identifiers keep the IR's PascalCase name unless it would shadow a
//!   prelude type.
//! - Generated files carry a "do not edit" header naming the command line.

use crate::compiler::CompiledApi;
use crate::config::CompilerConfig;
use crate::error::AppResult;
use crate::oas::models::{Definition, Type};
use crate::strategies::Emitter;
use heck::{ToShoutySnakeCase, ToSnakeCase};
use std::collections::{HashMap, HashSet};

/// Rust keywords that can be used as raw identifiers.
const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const PATH_KEYWORDS: &[&str] = &["crate", "self", "super", "Self"];

/// Prelude names a generated type must not shadow.
const PRELUDE_TYPES: &[&str] = &[
    "Box", "Err", "None", "Ok", "Option", "Result", "Some", "String", "Vec",
];

/// Output of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSources {
    /// Model declarations.
    pub models: String,
    /// Handler interface and route table.
    pub interface: String,
}

/// Containment graph over Types, used to find edges that need indirection.
///
/// An edge is "inline" when the child is stored by value in the parent:
/// object fields, union variants and alias targets. Array items live on the
/// heap and never make a type infinitely sized.
#[derive(Debug)]
pub struct TypeGraph<'a> {
    types: HashMap<&'a str, &'a Type>,
}

impl<'a> TypeGraph<'a> {
    /// Indexes `types` by name.
    pub fn new(types: &'a [Type]) -> Self {
        Self {
            types: types.iter().map(|t| (t.name.as_str(), t)).collect(),
        }
    }

    /// Looks a Type up by name.
    pub fn get(&self, name: &str) -> Option<&'a Type> {
        self.types.get(name).copied()
    }

    /// True when storing `to` inline inside `from` would make `from`
    /// contain itself.
    pub fn is_recursive_edge(&self, from: &str, to: &str) -> bool {
        let mut stack = vec![to];
        let mut visited = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == from {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(ty) = self.types.get(current) {
                stack.extend(inline_children(ty));
            }
        }
        false
    }
}

fn inline_children(ty: &Type) -> Vec<&str> {
    match &ty.definition {
        Definition::Object(fields) => fields.iter().map(|f| f.type_name.as_str()).collect(),
        Definition::Union(variants) => variants.iter().map(String::as_str).collect(),
        Definition::Alias(target) => vec![target.as_str()],
        Definition::Scalar { .. } | Definition::Array { .. } => Vec::new(),
    }
}

/// Renders both artifacts, each prefixed with `header`.
pub fn generate_sources(
    api: &CompiledApi,
    emitter: &dyn Emitter,
    config: &CompilerConfig,
    header: &str,
) -> AppResult<GeneratedSources> {
    let models = emitter.render_models(&api.types)?;
    let interface = emitter.render_interface(&api.operations, &api.routes, &api.types, config)?;
    Ok(GeneratedSources {
        models: format!("{}{}", header, models),
        interface: format!("{}{}", header, interface),
    })
}

/// The banner placed at the top of every generated file.
pub fn generated_header(command_line: &str) -> String {
    format!(
        "// Code generated by oasgen. DO NOT EDIT.\n// Command: {}\n\n",
        command_line.trim()
    )
}

/// snake_case identifier for a field, parameter or method.
pub fn rust_field_ident(name: &str) -> String {
    let snake = name.to_snake_case();
    let ident = match snake.chars().next() {
        None => "field".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", snake),
        Some(_) => snake,
    };
    if RAW_KEYWORDS.contains(&ident.as_str()) {
        format!("r#{}", ident)
    } else if PATH_KEYWORDS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// The identifier with any `r#` prefix removed, as serde sees it.
pub fn unraw(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

/// Identifier for a generated type.
pub fn rust_type_ident(name: &str) -> String {
    match name.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("T{}", name),
        _ if PRELUDE_TYPES.contains(&name) || PATH_KEYWORDS.contains(&name) => {
            format!("{}Model", name)
        }
        _ => name.to_string(),
    }
}

/// SCREAMING_SNAKE_CASE identifier for a constant.
pub fn rust_const_ident(name: &str) -> String {
    name.to_shouty_snake_case()
}

/// `///` lines for `text`, one per source line.
pub fn doc_comment(text: Option<&str>, indent: &str) -> String {
    let mut code = String::new();
    if let Some(text) = text {
        for line in text.trim().lines() {
            let line = line.trim_end();
            if line.is_empty() {
                code.push_str(&format!("{}///\n", indent));
            } else {
                code.push_str(&format!("{}/// {}\n", indent, line));
            }
        }
    }
    code
}
