#![deny(missing_docs)]

//! # Emitter Trait
//!
//! Defines the interface a target language backend implements to turn the
//! compiled model into source text.

use crate::codegen::TypeGraph;
use crate::config::CompilerConfig;
use crate::error::AppResult;
use crate::oas::models::{Operation, Route, Type};

/// A strategy trait for decoupling language-specific code generation.
///
/// Implementors render the model declarations and the handler interface.
/// The default [`Emitter::render_models`] stitches the per-type pieces
/// together; most backends only need the per-type hooks.
pub trait Emitter {
    /// Imports (or preamble) for the models file. Empty when nothing is needed.
    fn model_imports(&self, types: &[Type]) -> String;

    /// Renders one declaration, including its validation routine.
    ///
    /// # Arguments
    ///
    /// * `ty` - The Type to render.
    /// * `graph` - Every Type of the run, for recursion analysis.
    fn render_type(&self, ty: &Type, graph: &TypeGraph<'_>) -> AppResult<String>;

    /// Rejects Types whose emitted names coincide. Accepts everything by default.
    fn check_names(&self, _types: &[Type]) -> AppResult<()> {
        Ok(())
    }

    /// Renders every declaration in order.
    fn render_models(&self, types: &[Type]) -> AppResult<String> {
        self.check_names(types)?;
        let graph = TypeGraph::new(types);
        let mut code = self.model_imports(types);
        for ty in types {
            if !code.is_empty() {
                code.push('\n');
            }
            code.push_str(&self.render_type(ty, &graph)?);
        }
        Ok(code)
    }

    /// Renders the handler interface and route table.
    ///
    /// # Arguments
    ///
    /// * `operations` - Operations in extraction order.
    /// * `routes` - Routes, parallel to `operations`.
    /// * `types` - Model Types, to keep generated names apart from them.
    /// * `config` - Interface name and model import path.
    fn render_interface(
        &self,
        operations: &[Operation],
        routes: &[Route],
        types: &[Type],
        config: &CompilerConfig,
    ) -> AppResult<String>;
}
