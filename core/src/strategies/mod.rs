#![deny(missing_docs)]

//! # Strategies
//!
//! This module defines the architecture for pluggable emission backends.
//!
//! - **traits**: Defines `Emitter` for implementing new targets.
//! - **rust**: The default implementation, emitting serde models and an
//!   async handler trait.

pub mod rust;
pub mod traits;

// Re-export for easier access downstream
pub use rust::RustEmitter;
pub use traits::Emitter;
