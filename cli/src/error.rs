#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use oasgen_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Compilation or emission failure from the core library.
    #[display("{}", _0)]
    Compile(AppError),

    /// The compiler config file could not be loaded.
    #[from(ignore)]
    #[display("Invalid config file: {}", _0)]
    Config(String),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// `General(String)` holds no error source, so `derive(Error)` does not fit.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_pass_through() {
        let err: CliError = AppError::MissingJsonContent {
            operation: "PutSquare".into(),
        }
        .into();
        assert_eq!(err.to_string(), "no JSON content for PutSquare request body");
    }

    #[test]
    fn test_general_from_string() {
        let err: CliError = String::from("boom").into();
        assert_eq!(err.to_string(), "Operation failed: boom");
    }
}
