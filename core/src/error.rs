//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every compile error is fatal for the current run. Variants carry the
//! offending schema, operation or path so the message alone is enough to
//! find the problem in the source document.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The document could not be parsed or declares an unsupported version.
    #[from(ignore)]
    #[display("Document Error: {_0}")]
    Document(String),

    /// A `$ref` points outside `#/components/schemas` (other sections, files, URLs).
    #[from(ignore)]
    #[display("unsupported reference '{reference}' in {context}")]
    UnsupportedReference {
        /// The raw reference string.
        reference: String,
        /// Where the reference was found.
        context: String,
    },

    /// The schema's primitive kind is absent or unrecognized.
    #[from(ignore)]
    #[display("unsupported schema type '{found}' for {schema}")]
    UnsupportedSchemaType {
        /// Name the schema was being resolved under.
        schema: String,
        /// The declared kind, or `<none>`.
        found: String,
    },

    /// An array schema without `items`.
    #[from(ignore)]
    #[display("array schema {schema} must have an items property")]
    InvalidArraySchema {
        /// Name the schema was being resolved under.
        schema: String,
    },

    /// An array schema whose `items` is a boolean schema.
    #[from(ignore)]
    #[display("array schema {schema} with boolean items is not supported")]
    UnsupportedItemsType {
        /// Name the schema was being resolved under.
        schema: String,
    },

    /// An operation without an `operationId`.
    #[from(ignore)]
    #[display("operationId is empty for {method} {path}")]
    MissingOperationId {
        /// HTTP method of the slot.
        method: String,
        /// Path template.
        path: String,
    },

    /// A request body without a JSON representation.
    #[from(ignore)]
    #[display("no JSON content for {operation} request body")]
    MissingJsonContent {
        /// Normalized operation name.
        operation: String,
    },

    /// Two distinct shapes normalize to the same type name.
    #[from(ignore)]
    #[display("type name collision on '{name}': {detail}")]
    NameCollision {
        /// The colliding type name.
        name: String,
        /// What collided.
        detail: String,
    },

    /// A reference names a schema absent from the component table.
    #[from(ignore)]
    #[display("reference to unknown schema '{name}' from {context}")]
    UnresolvedReference {
        /// The referenced type name.
        name: String,
        /// The type that holds the reference.
        context: String,
    },

    /// A constraint keyword that cannot be compiled (e.g. a bad `pattern`).
    #[from(ignore)]
    #[display("invalid constraint on {schema}: {detail}")]
    InvalidConstraint {
        /// Name the schema was being resolved under.
        schema: String,
        /// Why the constraint was rejected.
        detail: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_messages_name_the_offender() {
        let err = AppError::MissingOperationId {
            method: "GET".into(),
            path: "/board".into(),
        };
        assert_eq!(err.to_string(), "operationId is empty for GET /board");

        let err = AppError::UnsupportedReference {
            reference: "other.yaml#/Foo".into(),
            context: "Status".into(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported reference 'other.yaml#/Foo' in Status"
        );
    }
}
