#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Only in-document component references are supported. URLs and relative
//! file references are rejected rather than fetched.

use crate::error::{AppError, AppResult};
use percent_encoding::percent_decode_str;
use url::Url;

/// Component section holding schemas.
pub const SCHEMAS: &str = "schemas";
/// Component section holding parameters.
pub const PARAMETERS: &str = "parameters";
/// Component section holding request bodies.
pub const REQUEST_BODIES: &str = "requestBodies";
/// Component section holding responses.
pub const RESPONSES: &str = "responses";

/// Extracts the component key from `#/components/<section>/<key>`.
///
/// The key is percent-decoded and JSON-pointer unescaped (`~1` -> `/`,
/// `~0` -> `~`). Anything else fails with `UnsupportedReference`.
///
/// # Arguments
///
/// * `reference` - The raw `$ref` value.
/// * `section` - Expected component section (e.g. [`SCHEMAS`]).
/// * `context` - Where the reference sits, for diagnostics.
pub fn component_ref_name(reference: &str, section: &str, context: &str) -> AppResult<String> {
    let unsupported = || AppError::UnsupportedReference {
        reference: reference.to_string(),
        context: context.to_string(),
    };

    if Url::parse(reference).is_ok() {
        tracing::debug!(reference, "rejecting URL reference");
        return Err(unsupported());
    }

    let pointer = reference.strip_prefix('#').ok_or_else(|| {
        tracing::debug!(reference, "rejecting external file reference");
        unsupported()
    })?;
    let key = pointer
        .strip_prefix("/components/")
        .and_then(|rest| rest.strip_prefix(section))
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(unsupported)?;

    if key.is_empty() || key.contains('/') {
        return Err(unsupported());
    }

    let decoded = percent_decode_str(key)
        .decode_utf8()
        .map_err(|_| unsupported())?;
    Ok(decoded.replace("~1", "/").replace("~0", "~"))
}

/// Shorthand for [`component_ref_name`] on `#/components/schemas/`.
pub fn schema_ref_name(reference: &str, context: &str) -> AppResult<String> {
    component_ref_name(reference, SCHEMAS, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_reference() {
        assert_eq!(
            schema_ref_name("#/components/schemas/User", "ctx").unwrap(),
            "User"
        );
        assert_eq!(
            schema_ref_name("#/components/schemas/tree%20node", "ctx").unwrap(),
            "tree node"
        );
        assert_eq!(
            schema_ref_name("#/components/schemas/a~1b~0c", "ctx").unwrap(),
            "a/b~c"
        );
    }

    #[test]
    fn test_rejected_references() {
        let rejected = [
            "https://example.com/spec.yaml#/components/schemas/User",
            "other.yaml#/components/schemas/User",
            "#/components/parameters/User",
            "#/definitions/User",
            "#/components/schemas/",
            "#/components/schemas/User/properties/id",
        ];
        for reference in rejected {
            let err = schema_ref_name(reference, "Status").unwrap_err();
            assert!(
                matches!(err, AppError::UnsupportedReference { .. }),
                "{} should be rejected",
                reference
            );
        }
    }

    #[test]
    fn test_other_sections() {
        assert_eq!(
            component_ref_name("#/components/requestBodies/NewUser", REQUEST_BODIES, "op")
                .unwrap(),
            "NewUser"
        );
        assert!(component_ref_name("#/components/schemas/NewUser", REQUEST_BODIES, "op").is_err());
    }
}
