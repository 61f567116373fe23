//! The two per-collection passes: extension audit and document rewrite.

use crate::resolver::{fetch_listing, fetch_values, submit_update, Resolver};
use crate::{AuditConfig, AuditError, Collection};
use quire_payload::{transform_document_into_mutation_payload, PayloadInstructions};

/// Check every document of `collection` against the format the store
/// declares for it.
///
/// Each mismatch is logged as a warning with the document's location; the
/// result is `true` if any were found. A failing listing aborts with `Err`.
pub async fn audit_collection(
    resolver: &dyn Resolver,
    collection: &Collection,
    config: &AuditConfig,
) -> Result<bool, AuditError> {
    tracing::info!(collection = %collection.name, "checking collection");
    let listing = fetch_listing(resolver, &collection.name).await?;

    let declared = format!(".{}", strip_dot(&listing.format));
    let mut warning = false;
    for doc in listing.documents() {
        if extension_matches(&doc.extension, &listing.format) {
            continue;
        }
        warning = true;
        tracing::warn!(
            collection = %collection.name,
            extension = %doc.extension,
            format = %declared,
            location = %config.resolve_path(&doc.path).display(),
            "file extension does not match the format declared in the schema"
        );
    }
    Ok(warning)
}

/// Rewrite every document of `collection` through an update mutation.
///
/// Documents are fetched, transformed and written one at a time in listing
/// order. Errors the store reports for a write are logged and make the
/// result `true`, and the pass moves on to the next document. Read,
/// transport and payload failures abort with `Err`.
pub async fn audit_documents(
    resolver: &dyn Resolver,
    collection: &Collection,
    config: &AuditConfig,
) -> Result<bool, AuditError> {
    let listing = fetch_listing(resolver, &collection.name).await?;

    let defaults = if config.use_default_values {
        let defaults = collection.top_level_defaults();
        if defaults.is_none() {
            tracing::debug!(
                collection = %collection.name,
                "fields are defined by reference, skipping default values"
            );
        }
        defaults
    } else {
        None
    };
    let instructions = PayloadInstructions::new(true, collection.uses_templates());

    let mut error = false;
    for doc in listing.documents() {
        let location = config.resolve_path(&doc.path);
        tracing::info!(location = %location.display(), "checking document");

        let values = fetch_values(resolver, &collection.name, &doc.relative_path).await?;
        let params =
            transform_document_into_mutation_payload(&values, instructions, defaults.as_ref())
                .map_err(|source| AuditError::Payload {
                    path: location.display().to_string(),
                    source,
                })?;

        let errors = submit_update(resolver, &collection.name, &doc.relative_path, params).await?;
        for err in errors {
            error = true;
            tracing::error!(location = %location.display(), "{}", err.message);
        }
    }
    Ok(error)
}

/// Whether a file extension agrees with a declared format.
///
/// One leading `.` is ignored on either side and letters compare
/// case-insensitively, so `.MD` matches `md`.
pub fn extension_matches(extension: &str, format: &str) -> bool {
    strip_dot(extension).eq_ignore_ascii_case(strip_dot(format))
}

fn strip_dot(value: &str) -> &str {
    value.strip_prefix('.').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_matches() {
        assert!(extension_matches(".md", "md"));
        assert!(extension_matches("md", "md"));
        assert!(extension_matches(".MD", "md"));
        assert!(extension_matches(".json", ".json"));
        assert!(!extension_matches(".mdx", "md"));
        assert!(!extension_matches("..md", "md"));
        assert!(!extension_matches("", "md"));
    }
}
