//! Whole-schema audit: both passes over every collection.

use crate::audit::{audit_collection, audit_documents};
use crate::resolver::Resolver;
use crate::{AuditConfig, AuditError, Schema};
use serde::{Deserialize, Serialize};

/// What the audit found for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionOutcome {
    pub collection: String,
    /// Some document's extension disagrees with the declared format.
    pub warning: bool,
    /// Some document rewrite was rejected by the store.
    pub error: bool,
    /// Whether the rewrite pass ran for this collection.
    pub rewritten: bool,
}

/// Outcome of [`audit_schema`], one entry per collection in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub collections: Vec<CollectionOutcome>,
}

impl AuditReport {
    pub fn has_warnings(&self) -> bool {
        self.collections.iter().any(|c| c.warning)
    }

    pub fn has_errors(&self) -> bool {
        self.collections.iter().any(|c| c.error)
    }

    pub fn is_clean(&self) -> bool {
        !self.has_warnings() && !self.has_errors()
    }
}

/// Audit every collection of `schema`, in order.
///
/// The extension check always runs; document rewrites only when
/// [`AuditConfig::rewrite_documents`] is set. The first hard failure aborts
/// the run, so collections after it are not audited.
pub async fn audit_schema(
    resolver: &dyn Resolver,
    schema: &Schema,
    config: &AuditConfig,
) -> Result<AuditReport, AuditError> {
    let mut report = AuditReport::default();

    for collection in &schema.collections {
        let warning = audit_collection(resolver, collection, config).await?;
        let error = if config.rewrite_documents {
            audit_documents(resolver, collection, config).await?
        } else {
            false
        };
        report.collections.push(CollectionOutcome {
            collection: collection.name.clone(),
            warning,
            error,
            rewritten: config.rewrite_documents,
        });
    }

    tracing::info!(
        collections = report.collections.len(),
        warnings = report.has_warnings(),
        errors = report.has_errors(),
        "audit finished"
    );
    Ok(report)
}
