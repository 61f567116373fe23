//! The query-execution boundary.
//!
//! The audit passes never touch the content store directly. They issue typed
//! [`Operation`]s through a [`Resolver`] and decode the `data` of each
//! response into the listing and document shapes below.

use crate::AuditError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Executes queries and mutations against a content store.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Run one operation.
    ///
    /// `Err` means the resolver could not answer at all. Errors reported by
    /// the store for an answered request belong in [`ResolveResponse::errors`].
    async fn resolve(&self, request: ResolveRequest) -> anyhow::Result<ResolveResponse>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// List a collection's documents together with its declared format.
    GetCollection { collection: String },
    /// Fetch the stored value tree of one document.
    GetDocument {
        collection: String,
        relative_path: String,
    },
    /// Replace one document's values with a mutation payload.
    UpdateDocument {
        collection: String,
        relative_path: String,
        params: Value,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::GetCollection { .. } => "getCollection",
            Operation::GetDocument { .. } => "getDocument",
            Operation::UpdateDocument { .. } => "updateDocument",
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            Operation::GetCollection { collection }
            | Operation::GetDocument { collection, .. }
            | Operation::UpdateDocument { collection, .. } => collection,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRequest {
    pub operation: Operation,
    /// Ask the resolver not to surface response errors on its own; the
    /// caller inspects them.
    pub silence_errors: bool,
}

impl ResolveRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            silence_errors: false,
        }
    }

    pub fn silenced(operation: Operation) -> Self {
        Self {
            operation,
            silence_errors: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveResponse {
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl ResolveResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn failed<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data: Value::Null,
            errors: messages
                .into_iter()
                .map(|message| ResponseError {
                    message: message.into(),
                })
                .collect(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
}

// ============================================================================
// Response Shapes
// ============================================================================

/// `getCollection` result: declared format plus the document listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionListing {
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub documents: DocumentConnection,
}

impl CollectionListing {
    pub fn documents(&self) -> impl Iterator<Item = &DocumentRef> {
        self.documents.edges.iter().map(|edge| &edge.node.sys)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentConnection {
    #[serde(default)]
    pub edges: Vec<DocumentEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEdge {
    pub node: DocumentNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentNode {
    pub sys: DocumentRef,
}

/// Identifies one stored content file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    /// File extension including the leading dot, e.g. `.md`.
    pub extension: String,
    /// Path relative to the site root.
    pub path: String,
    /// Path relative to the collection directory.
    #[serde(default)]
    pub relative_path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionData {
    get_collection: CollectionListing,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentData {
    get_document: DocumentValues,
}

#[derive(Debug, Deserialize)]
struct DocumentValues {
    #[serde(default)]
    values: Value,
}

// ============================================================================
// Typed Reads and Writes
// ============================================================================

pub(crate) async fn fetch_listing(
    resolver: &dyn Resolver,
    collection: &str,
) -> Result<CollectionListing, AuditError> {
    let data: CollectionData = read(
        resolver,
        Operation::GetCollection {
            collection: collection.to_string(),
        },
    )
    .await?;
    Ok(data.get_collection)
}

pub(crate) async fn fetch_values(
    resolver: &dyn Resolver,
    collection: &str,
    relative_path: &str,
) -> Result<Value, AuditError> {
    let data: DocumentData = read(
        resolver,
        Operation::GetDocument {
            collection: collection.to_string(),
            relative_path: relative_path.to_string(),
        },
    )
    .await?;
    Ok(data.get_document.values)
}

/// Submit an update with errors silenced; returns the store's field-level
/// errors, if any.
pub(crate) async fn submit_update(
    resolver: &dyn Resolver,
    collection: &str,
    relative_path: &str,
    params: Value,
) -> Result<Vec<ResponseError>, AuditError> {
    let request = ResolveRequest::silenced(Operation::UpdateDocument {
        collection: collection.to_string(),
        relative_path: relative_path.to_string(),
        params,
    });
    let response = resolver.resolve(request).await?;
    Ok(response.errors)
}

async fn read<T: DeserializeOwned>(
    resolver: &dyn Resolver,
    operation: Operation,
) -> Result<T, AuditError> {
    let name = operation.name();
    let collection = operation.collection().to_string();
    let response = resolver.resolve(ResolveRequest::new(operation)).await?;

    if response.has_errors() {
        return Err(AuditError::Read {
            operation: name,
            collection,
            messages: response.errors.into_iter().map(|e| e.message).collect(),
        });
    }

    serde_json::from_value(response.data).map_err(|source| AuditError::Decode {
        operation: name,
        collection,
        source,
    })
}
