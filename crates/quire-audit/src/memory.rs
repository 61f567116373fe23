//! In-process resolver over registered collections.
//!
//! Serves listings and stored value trees from memory and records every
//! update it accepts. Write errors and listing failures can be injected per
//! document / collection to exercise the audit failure paths.

use crate::resolver::{Operation, ResolveRequest, ResolveResponse, Resolver};
use async_trait::async_trait;
use parking_lot::RwLock;
use quire_payload::COLLECTION_KEY;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// An update the resolver accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub collection: String,
    pub relative_path: String,
    pub params: Value,
}

#[derive(Debug, Clone)]
struct StoredCollection {
    format: String,
    dir: String,
    documents: Vec<StoredDocument>,
}

#[derive(Debug, Clone)]
struct StoredDocument {
    relative_path: String,
    values: Value,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: BTreeMap<String, StoredCollection>,
    write_errors: HashMap<(String, String), Vec<String>>,
    listing_failures: HashMap<String, String>,
    requests: Vec<ResolveRequest>,
    updates: Vec<RecordedUpdate>,
}

#[derive(Debug, Default)]
pub struct MemoryResolver {
    state: RwLock<MemoryState>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection whose files live under `dir` (relative to the
    /// site root).
    pub fn add_collection(&self, name: &str, format: &str, dir: &str) {
        self.state.write().collections.insert(
            name.to_string(),
            StoredCollection {
                format: format.to_string(),
                dir: dir.trim_end_matches('/').to_string(),
                documents: Vec::new(),
            },
        );
    }

    /// Store a document. Listing order is insertion order. `_collection` is
    /// filled in when `values` does not carry one.
    pub fn add_document(&self, collection: &str, relative_path: &str, mut values: Value) {
        if let Value::Object(object) = &mut values {
            object
                .entry(COLLECTION_KEY)
                .or_insert_with(|| Value::String(collection.to_string()));
        }
        let mut state = self.state.write();
        let stored = state
            .collections
            .entry(collection.to_string())
            .or_insert_with(|| StoredCollection {
                format: String::new(),
                dir: collection.to_string(),
                documents: Vec::new(),
            });
        stored.documents.push(StoredDocument {
            relative_path: relative_path.to_string(),
            values,
        });
    }

    /// Answer updates of this document with a field-level error.
    pub fn fail_update(&self, collection: &str, relative_path: &str, message: &str) {
        self.state
            .write()
            .write_errors
            .entry((collection.to_string(), relative_path.to_string()))
            .or_default()
            .push(message.to_string());
    }

    /// Answer listings of this collection with an error.
    pub fn fail_listing(&self, collection: &str, message: &str) {
        self.state
            .write()
            .listing_failures
            .insert(collection.to_string(), message.to_string());
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ResolveRequest> {
        self.state.read().requests.clone()
    }

    /// Every accepted update, in order.
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.state.read().updates.clone()
    }

    fn get_collection(state: &MemoryState, collection: &str) -> ResolveResponse {
        if let Some(message) = state.listing_failures.get(collection) {
            return ResolveResponse::failed([message.as_str()]);
        }
        let Some(stored) = state.collections.get(collection) else {
            return ResolveResponse::failed([format!("collection `{collection}` not found")]);
        };

        let edges: Vec<Value> = stored
            .documents
            .iter()
            .map(|doc| {
                json!({
                    "node": {
                        "sys": {
                            "extension": extension_of(&doc.relative_path),
                            "path": format!("{}/{}", stored.dir, doc.relative_path),
                            "relativePath": doc.relative_path,
                        }
                    }
                })
            })
            .collect();

        ResolveResponse::ok(json!({
            "getCollection": {
                "format": stored.format,
                "slug": collection,
                "documents": { "edges": edges },
            }
        }))
    }

    fn get_document(state: &MemoryState, collection: &str, relative_path: &str) -> ResolveResponse {
        let found = state
            .collections
            .get(collection)
            .and_then(|c| c.documents.iter().find(|d| d.relative_path == relative_path));
        match found {
            Some(doc) => ResolveResponse::ok(json!({
                "getDocument": {
                    "__typename": "Document",
                    "values": doc.values,
                }
            })),
            None => ResolveResponse::failed([format!(
                "document `{relative_path}` not found in collection `{collection}`"
            )]),
        }
    }

    fn update_document(
        state: &mut MemoryState,
        collection: &str,
        relative_path: &str,
        params: &Value,
    ) -> ResolveResponse {
        let keyed_by_collection = params
            .as_object()
            .is_some_and(|object| object.len() == 1 && object.contains_key(collection));
        if !keyed_by_collection {
            return ResolveResponse::failed([format!(
                "params for `{relative_path}` must be keyed by collection `{collection}`"
            )]);
        }
        if let Some(messages) = state
            .write_errors
            .get(&(collection.to_string(), relative_path.to_string()))
        {
            return ResolveResponse::failed(messages.iter().map(String::as_str));
        }

        state.updates.push(RecordedUpdate {
            collection: collection.to_string(),
            relative_path: relative_path.to_string(),
            params: params.clone(),
        });
        ResolveResponse::ok(json!({"updateDocument": {"__typename": "Document"}}))
    }
}

#[async_trait]
impl Resolver for MemoryResolver {
    async fn resolve(&self, request: ResolveRequest) -> anyhow::Result<ResolveResponse> {
        let mut state = self.state.write();
        state.requests.push(request.clone());

        let response = match &request.operation {
            Operation::GetCollection { collection } => Self::get_collection(&state, collection),
            Operation::GetDocument {
                collection,
                relative_path,
            } => Self::get_document(&state, collection, relative_path),
            Operation::UpdateDocument {
                collection,
                relative_path,
                params,
            } => Self::update_document(&mut state, collection, relative_path, params),
        };
        Ok(response)
    }
}

/// `.md` for `posts/hello.md`; empty when there is no extension.
fn extension_of(relative_path: &str) -> String {
    Path::new(relative_path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("hello.md"), ".md");
        assert_eq!(extension_of("nested/post.en.mdx"), ".mdx");
        assert_eq!(extension_of("README"), "");
    }

    #[tokio::test]
    async fn test_listing_reflects_insertion_order() {
        let resolver = MemoryResolver::new();
        resolver.add_collection("posts", "md", "content/posts/");
        resolver.add_document("posts", "b.md", json!({"title": "B"}));
        resolver.add_document("posts", "a.json", json!({"title": "A"}));

        let response = resolver
            .resolve(ResolveRequest::new(Operation::GetCollection {
                collection: "posts".to_string(),
            }))
            .await
            .unwrap();

        let edges = &response.data["getCollection"]["documents"]["edges"];
        assert_eq!(edges[0]["node"]["sys"]["relativePath"], "b.md");
        assert_eq!(edges[0]["node"]["sys"]["path"], "content/posts/b.md");
        assert_eq!(edges[1]["node"]["sys"]["extension"], ".json");
        assert_eq!(response.data["getCollection"]["format"], "md");
    }

    #[tokio::test]
    async fn test_documents_get_collection_tag() {
        let resolver = MemoryResolver::new();
        resolver.add_document("posts", "a.md", json!({"title": "A"}));

        let response = resolver
            .resolve(ResolveRequest::new(Operation::GetDocument {
                collection: "posts".to_string(),
                relative_path: "a.md".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(
            response.data["getDocument"]["values"],
            json!({"_collection": "posts", "title": "A"})
        );
    }

    #[tokio::test]
    async fn test_update_must_be_keyed_by_collection() {
        let resolver = MemoryResolver::new();
        resolver.add_document("posts", "a.md", json!({}));

        let response = resolver
            .resolve(ResolveRequest::silenced(Operation::UpdateDocument {
                collection: "posts".to_string(),
                relative_path: "a.md".to_string(),
                params: json!({"pages": {}}),
            }))
            .await
            .unwrap();

        assert!(response.has_errors());
        assert!(resolver.updates().is_empty());
        assert_eq!(resolver.requests().len(), 1);
    }
}
