//! Quire audit: collection checks and document rewrites
//!
//! Runs two passes over the collections of a content schema, talking to the
//! content store only through a [`Resolver`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          AUDIT PIPELINE                              │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  ┌──────────┐    ┌────────────────────┐                              │
//! │  │  Schema  │───►│  audit_collection  │──── warn: extension ≠ format │
//! │  └──────────┘    └────────────────────┘                              │
//! │       │                    │ getCollection                           │
//! │       │                    ▼                                         │
//! │       │           ┌─────────────────┐                                │
//! │       │           │    Resolver     │◄──────────────┐                │
//! │       │           └─────────────────┘               │                │
//! │       │                    ▲ getDocument            │ updateDocument │
//! │       ▼                    │                        │                │
//! │  ┌────────────────────┐    │    ┌─────────────────┐ │                │
//! │  │  audit_documents   │────┴───►│ quire-payload   │─┘                │
//! │  └────────────────────┘         │ (pure rewrite)  │                  │
//! │       │                         └─────────────────┘                  │
//! │       └──── error: per-document write failures                       │
//! │                                                                      │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure model
//!
//! - Extension mismatches and per-document write errors are logged and
//!   folded into a boolean flag; the batch keeps going.
//! - Read failures, transport failures and malformed documents abort the
//!   pass with an [`AuditError`].
//!
//! Documents are processed one at a time in listing order, so log lines
//! always follow the order of the listing.

pub mod audit;
pub mod config;
pub mod error;
pub mod memory;
pub mod resolver;
pub mod runner;
pub mod schema;

pub use audit::{audit_collection, audit_documents, extension_matches};
pub use config::AuditConfig;
pub use error::AuditError;
pub use memory::{MemoryResolver, RecordedUpdate};
pub use resolver::{
    CollectionListing, DocumentRef, Operation, ResolveRequest, ResolveResponse, Resolver,
    ResponseError,
};
pub use runner::{audit_schema, AuditReport, CollectionOutcome};
pub use schema::{Collection, CollectionFields, Field, FieldUi, Schema, Template};
