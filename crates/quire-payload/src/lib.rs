//! Quire payload: stored value trees → mutation payloads
//!
//! Content documents are stored in a *tag-addressed* shape: every reusable
//! block carries the name of its template in a `_template` field. The
//! mutation API expects a *key-addressed* shape instead, where the active
//! template is the sole key of a wrapper object:
//!
//! ```text
//! stored                                      mutation payload
//! ──────                                      ────────────────
//! {                                           {
//!   "_collection": "posts",                     "posts": {
//!   "_template": "post",                          "post": {
//!   "title": "Hi",                    ──►           "title": "Hi",
//!   "blocks": [                                     "blocks": [
//!     { "_template": "hero",                          { "hero": { "text": "Welcome" } }
//!       "text": "Welcome" }                         ]
//!   ]                                             }
//! }                                             }
//!                                             }
//! ```
//!
//! The crate is pure: no I/O, no logging. [`node`] classifies untyped JSON
//! into a [`ValueNode`], [`transform`] rewrites it.

pub mod node;
pub mod transform;

pub use node::{classify, template_tag, ShapeError, TemplateTag, ValueNode};
pub use transform::{
    transform_document_into_mutation_payload, transform_params, transform_value, PayloadError,
    PayloadInstructions,
};

/// Reserved key naming the collection a stored document belongs to.
pub const COLLECTION_KEY: &str = "_collection";

/// Reserved key naming the template a stored object was built from.
pub const TEMPLATE_KEY: &str = "_template";

/// Reserved key carrying the GraphQL type name of a stored object.
pub const TYPENAME_KEY: &str = "__typename";
