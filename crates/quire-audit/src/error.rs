use quire_payload::PayloadError;
use std::path::PathBuf;

/// Failures that abort an audit pass.
///
/// Extension mismatches and per-document write errors are not represented
/// here: they are logged and reported through the boolean results instead.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The resolver itself failed (transport, store unavailable, ...).
    #[error(transparent)]
    Resolver(#[from] anyhow::Error),

    #[error("{operation} for collection `{collection}` returned errors: {}", .messages.join("; "))]
    Read {
        operation: &'static str,
        collection: String,
        messages: Vec<String>,
    },

    #[error("unexpected {operation} response for collection `{collection}`: {source}")]
    Decode {
        operation: &'static str,
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot build mutation payload for {path}: {source}")]
    Payload {
        path: String,
        #[source]
        source: PayloadError,
    },

    #[error("invalid schema: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("failed to read schema {}: {source}", .path.display())]
    SchemaIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
