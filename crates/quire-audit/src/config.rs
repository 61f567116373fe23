use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for an audit run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Site root; document paths in log output are resolved against it
    pub root_path: PathBuf,
    /// Backfill schema-declared defaults into rewritten documents
    pub use_default_values: bool,
    /// Rewrite every document through an update mutation after the
    /// extension check
    pub rewrite_documents: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            use_default_values: false,
            rewrite_documents: false,
        }
    }
}

impl AuditConfig {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Default::default()
        }
    }

    pub fn with_default_values(mut self, enabled: bool) -> Self {
        self.use_default_values = enabled;
        self
    }

    pub fn with_rewrite(mut self, enabled: bool) -> Self {
        self.rewrite_documents = enabled;
        self
    }

    /// Location of a document on disk, for diagnostics.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root_path.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AuditConfig =
            serde_json::from_str(r#"{"root_path": "/site", "rewrite_documents": true}"#).unwrap();
        assert_eq!(config.root_path, PathBuf::from("/site"));
        assert!(config.rewrite_documents);
        assert!(!config.use_default_values);
    }

    #[test]
    fn test_resolve_path() {
        let config = AuditConfig::new("/site").with_default_values(true);
        assert_eq!(
            config.resolve_path("content/posts/a.md"),
            PathBuf::from("/site/content/posts/a.md")
        );
        assert!(config.use_default_values);
    }
}
