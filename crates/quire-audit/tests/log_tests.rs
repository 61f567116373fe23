//! Log output of the audit passes
//!
//! Installs a fmt subscriber with a capturing writer for the duration of each
//! test and checks what the passes report, and in which order.

use parking_lot::Mutex;
use quire_audit::*;
use serde_json::json;
use std::sync::Arc;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

#[tokio::test]
async fn test_mismatch_warning_names_resolved_path() {
    let (logs, _guard) = capture_logs();

    let resolver = MemoryResolver::new();
    resolver.add_collection("posts", "md", "content/posts");
    resolver.add_document("posts", "ok.md", json!({}));
    resolver.add_document("posts", "fancy.mdx", json!({}));

    let warning = audit_collection(
        &resolver,
        &Collection::new("posts", "md"),
        &AuditConfig::new("/srv/site"),
    )
    .await
    .unwrap();
    assert!(warning);

    let lines = logs.lines();
    assert!(lines[0].contains("INFO") && lines[0].contains("checking collection"));

    let warnings: Vec<_> = lines.iter().filter(|l| l.contains("WARN")).collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("/srv/site/content/posts/fancy.mdx"));
    assert!(warnings[0].contains(".mdx"));
    assert!(!warnings[0].contains("ok.md"));
}

#[tokio::test]
async fn test_write_errors_logged_in_listing_order() {
    let (logs, _guard) = capture_logs();

    let resolver = MemoryResolver::new();
    resolver.add_collection("posts", "md", "content/posts");
    for name in ["a.md", "b.md", "c.md"] {
        resolver.add_document("posts", name, json!({"title": name}));
    }
    resolver.fail_update("posts", "c.md", "c rejected");
    resolver.fail_update("posts", "a.md", "a rejected");

    let error = audit_documents(
        &resolver,
        &Collection::new("posts", "md"),
        &AuditConfig::new("/srv/site"),
    )
    .await
    .unwrap();
    assert!(error);

    let relevant: Vec<String> = logs
        .lines()
        .into_iter()
        .filter(|l| l.contains("checking document") || l.contains("ERROR"))
        .collect();

    assert_eq!(relevant.len(), 5);
    assert!(relevant[0].contains("content/posts/a.md"));
    assert!(relevant[1].contains("ERROR") && relevant[1].contains("a rejected"));
    assert!(relevant[2].contains("content/posts/b.md"));
    assert!(relevant[3].contains("content/posts/c.md"));
    assert!(relevant[4].contains("ERROR") && relevant[4].contains("c rejected"));
}
