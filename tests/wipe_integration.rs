/// End-to-end wipe operations driven through the public crate API
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use vanish_wipe::{NullProgress, WipeConfig, WipeMethod, WipeOrchestrator, WipeTarget};

fn test_config() -> WipeConfig {
    WipeConfig {
        block_size: 4096,
        progress_interval: 8192,
        write_through: false,
    }
}

fn write_file(dir: &Path, name: &str, len: usize) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0xA5u8; len]).expect("failed to seed test file");
    path
}

#[tokio::test]
async fn orchestrator_wipes_a_file() {
    let dir = tempdir().expect("failed to create tempdir");
    let path = write_file(dir.path(), "tax-return.pdf", 32 * 1024);

    let orchestrator = WipeOrchestrator::new(WipeMethod::DoD3Pass, test_config());
    let result = orchestrator
        .execute(WipeTarget::File(path.clone()), Arc::new(NullProgress))
        .await;

    assert!(result.success, "wipe failed: {:?}", result.error);
    assert_eq!(result.bytes_wiped, 3 * 32 * 1024);
    assert_eq!(result.passes_completed, 3);
    assert!(!path.exists(), "file must be gone after the wipe");
}

#[tokio::test]
async fn orchestrator_wipes_a_directory_tree() {
    let dir = tempdir().expect("failed to create tempdir");
    let root = dir.path().join("project");
    std::fs::create_dir(&root).expect("failed to create root");
    std::fs::create_dir(root.join("src")).expect("failed to create subdir");
    write_file(&root, "notes.md", 2048);
    write_file(&root.join("src"), "main.rs", 4096);

    let orchestrator = WipeOrchestrator::new(WipeMethod::SinglePass, test_config());
    let result = orchestrator
        .execute(WipeTarget::Directory(root.clone()), Arc::new(NullProgress))
        .await;

    assert!(result.success, "wipe failed: {:?}", result.error);
    assert_eq!(result.bytes_wiped, 2048 + 4096);
    assert!(!root.exists(), "tree must be gone after the wipe");
}

#[tokio::test]
async fn orchestrator_reports_missing_targets() {
    let dir = tempdir().expect("failed to create tempdir");
    let missing = dir.path().join("never-existed.bin");

    let orchestrator = WipeOrchestrator::new(WipeMethod::SinglePass, test_config());
    let result = orchestrator
        .execute(WipeTarget::File(missing), Arc::new(NullProgress))
        .await;

    assert!(!result.success);
    assert!(
        result.error.expect("error expected").contains("Target not found"),
    );
}

#[tokio::test]
async fn cancelled_orchestrator_preserves_the_target() {
    let dir = tempdir().expect("failed to create tempdir");
    let path = write_file(dir.path(), "keep-me.db", 16 * 1024);

    let orchestrator = WipeOrchestrator::new(WipeMethod::Gutmann, test_config());
    orchestrator.cancel_token().cancel();

    let result = orchestrator
        .execute(WipeTarget::File(path.clone()), Arc::new(NullProgress))
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Operation cancelled"));
    assert!(path.exists(), "cancelled wipe must leave the file in place");
}

#[test]
fn blocking_entry_point_works_without_a_runtime() {
    let dir = tempdir().expect("failed to create tempdir");
    let path = write_file(dir.path(), "offline.log", 8192);

    let orchestrator = WipeOrchestrator::new(WipeMethod::SinglePass, test_config());
    let result =
        orchestrator.execute_blocking(&WipeTarget::File(path.clone()), &NullProgress);

    assert!(result.success, "wipe failed: {:?}", result.error);
    assert_eq!(result.bytes_wiped, 8192);
    assert!(!path.exists());
}

#[tokio::test]
async fn progress_reaches_the_injected_sink() {
    use std::sync::atomic::{AtomicU32, Ordering};
    use vanish_wipe::{ProgressSink, WipeProgress};

    struct Counter(AtomicU32);

    impl ProgressSink for Counter {
        fn report(&self, _progress: &WipeProgress) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let dir = tempdir().expect("failed to create tempdir");
    let path = write_file(dir.path(), "big.bin", 64 * 1024);

    let counter = Arc::new(Counter(AtomicU32::new(0)));
    let orchestrator = WipeOrchestrator::new(WipeMethod::SinglePass, test_config());
    let result = orchestrator
        .execute(WipeTarget::File(path), counter.clone())
        .await;

    assert!(result.success);
    assert!(counter.0.load(Ordering::SeqCst) > 0, "sink never saw progress");
}
