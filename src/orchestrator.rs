// Wipe orchestrator - routes each target kind to its executor
//
// The executors are synchronous; `execute` moves the whole operation
// onto the blocking pool so async callers stay responsive while a wipe
// grinds through a large target.

use crate::wipe::{DirectoryWipe, FileWipe, FreeSpaceWipe};
use crate::{CancelToken, ProgressSink, WipeConfig, WipeMethod, WipeResult};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// What a wipe operation is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WipeTarget {
    /// A single regular file
    File(PathBuf),
    /// A directory tree, wiped recursively
    Directory(PathBuf),
    /// The unallocated space of the volume containing this directory
    FreeSpace(PathBuf),
}

impl WipeTarget {
    pub fn path(&self) -> &std::path::Path {
        match self {
            WipeTarget::File(p) | WipeTarget::Directory(p) | WipeTarget::FreeSpace(p) => p,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            WipeTarget::File(_) => "file",
            WipeTarget::Directory(_) => "directory",
            WipeTarget::FreeSpace(_) => "free space",
        }
    }
}

/// Main entry point for wipe operations
pub struct WipeOrchestrator {
    method: WipeMethod,
    config: WipeConfig,
    cancel: CancelToken,
}

impl WipeOrchestrator {
    pub fn new(method: WipeMethod, config: WipeConfig) -> Self {
        Self {
            method,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Cancellation handle shared with the operations this orchestrator runs
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run a wipe on the blocking pool and wait for its record.
    ///
    /// Always resolves to a `WipeResult`; faults are carried in the
    /// record rather than as an `Err`.
    pub async fn execute(
        &self,
        target: WipeTarget,
        sink: Arc<dyn ProgressSink>,
    ) -> WipeResult {
        info!(
            "starting {} wipe of {} using {}",
            target.kind(),
            target.path().display(),
            self.method.name()
        );

        let method = self.method;
        let config = self.config.clone();
        let cancel = self.cancel.clone();

        let handle = tokio::task::spawn_blocking(move || {
            run_blocking(&target, method, &config, sink.as_ref(), &cancel)
        });

        match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                // A panicking executor still yields a record for the caller
                let timer = crate::OpTimer::start();
                timer.finish_err(
                    &crate::WipeError::Io(std::io::Error::other(join_err.to_string())),
                    0,
                    0,
                )
            }
        }
    }

    /// Synchronous variant for callers without a runtime
    pub fn execute_blocking(&self, target: &WipeTarget, sink: &dyn ProgressSink) -> WipeResult {
        run_blocking(target, self.method, &self.config, sink, &self.cancel)
    }
}

fn run_blocking(
    target: &WipeTarget,
    method: WipeMethod,
    config: &WipeConfig,
    sink: &dyn ProgressSink,
    cancel: &CancelToken,
) -> WipeResult {
    match target {
        WipeTarget::File(path) => FileWipe::run(path, method, config, sink, cancel),
        WipeTarget::Directory(path) => DirectoryWipe::run(path, method, config, sink, cancel),
        WipeTarget::FreeSpace(path) => FreeSpaceWipe::run(path, method, config, sink, cancel),
    }
}
