use crate::wipe::FileWipe;
use crate::{
    CancelToken, OpTimer, ProgressSink, WipeConfig, WipeError, WipeMethod, WipeProgress,
    WipeResult,
};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Recursive wipe of a directory tree.
///
/// Every regular file under the root is wiped with `FileWipe`; failures
/// are logged and the walk continues. Once the file set is processed,
/// the now-empty directories are removed deepest first. The operation
/// succeeds only if every file wiped cleanly; directory-removal
/// failures are logged but never fail the operation.
pub struct DirectoryWipe;

struct TreeContents {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
    others: Vec<PathBuf>,
}

impl DirectoryWipe {
    pub fn run(
        path: &Path,
        method: WipeMethod,
        config: &WipeConfig,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> WipeResult {
        let timer = OpTimer::start();

        if !path.is_dir() {
            return timer.finish_err(&WipeError::NotFound(path.display().to_string()), 0, 0);
        }

        let mut contents = TreeContents {
            files: Vec::new(),
            dirs: Vec::new(),
            others: Vec::new(),
        };
        collect_tree(path, &mut contents);

        let total_files = contents.files.len();
        let mut bytes_wiped = 0u64;
        let mut last_passes = 0u32;
        let mut failures: Vec<String> = Vec::new();

        for (index, file) in contents.files.iter().enumerate() {
            if cancel.is_cancelled() {
                return timer.finish_err(&WipeError::Cancelled, bytes_wiped, last_passes);
            }

            let adapter = per_file_adapter(sink, index, total_files, method);
            let result = FileWipe::run(file, method, config, &adapter, cancel);

            bytes_wiped += result.bytes_wiped;
            last_passes = result.passes_completed;

            if cancel.is_cancelled() {
                return timer.finish_err(&WipeError::Cancelled, bytes_wiped, last_passes);
            }

            if !result.success {
                let reason = result.error.unwrap_or_else(|| "unknown error".to_string());
                warn!("failed to wipe {}: {}", file.display(), reason);
                failures.push(format!("{}: {}", file.display(), reason));
            }
        }

        // Symlinks and other non-regular entries are unlinked without
        // an overwrite; there is no file content behind them to scrub.
        for entry in &contents.others {
            if let Err(err) = std::fs::remove_file(entry) {
                warn!("failed to remove {}: {}", entry.display(), err);
                failures.push(format!("{}: {}", entry.display(), err));
            }
        }

        // Deepest first so children go before their parents
        let mut dirs = contents.dirs;
        dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
        for dir in &dirs {
            if let Err(err) = std::fs::remove_dir(dir) {
                warn!("failed to remove directory {}: {}", dir.display(), err);
            }
        }
        if let Err(err) = std::fs::remove_dir(path) {
            warn!("failed to remove directory {}: {}", path.display(), err);
        }

        if failures.is_empty() {
            timer.finish_ok(bytes_wiped, method.pass_count())
        } else {
            let err = WipeError::Io(std::io::Error::other(format!(
                "{} of {} files failed: {}",
                failures.len(),
                total_files,
                failures.join("; ")
            )));
            timer.finish_err(&err, bytes_wiped, method.pass_count())
        }
    }
}

fn collect_tree(dir: &Path, contents: &mut TreeContents) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot read directory {}: {}", dir.display(), err);
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("cannot read entry in {}: {}", dir.display(), err);
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(err) => {
                warn!("cannot stat {}: {}", path.display(), err);
                continue;
            }
        };

        if file_type.is_dir() {
            contents.dirs.push(path.clone());
            collect_tree(&path, contents);
        } else if file_type.is_file() {
            contents.files.push(path);
        } else {
            debug!("non-regular entry {}", path.display());
            contents.others.push(path);
        }
    }
}

/// Rescale a single file's progress into tree-wide progress
fn per_file_adapter<'a>(
    sink: &'a dyn ProgressSink,
    index: usize,
    total_files: usize,
    method: WipeMethod,
) -> impl Fn(&WipeProgress) + Send + Sync + 'a {
    move |p: &WipeProgress| {
        let percent = ((index as f64 + p.percent / 100.0) / total_files.max(1) as f64) * 100.0;
        sink.report(&WipeProgress {
            current_pass: p.current_pass,
            total_passes: method.pass_count(),
            bytes_written: p.bytes_written,
            total_bytes: p.total_bytes,
            percent,
            status: format!("File {}/{}: {}", index + 1, total_files, p.status),
            eta: None,
        });
    }
}
