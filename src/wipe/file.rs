use crate::patterns;
use crate::{
    io as wipe_io, CancelToken, OpTimer, ProgressSink, WipeConfig, WipeError, WipeMethod,
    WipeOutcome, WipeProgress, WipeResult,
};
use log::debug;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Multi-pass overwrite of a single file.
///
/// Each pass opens the file fresh, writes its pattern front to back in
/// `block_size` chunks and syncs. After the last pass the file is
/// truncated to zero length, renamed to a random name and deleted, so
/// neither content nor the original name survive in directory entries.
pub struct FileWipe;

impl FileWipe {
    pub fn run(
        path: &Path,
        method: WipeMethod,
        config: &WipeConfig,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> WipeResult {
        let timer = OpTimer::start();
        let mut bytes_wiped = 0u64;
        let mut passes_completed = 0u32;

        match Self::execute(
            path,
            method,
            config,
            sink,
            cancel,
            &timer,
            &mut bytes_wiped,
            &mut passes_completed,
        ) {
            Ok(()) => timer.finish_ok(bytes_wiped, passes_completed),
            Err(err) => timer.finish_err(&err, bytes_wiped, passes_completed),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn execute(
        path: &Path,
        method: WipeMethod,
        config: &WipeConfig,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
        timer: &OpTimer,
        bytes_wiped: &mut u64,
        passes_completed: &mut u32,
    ) -> WipeOutcome<()> {
        let metadata = std::fs::symlink_metadata(path)
            .map_err(|_| WipeError::NotFound(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(WipeError::NotFound(path.display().to_string()));
        }
        let size = metadata.len();

        if let Err(err) = wipe_io::clear_readonly(path) {
            debug!("could not clear read-only on {}: {}", path.display(), err);
        }

        let total_passes = method.pass_count();
        let grand_total = size * total_passes as u64;
        let mut buf = vec![0u8; config.block_size];

        for pass in 0..total_passes {
            if cancel.is_cancelled() {
                return Err(WipeError::Cancelled);
            }

            let pattern = patterns::for_pass(method, pass);
            // Random passes draw one buffer and reuse it across blocks
            pattern.fill(&mut buf)?;

            let status = patterns::describe(method, pass);
            debug!("{}: {}", path.display(), status);

            let mut file = wipe_io::open_for_wipe(path, config.write_through)?;
            let mut written = 0u64;
            let mut last_report = 0u64;

            report(
                sink, pass, total_passes, written, size, grand_total, *bytes_wiped, &status, timer,
            );

            while written < size {
                if cancel.is_cancelled() {
                    return Err(WipeError::Cancelled);
                }

                let chunk = std::cmp::min(config.block_size as u64, size - written) as usize;
                file.write_all(&buf[..chunk])?;
                written += chunk as u64;
                *bytes_wiped += chunk as u64;

                if written - last_report >= config.progress_interval || written >= size {
                    last_report = written;
                    report(
                        sink,
                        pass,
                        total_passes,
                        written,
                        size,
                        grand_total,
                        *bytes_wiped,
                        &status,
                        timer,
                    );
                }
            }

            file.sync_all()?;
            *passes_completed += 1;
        }

        Self::scrub_and_delete(path, config)?;
        Ok(())
    }

    /// Truncate, rename to a random name, then delete
    fn scrub_and_delete(path: &Path, config: &WipeConfig) -> WipeOutcome<()> {
        let file = wipe_io::open_for_wipe(path, config.write_through)?;
        file.set_len(0)?;
        file.sync_all()?;
        drop(file);

        let scrambled = path.with_file_name(wipe_io::random_name());
        std::fs::rename(path, &scrambled)?;
        std::fs::remove_file(&scrambled)?;
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn report(
    sink: &dyn ProgressSink,
    pass: u32,
    total_passes: u32,
    written: u64,
    size: u64,
    grand_total: u64,
    overall_written: u64,
    status: &str,
    timer: &OpTimer,
) {
    let percent = if grand_total == 0 {
        100.0
    } else {
        (overall_written as f64 / grand_total as f64) * 100.0
    };

    let elapsed = timer.elapsed().as_secs_f64();
    let eta = if overall_written > 0 && elapsed > 0.0 {
        let rate = overall_written as f64 / elapsed;
        let remaining = grand_total.saturating_sub(overall_written);
        Some(Duration::from_secs_f64(remaining as f64 / rate))
    } else {
        None
    };

    sink.report(&WipeProgress {
        current_pass: pass + 1,
        total_passes,
        bytes_written: written,
        total_bytes: Some(size),
        percent,
        status: status.to_string(),
        eta,
    });
}
