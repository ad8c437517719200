use crate::patterns;
use crate::{
    io as wipe_io, CancelToken, OpTimer, ProgressSink, WipeConfig, WipeError, WipeMethod,
    WipeOutcome, WipeProgress, WipeResult,
};
use log::{debug, info};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

/// How a fill pass ended. Running the volume out of space is the goal
/// of the pass, so it is a success variant rather than an error.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum FillEnd {
    VolumeFull,
}

/// Overwrite of a volume's unallocated space.
///
/// Each pass creates a delete-on-close fill file in the target
/// directory and writes its pattern until the volume reports it is
/// full. Closing the handle releases the space again, whatever data
/// previously sat in the free blocks now holds the pass pattern.
pub struct FreeSpaceWipe;

impl FreeSpaceWipe {
    pub fn run(
        dir: &Path,
        method: WipeMethod,
        config: &WipeConfig,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> WipeResult {
        let timer = OpTimer::start();
        let mut bytes_wiped = 0u64;
        let mut passes_completed = 0u32;

        if !dir.is_dir() {
            return timer.finish_err(&WipeError::NotFound(dir.display().to_string()), 0, 0);
        }

        match Self::execute(
            dir,
            method,
            config,
            sink,
            cancel,
            &mut bytes_wiped,
            &mut passes_completed,
        ) {
            Ok(()) => timer.finish_ok(bytes_wiped, passes_completed),
            Err(err) => timer.finish_err(&err, bytes_wiped, passes_completed),
        }
    }

    fn execute(
        dir: &Path,
        method: WipeMethod,
        config: &WipeConfig,
        sink: &dyn ProgressSink,
        cancel: &CancelToken,
        bytes_wiped: &mut u64,
        passes_completed: &mut u32,
    ) -> WipeOutcome<()> {
        let total_passes = method.pass_count();
        let mut buf = vec![0u8; config.block_size];

        for pass in 0..total_passes {
            if cancel.is_cancelled() {
                return Err(WipeError::Cancelled);
            }

            let estimate = wipe_io::volume_free_space(dir)?;
            info!(
                "free-space pass {}/{} on {} ({} bytes free)",
                pass + 1,
                total_passes,
                dir.display(),
                estimate
            );

            let pattern = patterns::for_pass(method, pass);
            pattern.fill(&mut buf)?;
            let status = patterns::describe(method, pass);

            let mut file = wipe_io::create_fill_file(dir, config.write_through)?;
            let pass_start = Instant::now();

            let on_progress = |written: u64| {
                let percent = if estimate == 0 {
                    100.0
                } else {
                    ((written as f64 / estimate as f64) * 100.0).min(100.0)
                };
                let elapsed = pass_start.elapsed().as_secs_f64();
                let eta = if written > 0 && elapsed > 0.0 {
                    let rate = written as f64 / elapsed;
                    let remaining = estimate.saturating_sub(written);
                    Some(Duration::from_secs_f64(remaining as f64 / rate))
                } else {
                    None
                };
                sink.report(&WipeProgress {
                    current_pass: pass + 1,
                    total_passes,
                    bytes_written: written,
                    total_bytes: None,
                    percent,
                    status: status.clone(),
                    eta,
                });
            };

            let (written, FillEnd::VolumeFull) =
                fill_to_exhaustion(&mut file, &buf, config.progress_interval, cancel, on_progress)?;

            *bytes_wiped += written;
            *passes_completed += 1;
            debug!(
                "pass {}/{} wrote {} bytes before the volume filled",
                pass + 1,
                total_passes,
                written
            );

            // Dropping the handle deletes the fill file and releases the space
            drop(file);
        }

        Ok(())
    }
}

/// Write `buf` repeatedly until the volume refuses more data.
///
/// Disk-full conditions end the fill successfully with the byte count
/// reached; every other write fault propagates as an error.
pub(crate) fn fill_to_exhaustion<W: Write>(
    writer: &mut W,
    buf: &[u8],
    progress_interval: u64,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(u64),
) -> WipeOutcome<(u64, FillEnd)> {
    let mut written = 0u64;
    let mut last_report = 0u64;

    loop {
        if cancel.is_cancelled() {
            return Err(WipeError::Cancelled);
        }

        match writer.write(buf) {
            Ok(0) => return Ok((written, FillEnd::VolumeFull)),
            Ok(n) => {
                written += n as u64;
                if written - last_report >= progress_interval {
                    last_report = written;
                    on_progress(written);
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) if wipe_io::is_disk_full(&err) => {
                return Ok((written, FillEnd::VolumeFull));
            }
            Err(err) => return Err(WipeError::Io(err)),
        }
    }
}
