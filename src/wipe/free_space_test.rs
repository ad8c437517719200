use crate::wipe::free_space::{fill_to_exhaustion, FillEnd, FreeSpaceWipe};
use crate::{CancelToken, NullProgress, WipeConfig, WipeError, WipeMethod};
use std::io::{ErrorKind, Write};
use tempfile::tempdir;

/// Writer that accepts a fixed byte budget and then reports a full disk
struct QuotaWriter {
    remaining: usize,
    interrupts_left: u32,
}

impl QuotaWriter {
    fn new(budget: usize) -> Self {
        Self {
            remaining: budget,
            interrupts_left: 0,
        }
    }
}

impl Write for QuotaWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.interrupts_left > 0 {
            self.interrupts_left -= 1;
            return Err(std::io::Error::new(ErrorKind::Interrupted, "try again"));
        }
        if self.remaining == 0 {
            return Err(std::io::Error::new(ErrorKind::StorageFull, "no space left"));
        }
        let n = buf.len().min(self.remaining);
        self.remaining -= n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(
            ErrorKind::PermissionDenied,
            "write blocked",
        ))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn fill_stops_successfully_at_disk_full() {
    let budget = 10 * 4096 + 123;
    let mut writer = QuotaWriter::new(budget);
    let buf = vec![0xAAu8; 4096];

    let (written, end) =
        fill_to_exhaustion(&mut writer, &buf, 4096, &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(end, FillEnd::VolumeFull);
    assert_eq!(written, budget as u64, "partial final write must be counted");
}

#[cfg(unix)]
#[test]
fn raw_enospc_ends_the_fill() {
    struct RawEnospc;
    impl Write for RawEnospc {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from_raw_os_error(libc::ENOSPC))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buf = vec![0u8; 512];
    let (written, end) =
        fill_to_exhaustion(&mut RawEnospc, &buf, 512, &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(end, FillEnd::VolumeFull);
    assert_eq!(written, 0);
}

#[test]
fn interrupted_writes_are_retried() {
    let mut writer = QuotaWriter::new(8192);
    writer.interrupts_left = 3;
    let buf = vec![0u8; 4096];

    let (written, end) =
        fill_to_exhaustion(&mut writer, &buf, 4096, &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(end, FillEnd::VolumeFull);
    assert_eq!(written, 8192);
}

#[test]
fn non_space_faults_propagate() {
    let buf = vec![0u8; 512];
    let err = fill_to_exhaustion(&mut FailingWriter, &buf, 512, &CancelToken::new(), |_| {})
        .unwrap_err();

    match err {
        WipeError::Io(io_err) => assert_eq!(io_err.kind(), ErrorKind::PermissionDenied),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn cancellation_aborts_the_fill() {
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut writer = QuotaWriter::new(1 << 30);
    let buf = vec![0u8; 4096];

    let err = fill_to_exhaustion(&mut writer, &buf, 4096, &cancel, |_| {}).unwrap_err();
    assert!(matches!(err, WipeError::Cancelled));
}

#[test]
fn progress_callback_sees_increasing_counts() {
    let mut writer = QuotaWriter::new(64 * 1024);
    let buf = vec![0u8; 4096];
    let mut seen = Vec::new();

    fill_to_exhaustion(&mut writer, &buf, 8192, &CancelToken::new(), |written| {
        seen.push(written)
    })
    .unwrap();

    assert!(!seen.is_empty());
    for pair in seen.windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

#[test]
fn missing_directory_reports_not_found() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");

    let result = FreeSpaceWipe::run(
        &missing,
        WipeMethod::SinglePass,
        &WipeConfig::default(),
        &NullProgress,
        &CancelToken::new(),
    );

    assert!(!result.success);
    assert!(result.error.unwrap().contains("Target not found"));
}

#[test]
fn pre_cancelled_token_writes_nothing() {
    let dir = tempdir().unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = FreeSpaceWipe::run(
        dir.path(),
        WipeMethod::SinglePass,
        &WipeConfig::default(),
        &NullProgress,
        &cancel,
    );

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Operation cancelled"));
    assert_eq!(result.bytes_wiped, 0);
}

/// Fills the volume hosting the temp directory. Slow and disk-hungry,
/// run explicitly with `cargo test -- --ignored`.
#[test]
#[ignore]
#[serial_test::serial]
fn real_volume_fill_leaves_no_residue() {
    let dir = tempdir().unwrap();

    let result = FreeSpaceWipe::run(
        dir.path(),
        WipeMethod::SinglePass,
        &WipeConfig::default(),
        &NullProgress,
        &CancelToken::new(),
    );

    assert!(result.success, "fill failed: {:?}", result.error);
    assert!(result.bytes_wiped > 0);
    assert_eq!(result.passes_completed, 1);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(leftovers.is_empty(), "fill file left behind: {:?}", leftovers);
}
