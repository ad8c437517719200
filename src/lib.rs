// Allow uppercase acronyms for industry-standard terms like DoD, RNG, ETA
#![allow(clippy::upper_case_acronyms)]

pub mod crypto;
pub mod io;
pub mod orchestrator;
pub mod patterns;
pub mod ui;
pub mod wipe;

// Re-export the main entry points for convenience
pub use orchestrator::{WipeOrchestrator, WipeTarget};
pub use wipe::{DirectoryWipe, FileWipe, FreeSpaceWipe};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors surfaced by wipe operations
#[derive(Error, Debug)]
pub enum WipeError {
    #[error("Target not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WipeOutcome<T> = Result<T, WipeError>;

/// Overwrite method selecting the pass sequence written over the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeMethod {
    /// One pass of zeros
    SinglePass,
    /// DoD 5220.22-M three pass variant (zeros, ones, random)
    DoD3Pass,
    /// DoD 5220.22-M seven pass variant
    DoD7Pass,
    /// Gutmann-inspired 35 pass sequence
    Gutmann,
}

impl WipeMethod {
    /// Number of overwrite passes the method performs
    pub fn pass_count(&self) -> u32 {
        match self {
            WipeMethod::SinglePass => 1,
            WipeMethod::DoD3Pass => 3,
            WipeMethod::DoD7Pass => 7,
            WipeMethod::Gutmann => 35,
        }
    }

    /// Human readable method name for logs and summaries
    pub fn name(&self) -> &'static str {
        match self {
            WipeMethod::SinglePass => "Single Pass (zeros)",
            WipeMethod::DoD3Pass => "DoD 5220.22-M (3 passes)",
            WipeMethod::DoD7Pass => "DoD 5220.22-M ECE (7 passes)",
            WipeMethod::Gutmann => "Gutmann (35 passes)",
        }
    }
}

impl FromStr for WipeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "zero" => Ok(WipeMethod::SinglePass),
            "dod3" | "dod" => Ok(WipeMethod::DoD3Pass),
            "dod7" => Ok(WipeMethod::DoD7Pass),
            "gutmann" => Ok(WipeMethod::Gutmann),
            _ => Err(format!("Unknown wipe method: {}", s)),
        }
    }
}

/// Tuning knobs shared by all executors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipeConfig {
    /// Size of each write block in bytes
    pub block_size: usize,
    /// Minimum bytes written between progress reports
    pub progress_interval: u64,
    /// Open targets with write-through so passes reach the platter
    pub write_through: bool,
}

impl Default for WipeConfig {
    fn default() -> Self {
        Self {
            block_size: 1024 * 1024,
            progress_interval: 4 * 1024 * 1024,
            write_through: true,
        }
    }
}

/// Final record of a wipe operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipeResult {
    pub success: bool,
    pub bytes_wiped: u64,
    pub passes_completed: u32,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub error: Option<String>,
}

/// Snapshot reported to a progress sink while a wipe runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipeProgress {
    pub current_pass: u32,
    pub total_passes: u32,
    pub bytes_written: u64,
    /// Total bytes per pass when known, None while filling free space
    pub total_bytes: Option<u64>,
    pub percent: f64,
    pub status: String,
    pub eta: Option<Duration>,
}

/// Receiver for progress snapshots, injected into executors
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &WipeProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(&WipeProgress) + Send + Sync,
{
    fn report(&self, progress: &WipeProgress) {
        self(progress)
    }
}

/// Sink that discards all progress reports
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _progress: &WipeProgress) {}
}

/// Cooperative cancellation handle shared between the caller and a running wipe
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the running operation stops at the next block boundary
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Underlying flag, for wiring up signal handlers
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Tracks wall-clock timing for a single operation and builds its final record
pub(crate) struct OpTimer {
    started_at: DateTime<Utc>,
    t0: Instant,
}

impl OpTimer {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            t0: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.t0.elapsed()
    }

    pub fn finish_ok(self, bytes_wiped: u64, passes_completed: u32) -> WipeResult {
        WipeResult {
            success: true,
            bytes_wiped,
            passes_completed,
            started_at: self.started_at,
            duration_secs: self.t0.elapsed().as_secs_f64(),
            error: None,
        }
    }

    pub fn finish_err(self, err: &WipeError, bytes_wiped: u64, passes_completed: u32) -> WipeResult {
        WipeResult {
            success: false,
            bytes_wiped,
            passes_completed,
            started_at: self.started_at,
            duration_secs: self.t0.elapsed().as_secs_f64(),
            error: Some(err.to_string()),
        }
    }
}
