use crate::{ProgressSink, WipeProgress};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Instant;

const GREEN: &str = "\x1b[38;5;82m";
const GRAY: &str = "\x1b[38;5;240m";
const CYAN: &str = "\x1b[38;5;51m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Single-line ANSI progress bar with speed and ETA readouts
pub struct ProgressBar {
    width: usize,
    last_bytes: u64,
    last_sample: Instant,
    speed: f64,
}

impl ProgressBar {
    /// width = number of bar character slots (not including the brackets)
    pub fn new(width: usize) -> Self {
        Self {
            width,
            last_bytes: 0,
            last_sample: Instant::now(),
            speed: 0.0,
        }
    }

    /// Render the current state over the previous line
    pub fn render(&mut self, progress: &WipeProgress) {
        let pct = if progress.percent.is_nan() {
            0.0
        } else {
            progress.percent.clamp(0.0, 100.0)
        };

        let filled = ((pct / 100.0) * self.width as f64).round() as usize;
        let empty = self.width.saturating_sub(filled);

        // Speed over the window since the last sample; the byte counter
        // restarts at each pass rollover
        let now = Instant::now();
        if progress.bytes_written < self.last_bytes {
            self.last_bytes = 0;
            self.last_sample = now;
        }
        let dt = now.duration_since(self.last_sample).as_secs_f64();
        if dt >= 0.2 {
            self.speed = (progress.bytes_written - self.last_bytes) as f64 / dt;
            self.last_bytes = progress.bytes_written;
            self.last_sample = now;
        }

        let bar = format!(
            "{}{}{}{}{}{}{}",
            BOLD,
            GREEN,
            "█".repeat(filled),
            RESET,
            GRAY,
            "░".repeat(empty),
            RESET
        );

        let counters = match progress.total_bytes {
            Some(total) => format!(
                "{} / {}",
                human_bytes(progress.bytes_written as f64),
                human_bytes(total as f64)
            ),
            None => human_bytes(progress.bytes_written as f64),
        };

        let eta = match progress.eta {
            Some(eta) => format!("  ETA {}", format_duration(eta.as_secs())),
            None => String::new(),
        };

        print!(
            "\r\x1b[2K[{}] {}{:>5.1}%{}  {}{}{} @ {}/s{}  {}",
            bar,
            BOLD,
            pct,
            RESET,
            CYAN,
            counters,
            RESET,
            human_bytes(self.speed),
            eta,
            progress.status
        );
        io::stdout().flush().ok();
    }

    /// End the in-place line so later output starts fresh
    pub fn finish(&mut self) {
        println!();
        io::stdout().flush().ok();
    }
}

/// Progress sink that draws the bar on stdout
pub struct ConsoleProgress {
    bar: Mutex<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(ProgressBar::new(48)),
        }
    }

    pub fn finish(&self) {
        self.bar.lock().unwrap().finish();
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&self, progress: &WipeProgress) {
        self.bar.lock().unwrap().render(progress);
    }
}

/// Convert bytes (or bytes/sec) to a readable string
pub fn human_bytes(bps: f64) -> String {
    let units = ["B", "KB", "MB", "GB", "TB"];
    if bps <= 0.0 {
        return "0B".to_string();
    }
    let mut val = bps;
    let mut i = 0usize;
    while val >= 1024.0 && i + 1 < units.len() {
        val /= 1024.0;
        i += 1;
    }
    format!("{:.2}{}", val, units[i])
}

/// Format seconds to H:MM:SS or M:SS
pub fn format_duration(secs: u64) -> String {
    let h = secs / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}
