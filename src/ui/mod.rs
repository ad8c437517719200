pub mod progress;


pub use progress::{format_duration, human_bytes, ConsoleProgress, ProgressBar};
