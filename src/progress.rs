use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use serde_json::json;

use crate::summary::format_hms;

pub trait Reporter: Clone + Sized + Send + 'static {
    type Progress: Progress;

    fn new() -> Self;

    fn add(&self, files: usize) -> Self::Progress;
}

/// Progress of the measuring phase, shared by the probing workers.
pub trait Progress: Send + Sync {
    /// `duration` is `None` when the file could not be read.
    fn update(&self, file: &Path, duration: Option<f64>);
    fn finish(&self, err: Option<String>);
}

fn file_name(file: &Path) -> String {
    file.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string())
}

#[derive(Clone)]
pub struct ConsoleProgressBarReporter;

impl Reporter for ConsoleProgressBarReporter {
    type Progress = TerminalProgressBar;

    fn new() -> Self {
        ConsoleProgressBarReporter
    }

    fn add(&self, files: usize) -> Self::Progress {
        let style_bar = ProgressStyle::default_bar()
            .template("🎞  {prefix}  {bar:50.cyan/blue}  {pos}/{len}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let pb = ProgressBar::new(files as u64)
            .with_style(style_bar)
            .with_prefix(style("Measuring").bold().to_string());

        TerminalProgressBar { pb }
    }
}

#[derive(Clone, Debug)]
pub struct TerminalProgressBar {
    pb: ProgressBar,
}

impl Progress for TerminalProgressBar {
    fn update(&self, file: &Path, duration: Option<f64>) {
        let msg = match duration {
            Some(duration) => format!("🕒 {} {}", file_name(file), format_hms(duration)),
            None => format!("❌ {}", file_name(file)),
        };
        self.pb.set_message(style(msg).bold().to_string());
        self.pb.inc(1);
    }

    fn finish(&self, err: Option<String>) {
        let message = match err {
            Some(err) => format!("❌ {}", err),
            None => format!("✅ {} files", self.pb.position()),
        };

        self.pb.finish_with_message(style(message).bold().to_string());
    }
}

/// Reports nothing.
#[derive(Clone, Debug)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    type Progress = SilentReporter;

    fn new() -> Self {
        SilentReporter
    }

    fn add(&self, _: usize) -> Self::Progress {
        SilentReporter
    }
}

impl Progress for SilentReporter {
    fn update(&self, _: &Path, _: Option<f64>) {}

    fn finish(&self, _: Option<String>) {}
}

fn calculate_percentage(len: usize, progress: usize) -> u64 {
    if len == 0 {
        return 100;
    }

    ((progress as f64 / len as f64) * 100f64).round() as u64
}

/// Writes one JSON object per line to stderr, keeping stdout for the summary.
#[derive(Clone)]
pub struct JsonProgressReporter;

impl Reporter for JsonProgressReporter {
    type Progress = JsonProgress;

    fn new() -> Self {
        JsonProgressReporter
    }

    fn add(&self, files: usize) -> Self::Progress {
        JsonProgress::new(files, io::stderr())
    }
}

type JsonProgressStream = dyn Write + Sync + Send;

struct JsonProgressState {
    probed: usize,
    stream: Box<JsonProgressStream>,
}

#[derive(Clone)]
pub struct JsonProgress {
    files: usize,
    state: Arc<Mutex<JsonProgressState>>,
}

impl JsonProgress {
    fn new<T: Write + Sync + Send + 'static>(files: usize, stream: T) -> Self {
        JsonProgress {
            files,
            state: Arc::new(Mutex::new(JsonProgressState {
                probed: 0,
                stream: Box::new(stream),
            })),
        }
    }

    fn print(state: &mut JsonProgressState, json_data: serde_json::Value) {
        // progress is best effort, a closed stream must not abort the run
        let _ = writeln!(state.stream, "{}", json_data);
    }
}

impl Progress for JsonProgress {
    fn update(&self, file: &Path, duration: Option<f64>) {
        let mut state = self.state.lock();
        state.probed += 1;

        let json_data = json!({
            "file": file_name(file),
            "duration_seconds": duration,
            "duration": duration.map(format_hms),
            "probed": state.probed,
            "files": self.files,
            "progress_percentage": calculate_percentage(self.files, state.probed),
        });
        Self::print(&mut state, json_data);
    }

    fn finish(&self, err: Option<String>) {
        let mut state = self.state.lock();
        let json_data = json!({
            "probed": state.probed,
            "files": self.files,
            "finished": true,
            "err": err,
        });
        Self::print(&mut state, json_data);
    }
}
