mod command;
mod ffprobe;
mod parser;

use std::path::Path;
use std::{io, process::ExitStatus};

pub use ffprobe::FFprobe;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to probe {0}, exit status {1}")]
    FailedToProbe(String, ExitStatus),

    #[error("No video stream found")]
    NoVideoStream,

    #[error("Frame count is not reported for the video stream")]
    MissingFrameCount,

    #[error("Frame rate {0} is zero or undefined")]
    ZeroFrameRate(String),

    #[error("Invalid ffprobe output line {0}")]
    InvalidOutputLine(String),

    #[error(transparent)]
    IO(#[from] io::Error),

    #[error("Cannot get stdout stream for command {0}")]
    NoStdout(String),

    #[error("Command not spawned {0}")]
    CommandNotSpawned(String),
}

/// Reads the playback duration of a media file.
pub trait Probe: Sync {
    fn duration_seconds(&self, path: &Path) -> Result<f64>;
}
