use std::fmt;
use std::io::{BufRead, BufReader, Read};

use crate::probe::{Error, Result};

use log::*;

pub trait CommandStreamParser<V> {
    fn parse(self) -> Result<V>;
}

/// Frame rate as ffprobe reports it, e.g. `30000/1001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub numerator: u64,
    pub denominator: u64,
}

impl FrameRate {
    fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidOutputLine(value.into());
        let mut split = value.trim().splitn(2, '/');

        let numerator = split
            .next()
            .ok_or_else(invalid)?
            .parse::<u64>()
            .map_err(|_| invalid())?;
        let denominator = match split.next() {
            Some(den) => den.parse::<u64>().map_err(|_| invalid())?,
            None => 1,
        };

        Ok(FrameRate {
            numerator,
            denominator,
        })
    }

    /// `None` when the rate is zero or undefined.
    pub fn per_second(&self) -> Option<f64> {
        if self.numerator == 0 || self.denominator == 0 {
            return None;
        }

        Some(self.numerator as f64 / self.denominator as f64)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StreamInfo {
    pub frame_count: Option<u64>,
    pub frame_rate: Option<FrameRate>,
    pub stream_duration: Option<f64>,
    pub format_duration: Option<f64>,
}

impl StreamInfo {
    /// Containers such as Matroska do not store a frame count, it is then
    /// estimated from the stream (or container) duration.
    fn frames(&self, rate: f64) -> Result<u64> {
        if let Some(frames) = self.frame_count {
            return Ok(frames);
        }

        let duration = self
            .stream_duration
            .or(self.format_duration)
            .ok_or(Error::MissingFrameCount)?;
        let frames = (duration * rate).round() as u64;
        debug!(
            "frame count not reported, estimated {} frames from {}s",
            frames, duration
        );
        Ok(frames)
    }

    pub fn duration_seconds(&self) -> Result<f64> {
        let rate = self
            .frame_rate
            .and_then(|rate| rate.per_second())
            .ok_or_else(|| {
                Error::ZeroFrameRate(
                    self.frame_rate
                        .map(|rate| rate.to_string())
                        .unwrap_or_else(|| "N/A".into()),
                )
            })?;
        let frames = self.frames(rate)?;

        Ok(frames as f64 / rate)
    }
}

fn parse_duration(value: &str) -> Result<Option<f64>> {
    if value == "N/A" {
        return Ok(None);
    }

    let duration = value
        .parse::<f64>()
        .map_err(|_| Error::InvalidOutputLine(value.into()))?;
    Ok(Some(duration).filter(|d| d.is_finite() && *d > 0.0))
}

pub struct StreamInfoParser<T: Read> {
    stream: T,
}

impl<T: Read> StreamInfoParser<T> {
    pub fn new(stream: T) -> Self {
        Self { stream }
    }
}

impl<T: Read> CommandStreamParser<StreamInfo> for StreamInfoParser<T> {
    fn parse(self) -> Result<StreamInfo> {
        let mut info = StreamInfo::default();
        let mut seen_stream = false;

        parse_command_stream(self.stream, |section, name, value| {
            match (section, name) {
                (Section::Format, "duration") => {
                    info.format_duration = parse_duration(value)?;
                }
                (Section::Format, _) => {}
                (Section::Stream, "duration") => {
                    seen_stream = true;
                    info.stream_duration = parse_duration(value)?;
                }
                (Section::Stream, "nb_frames") => {
                    seen_stream = true;
                    info.frame_count = match value {
                        "N/A" => None,
                        frames => Some(
                            frames
                                .parse()
                                .map_err(|_| Error::InvalidOutputLine(frames.into()))?,
                        ),
                    };
                }
                (Section::Stream, "avg_frame_rate") => {
                    seen_stream = true;
                    info.frame_rate = match value {
                        "N/A" => None,
                        rate => Some(FrameRate::parse(rate)?),
                    };
                }
                (Section::Stream, _) => {}
            }

            Ok(())
        })?;

        if !seen_stream {
            return Err(Error::NoVideoStream);
        }

        Ok(info)
    }
}

/// Wrapper section of ffprobe's default writer, e.g. `[STREAM]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Stream,
    Format,
}

fn parse_command_stream(
    stream: impl Read,
    mut visit: impl FnMut(Section, &str, &str) -> Result<()>,
) -> Result<()> {
    let stdout_reader = BufReader::new(stream);
    // output without wrappers only carries stream entries
    let mut section = Section::Stream;

    for line in stdout_reader.lines() {
        let line = line?;
        trace!("parse_command_stream line {}", &line);

        match line.trim_end() {
            "[FORMAT]" => section = Section::Format,
            "[STREAM]" | "[/FORMAT]" | "[/STREAM]" => section = Section::Stream,
            line => {
                let mut split = line.splitn(2, '=');
                if let (Some(name), Some(value)) = (split.next(), split.next()) {
                    visit(section, name, value)?;
                }
            }
        }
    }

    Ok(())
}
