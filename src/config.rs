use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_more::Display;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid group duration of {0} seconds, it has to be a positive number")]
    InvalidThreshold(f64),

    #[error("Malformed file extension {0:?}")]
    MalformedExtension(String),

    #[error("Video extension {0} and subtitle extension {1} overlap")]
    ConflictingExtensions(Extension, Extension),

    #[error("Input {} is not a directory", .0.display())]
    InputNotDirectory(PathBuf),

    #[error("Unknown link policy {0}. Supported policies are abort, skip and overwrite")]
    UnknownLinkPolicy(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Target duration of a single group.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub fn from_secs(secs: f64) -> Result<Self> {
        if secs.is_finite() && secs > 0.0 {
            Ok(Threshold(secs))
        } else {
            Err(Error::InvalidThreshold(secs))
        }
    }

    pub fn from_minutes(minutes: i64) -> Result<Self> {
        Self::from_secs(minutes as f64 * 60.0)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

/// A file extension, always stored with its leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
#[display(fmt = "{}", _0)]
#[serde(transparent)]
pub struct Extension(String);

impl Extension {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn overlaps(&self, other: &Extension) -> bool {
        self.0.ends_with(&other.0) || other.0.ends_with(&self.0)
    }
}

impl FromStr for Extension {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let normalized = if trimmed.starts_with('.') {
            trimmed.to_string()
        } else {
            format!(".{}", trimmed)
        };

        let malformed = normalized.len() < 2
            || normalized
                .chars()
                .any(|c| matches!(c, '/' | '\\' | '*' | '?' | '[' | ']') || c.is_whitespace());
        if malformed {
            return Err(Error::MalformedExtension(raw.into()));
        }

        Ok(Extension(normalized))
    }
}

/// What to do when a link destination is already occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    #[display(fmt = "abort")]
    Abort,
    #[display(fmt = "skip")]
    Skip,
    #[display(fmt = "overwrite")]
    Overwrite,
}

impl LinkPolicy {
    pub fn variants() -> [&'static str; 3] {
        ["abort", "skip", "overwrite"]
    }
}

impl Default for LinkPolicy {
    fn default() -> Self {
        LinkPolicy::Abort
    }
}

impl FromStr for LinkPolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "abort" => Ok(LinkPolicy::Abort),
            "skip" => Ok(LinkPolicy::Skip),
            "overwrite" => Ok(LinkPolicy::Overwrite),
            other => Err(Error::UnknownLinkPolicy(other.into())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub threshold: Threshold,
    pub video_extension: Extension,
    pub subtitle_extension: Option<Extension>,
    pub link_policy: LinkPolicy,
    pub skip_unreadable: bool,
    pub dry_run: bool,
}

impl Config {
    /// Validates the extensions and the input directory. A relative output
    /// directory is resolved against the canonical input directory.
    pub fn new(
        input_dir: &Path,
        output_dir: &Path,
        threshold: Threshold,
        video_extension: Extension,
        subtitle_extension: Option<Extension>,
    ) -> Result<Self> {
        if let Some(subtitle_extension) = &subtitle_extension {
            if video_extension.overlaps(subtitle_extension) {
                return Err(Error::ConflictingExtensions(
                    video_extension,
                    subtitle_extension.clone(),
                ));
            }
        }

        if !input_dir.is_dir() {
            return Err(Error::InputNotDirectory(input_dir.into()));
        }
        let input_dir = input_dir.canonicalize()?;
        let output_dir = if output_dir.is_absolute() {
            output_dir.to_path_buf()
        } else {
            input_dir.join(output_dir)
        };

        Ok(Config {
            input_dir,
            output_dir,
            threshold,
            video_extension,
            subtitle_extension,
            link_policy: LinkPolicy::default(),
            skip_unreadable: false,
            dry_run: false,
        })
    }

    pub fn with_link_policy(mut self, link_policy: LinkPolicy) -> Self {
        self.link_policy = link_policy;
        self
    }

    pub fn with_skip_unreadable(mut self, skip_unreadable: bool) -> Self {
        self.skip_unreadable = skip_unreadable;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input Directory: {}", self.input_dir.display())?;
        writeln!(f, "Output Directory: {}", self.output_dir.display())?;
        writeln!(
            f,
            "Group Duration (minutes): {}",
            self.threshold.as_secs() / 60.0
        )?;
        writeln!(f, "Video Extension: {}", self.video_extension)?;
        match &self.subtitle_extension {
            Some(ext) => writeln!(f, "Subtitle Extension: {}", ext)?,
            None => writeln!(f, "Subtitle Extension: None")?,
        }
        write!(f, "Existing Links: {}", self.link_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_rejects_non_positive() {
        [0.0, -1.0, -3600.0, f64::NAN, f64::INFINITY]
            .into_iter()
            .for_each(|secs| {
                assert!(
                    matches!(Threshold::from_secs(secs), Err(Error::InvalidThreshold(_))),
                    "{} accepted",
                    secs
                )
            });

        assert!(Threshold::from_minutes(0).is_err());
        assert!(Threshold::from_minutes(-5).is_err());
        assert_eq!(3600.0, Threshold::from_minutes(60).unwrap().as_secs());
    }

    #[test]
    fn extension_from_str() {
        [
            ("mp4", ".mp4"),
            (".mp4", ".mp4"),
            (" srt ", ".srt"),
            (".en.srt", ".en.srt"),
        ]
        .into_iter()
        .for_each(|(input, expected)| {
            assert_eq!(expected, input.parse::<Extension>().unwrap().as_str());
        });

        ["", ".", "  ", "a/b", "*.mp4", "m p4", "sub\\srt", "[ab]"]
            .into_iter()
            .for_each(|input| {
                assert!(
                    matches!(input.parse::<Extension>(), Err(Error::MalformedExtension(_))),
                    "{:?} accepted",
                    input
                )
            });
    }

    #[test]
    fn link_policy_from_str() {
        assert_eq!(LinkPolicy::Abort, "abort".parse().unwrap());
        assert_eq!(LinkPolicy::Skip, "skip".parse().unwrap());
        assert_eq!(LinkPolicy::Overwrite, "overwrite".parse().unwrap());
        assert!("replace".parse::<LinkPolicy>().is_err());

        LinkPolicy::variants().into_iter().for_each(|name| {
            assert_eq!(name, name.parse::<LinkPolicy>().unwrap().to_string());
        });
    }

    #[test]
    fn config_resolves_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let threshold = Threshold::from_minutes(60).unwrap();

        let config = Config::new(
            dir.path(),
            Path::new("groups/"),
            threshold,
            "mp4".parse().unwrap(),
            None,
        )
        .unwrap();
        let input = dir.path().canonicalize().unwrap();
        assert_eq!(input, config.input_dir);
        assert_eq!(input.join("groups"), config.output_dir);
        assert_eq!(LinkPolicy::Abort, config.link_policy);

        let elsewhere = tempfile::tempdir().unwrap();
        let config = Config::new(
            dir.path(),
            elsewhere.path(),
            threshold,
            "mp4".parse().unwrap(),
            None,
        )
        .unwrap();
        assert_eq!(elsewhere.path(), config.output_dir);
    }

    #[test]
    fn config_rejects_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let threshold = Threshold::from_minutes(60).unwrap();

        let missing = dir.path().join("missing");
        assert!(matches!(
            Config::new(&missing, Path::new("groups"), threshold, "mp4".parse().unwrap(), None),
            Err(Error::InputNotDirectory(_))
        ));

        assert!(matches!(
            Config::new(
                dir.path(),
                Path::new("groups"),
                threshold,
                "mp4".parse().unwrap(),
                Some("mp4".parse().unwrap()),
            ),
            Err(Error::ConflictingExtensions(..))
        ));

        assert!(matches!(
            Config::new(
                dir.path(),
                Path::new("groups"),
                threshold,
                ".srt".parse().unwrap(),
                Some(".en.srt".parse().unwrap()),
            ),
            Err(Error::ConflictingExtensions(..))
        ));
    }

    #[test]
    fn config_display() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(
            dir.path(),
            Path::new("groups/"),
            Threshold::from_minutes(45).unwrap(),
            "mp4".parse().unwrap(),
            None,
        )
        .unwrap();

        let rendered = config.to_string();
        assert!(rendered.contains("Group Duration (minutes): 45\n"));
        assert!(rendered.contains("Video Extension: .mp4\n"));
        assert!(rendered.contains("Subtitle Extension: None\n"));

        let config = Config::new(
            dir.path(),
            Path::new("groups/"),
            Threshold::from_minutes(45).unwrap(),
            "mp4".parse().unwrap(),
            Some("srt".parse().unwrap()),
        )
        .unwrap();
        assert!(config.to_string().contains("Subtitle Extension: .srt\n"));
    }
}
