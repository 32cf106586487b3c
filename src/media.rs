use std::fs::read_dir;
use std::io;
use std::path::{Path, PathBuf};

use log::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::Extension;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read input directory {}: {}", .0.display(), .1)]
    ReadDir(PathBuf, #[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A discovered video that has not been measured yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub name: String,
    pub stem: String,
}

impl VideoFile {
    pub fn with_duration(self, duration_seconds: f64) -> MediaFile {
        MediaFile {
            path: self.path,
            name: self.name,
            stem: self.stem,
            duration_seconds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFile {
    pub path: PathBuf,
    pub name: String,
    pub stem: String,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitleFile {
    pub path: PathBuf,
    pub name: String,
    pub stem: String,
    pub extension: Extension,
}

#[derive(Debug, Default)]
pub struct Inventory {
    pub videos: Vec<VideoFile>,
    pub subtitles: Vec<SubtitleFile>,
}

/// Strips `ext` from `name`, refusing names that are nothing but the extension.
fn stem_of<'a>(name: &'a str, ext: &Extension) -> Option<&'a str> {
    name.strip_suffix(ext.as_str())
        .filter(|stem| !stem.is_empty())
}

/// Lists the top level of `dir`; both lists come back sorted by name.
pub fn scan(
    dir: &Path,
    video_extension: &Extension,
    subtitle_extension: Option<&Extension>,
) -> Result<Inventory> {
    let entries = read_dir(dir)
        .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
        .map_err(|err| Error::ReadDir(dir.into(), err))?;

    let mut inventory = entries
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| match path.file_name().and_then(|name| name.to_str()) {
            Some(name) if name.starts_with('.') => {
                debug!("Skipping hidden file {}", path.display());
                None
            }
            Some(name) => Some((name.to_string(), path)),
            None => {
                warn!("Skipping {}, file name is not valid UTF-8", path.display());
                None
            }
        })
        .fold(Inventory::default(), |mut acc, (name, path)| {
            if let Some(stem) = stem_of(&name, video_extension) {
                acc.videos.push(VideoFile {
                    stem: stem.into(),
                    path,
                    name,
                });
            } else if let Some(ext) = subtitle_extension {
                if let Some(stem) = stem_of(&name, ext) {
                    acc.subtitles.push(SubtitleFile {
                        stem: stem.into(),
                        extension: ext.clone(),
                        path,
                        name,
                    });
                }
            }
            acc
        });

    inventory.videos.sort_by(|a, b| a.name.cmp(&b.name));
    inventory.subtitles.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(
        "Found {} videos and {} subtitles in {}",
        inventory.videos.len(),
        inventory.subtitles.len(),
        dir.display()
    );

    Ok(inventory)
}
