use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::LinkPolicy;
use crate::plan::GroupingPlan;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Link destination {} already exists", .0.display())]
    Exists(PathBuf),

    #[error("Cannot replace {}, it is a directory", .0.display())]
    NotReplaceable(PathBuf),

    #[error("Failed to link {} to {}: {}", .destination.display(), .source_path.display(), .source)]
    Link {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub created: usize,
    pub replaced: usize,
    pub skipped: Vec<PathBuf>,
}

pub struct Linker {
    output_dir: PathBuf,
    policy: LinkPolicy,
}

impl Linker {
    pub fn new(output_dir: PathBuf, policy: LinkPolicy) -> Self {
        Linker { output_dir, policy }
    }

    /// Every link the plan asks for. When two placements resolve to the same
    /// destination the first one wins.
    pub fn links(&self, plan: &GroupingPlan) -> Vec<Link> {
        let mut seen = HashSet::new();

        plan.placements()
            .iter()
            .flat_map(|placement| {
                let group_dir = self.output_dir.join(placement.group.to_string());
                let video = Link {
                    source: placement.video.path.clone(),
                    destination: group_dir.join(&placement.link_name),
                };
                let subtitles = placement.subtitles.iter().map(move |sub| Link {
                    source: sub.subtitle.path.clone(),
                    destination: group_dir.join(&sub.target_name),
                });

                std::iter::once(video).chain(subtitles)
            })
            .filter(|link| {
                let first = seen.insert(link.destination.clone());
                if !first {
                    warn!(
                        "{} is already planned, not linking {} there",
                        link.destination.display(),
                        link.source.display()
                    );
                }
                first
            })
            .collect()
    }

    pub fn apply(&self, plan: &GroupingPlan) -> Result<LinkReport> {
        let links = self.links(plan);
        let mut report = LinkReport::default();
        if links.is_empty() {
            return Ok(report);
        }

        if self.policy == LinkPolicy::Abort {
            if let Some(link) = links.iter().find(|link| occupied(&link.destination)) {
                return Err(Error::Exists(link.destination.clone()));
            }
        }

        for link in links {
            if let Some(dir) = link.destination.parent() {
                fs::create_dir_all(dir)?;
            }

            if occupied(&link.destination) {
                match self.policy {
                    LinkPolicy::Abort => return Err(Error::Exists(link.destination)),
                    LinkPolicy::Skip => {
                        info!("Skipping existing {}", link.destination.display());
                        report.skipped.push(link.destination);
                        continue;
                    }
                    LinkPolicy::Overwrite => {
                        if fs::symlink_metadata(&link.destination)?.is_dir() {
                            return Err(Error::NotReplaceable(link.destination));
                        }
                        debug!("Replacing {}", link.destination.display());
                        fs::remove_file(&link.destination)?;
                        report.replaced += 1;
                    }
                }
            }

            debug!(
                "Linking {} -> {}",
                link.destination.display(),
                link.source.display()
            );
            symlink(&link.source, &link.destination).map_err(|err| {
                if err.kind() == io::ErrorKind::AlreadyExists {
                    Error::Exists(link.destination.clone())
                } else {
                    Error::Link {
                        source_path: link.source.clone(),
                        destination: link.destination.clone(),
                        source: err,
                    }
                }
            })?;
            report.created += 1;
        }

        Ok(report)
    }
}

/// Dangling links count as occupied too.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(unix)]
fn symlink(source: &Path, destination: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, destination)
}

#[cfg(windows)]
fn symlink(source: &Path, destination: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(source, destination)
}
