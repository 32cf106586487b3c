use std::path::PathBuf;

use log::*;
use rayon::prelude::*;
use thiserror::Error;

use crate::config::Config;
use crate::link::{self, Linker};
use crate::media::{self, MediaFile, VideoFile};
use crate::plan::assign_groups;
use crate::probe::{self, Probe};
use crate::progress::{Progress, Reporter, SilentReporter};
use crate::summary::{Summary, Unreadable};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read media {}: {}", .path.display(), .source)]
    MediaRead {
        path: PathBuf,
        #[source]
        source: probe::Error,
    },

    #[error(transparent)]
    Scan(#[from] media::Error),

    #[error(transparent)]
    Link(#[from] link::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub struct Processor<P, R> {
    config: Config,
    probe: P,
    reporter: R,
}

impl<P: Probe> Processor<P, SilentReporter> {
    pub fn new(config: Config, probe: P) -> Self {
        Processor {
            config,
            probe,
            reporter: SilentReporter,
        }
    }
}

impl<P, R> Processor<P, R>
where
    P: Probe,
    R: Reporter,
{
    pub fn with_reporter<T: Reporter>(self, reporter: T) -> Processor<P, T> {
        Processor {
            config: self.config,
            probe: self.probe,
            reporter,
        }
    }

    pub fn process(&self) -> Result<Summary> {
        let config = &self.config;
        let inventory = media::scan(
            &config.input_dir,
            &config.video_extension,
            config.subtitle_extension.as_ref(),
        )?;
        info!(
            "Found {} videos in {}",
            inventory.videos.len(),
            config.input_dir.display()
        );

        let (videos, unreadable) = self.measure(inventory.videos)?;

        let mut plan = assign_groups(videos, config.threshold);
        if config.subtitle_extension.is_some() {
            plan.attach_subtitles(&inventory.subtitles);
        }

        let links = if config.dry_run {
            info!("Dry run, skipping link creation");
            None
        } else {
            let linker = Linker::new(config.output_dir.clone(), config.link_policy);
            Some(linker.apply(&plan)?)
        };

        Ok(Summary::new(plan, links, unreadable))
    }

    /// Probes every video before anything is linked. Results keep the input order.
    fn measure(&self, videos: Vec<VideoFile>) -> Result<(Vec<MediaFile>, Vec<Unreadable>)> {
        let progress = self.reporter.add(videos.len());
        let probe = &self.probe;

        let measured = videos
            .into_par_iter()
            .map(|video| {
                let duration = probe.duration_seconds(&video.path);
                progress.update(&video.path, duration.as_ref().ok().copied());
                (video, duration)
            })
            .collect::<Vec<_>>();

        let mut media_files = Vec::with_capacity(measured.len());
        let mut unreadable = vec![];
        for (video, duration) in measured {
            match duration {
                Ok(duration_seconds) => {
                    debug!("{} lasts {:.3}s", video.name, duration_seconds);
                    media_files.push(video.with_duration(duration_seconds));
                }
                Err(err) if self.config.skip_unreadable => {
                    warn!("Skipping {}: {}", video.path.display(), err);
                    unreadable.push(Unreadable {
                        path: video.path,
                        reason: err.to_string(),
                    });
                }
                Err(source) => {
                    let err = Error::MediaRead {
                        path: video.path,
                        source,
                    };
                    progress.finish(Some(err.to_string()));
                    return Err(err);
                }
            }
        }

        progress.finish(None);
        Ok((media_files, unreadable))
    }
}
