use derive_more::Display;
use serde::Serialize;

use crate::config::Threshold;
use crate::media::{MediaFile, SubtitleFile};
use crate::subtitles::{associate_subtitles, SubtitlePlacement};

/// 1-based group ordinal, rendered as the group directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[display(fmt = "Group {:0>2}", _0)]
#[serde(transparent)]
pub struct GroupIndex(usize);

impl GroupIndex {
    pub fn for_elapsed(elapsed_seconds: f64, threshold: Threshold) -> Self {
        GroupIndex((elapsed_seconds / threshold.as_secs()).floor() as usize + 1)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

/// Running state of the grouping fold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    total_seconds: f64,
}

impl Accumulator {
    /// Adds one file and returns the group that file falls into, judged by
    /// the cumulative duration through and including it.
    pub fn step(self, duration_seconds: f64, threshold: Threshold) -> (Self, GroupIndex) {
        let total_seconds = self.total_seconds + duration_seconds;
        (
            Accumulator { total_seconds },
            GroupIndex::for_elapsed(total_seconds, threshold),
        )
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub group: GroupIndex,
    pub video: MediaFile,
    pub link_name: String,
    pub subtitles: Vec<SubtitlePlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<'a> {
    pub index: GroupIndex,
    pub videos: Vec<&'a MediaFile>,
}

impl<'a> Group<'a> {
    pub fn duration_seconds(&self) -> f64 {
        self.videos.iter().map(|video| video.duration_seconds).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingPlan {
    threshold: Threshold,
    total_seconds: f64,
    placements: Vec<Placement>,
}

impl GroupingPlan {
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn groups(&self) -> Vec<Group<'_>> {
        self.placements
            .iter()
            .fold(Vec::<Group>::new(), |mut groups, placement| {
                match groups.last_mut() {
                    Some(group) if group.index == placement.group => {
                        group.videos.push(&placement.video)
                    }
                    _ => groups.push(Group {
                        index: placement.group,
                        videos: vec![&placement.video],
                    }),
                }
                groups
            })
    }

    pub fn attach_subtitles(&mut self, candidates: &[SubtitleFile]) {
        self.placements.iter_mut().for_each(|placement| {
            placement.subtitles = associate_subtitles(&placement.video, candidates);
        });
    }
}

/// Assigns every file to a group by its cumulative duration in name order.
pub fn assign_groups(mut files: Vec<MediaFile>, threshold: Threshold) -> GroupingPlan {
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let (acc, placements) = files.into_iter().fold(
        (Accumulator::default(), Vec::new()),
        |(acc, mut placements), video| {
            let (acc, group) = acc.step(video.duration_seconds, threshold);
            placements.push(Placement {
                group,
                link_name: video.name.clone(),
                video,
                subtitles: vec![],
            });
            (acc, placements)
        },
    );

    GroupingPlan {
        threshold,
        total_seconds: acc.total_seconds(),
        placements,
    }
}
