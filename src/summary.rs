use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::link::LinkReport;
use crate::plan::GroupingPlan;

/// Formats seconds as `HH:MM:SS`. Fractions are truncated and hours never wrap.
pub fn format_hms(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (hours, remaining) = (total / 3600, total % 3600);
    let (minutes, seconds) = (remaining / 60, remaining % 60);

    format!("{:0>2}:{:0>2}:{:0>2}", hours, minutes, seconds)
}

/// A video left out of the plan because its duration could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unreadable {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub index: usize,
    pub group: String,
    pub videos: usize,
    pub duration: String,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_duration: String,
    pub groups: Vec<GroupSummary>,
    pub plan: GroupingPlan,
    pub links: Option<LinkReport>,
    pub unreadable: Vec<Unreadable>,
}

impl Summary {
    pub fn new(plan: GroupingPlan, links: Option<LinkReport>, unreadable: Vec<Unreadable>) -> Self {
        let groups = plan
            .groups()
            .iter()
            .map(|group| GroupSummary {
                index: group.index.value(),
                group: group.index.to_string(),
                videos: group.videos.len(),
                duration: format_hms(group.duration_seconds()),
                duration_seconds: group.duration_seconds(),
            })
            .collect();

        Summary {
            total_duration: format_hms(plan.total_seconds()),
            groups,
            plan,
            links,
            unreadable,
        }
    }

    pub fn total_line(&self) -> String {
        format!("Total duration: {}", self.total_duration)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            writeln!(
                f,
                "{}  {:>3} videos  {}",
                group.group, group.videos, group.duration
            )?;
        }

        for unreadable in &self.unreadable {
            writeln!(
                f,
                "Skipped {}: {}",
                unreadable.path.display(),
                unreadable.reason
            )?;
        }

        match &self.links {
            Some(links) => writeln!(
                f,
                "Links created: {}, replaced: {}, skipped: {}",
                links.created,
                links.replaced,
                links.skipped.len()
            ),
            None => writeln!(f, "Dry run, no links created"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Threshold;
    use crate::media::MediaFile;
    use crate::plan::assign_groups;

    #[test]
    fn test_format_hms() {
        [
            (0.0, "00:00:00"),
            (59.99, "00:00:59"),
            (61.0, "00:01:01"),
            (3600.0, "01:00:00"),
            (5400.0, "01:30:00"),
            (86399.0, "23:59:59"),
            (360000.0, "100:00:00"),
            (-5.0, "00:00:00"),
        ]
        .into_iter()
        .for_each(|(input, expected)| assert_eq!(expected, format_hms(input)));
    }

    #[test]
    fn test_summary_groups() {
        let media = |name: &str, duration_seconds: f64| MediaFile {
            path: format!("/in/{}", name).into(),
            name: name.into(),
            stem: name.trim_end_matches(".mp4").into(),
            duration_seconds,
        };
        let plan = assign_groups(
            vec![
                media("A.mp4", 1800.0),
                media("B.mp4", 2400.0),
                media("C.mp4", 1200.0),
            ],
            Threshold::from_minutes(60).unwrap(),
        );

        let summary = Summary::new(plan, Some(LinkReport::default()), vec![]);
        assert_eq!("Total duration: 01:30:00", summary.total_line());
        assert_eq!(
            vec![("Group 01", 1, "00:30:00"), ("Group 02", 2, "01:00:00")],
            summary
                .groups
                .iter()
                .map(|g| (g.group.as_str(), g.videos, g.duration.as_str()))
                .collect::<Vec<_>>()
        );

        let rendered = summary.to_string();
        assert!(rendered.contains("Group 02    2 videos  01:00:00"));
        assert!(rendered.contains("Links created: 0"));
    }

    #[test]
    fn test_empty_summary() {
        let plan = assign_groups(vec![], Threshold::from_minutes(60).unwrap());
        let summary = Summary::new(plan, None, vec![]);

        assert_eq!("Total duration: 00:00:00", summary.total_line());
        assert!(summary.groups.is_empty());
        assert_eq!("Dry run, no links created\n", summary.to_string());
    }
}
