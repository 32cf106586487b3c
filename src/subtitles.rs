use serde::Serialize;

use crate::media::{MediaFile, SubtitleFile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtitlePlacement {
    pub target_name: String,
    pub subtitle: SubtitleFile,
}

/// Whether `subtitle` matches the `<stem>*<ext>` pattern of `video`.
///
/// This is a raw prefix match, so a video stem that prefixes another stem
/// also picks up that video's subtitles (`movie.mp4` takes `movie1.srt`).
fn is_candidate(video: &MediaFile, subtitle: &SubtitleFile) -> bool {
    subtitle.path != video.path
        && subtitle.name.starts_with(&video.stem)
        && subtitle.name.len() >= video.stem.len() + subtitle.extension.as_str().len()
}

/// Picks the subtitles traveling with `video` and the names they are linked under.
///
/// A single candidate is renamed to the video stem plus the subtitle
/// extension. Several candidates keep their own names so they can sit side by
/// side in the group directory.
pub fn associate_subtitles<'a>(
    video: &MediaFile,
    candidates: impl IntoIterator<Item = &'a SubtitleFile>,
) -> Vec<SubtitlePlacement> {
    let mut matched = candidates
        .into_iter()
        .filter(|subtitle| is_candidate(video, subtitle))
        .collect::<Vec<_>>();
    matched.sort_by(|a, b| a.name.cmp(&b.name));

    match matched.as_slice() {
        [] => vec![],
        [single] => vec![SubtitlePlacement {
            target_name: format!("{}{}", video.stem, single.extension),
            subtitle: (*single).clone(),
        }],
        many => many
            .iter()
            .map(|subtitle| SubtitlePlacement {
                target_name: subtitle.name.clone(),
                subtitle: (*subtitle).clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Extension;

    fn video(stem: &str) -> MediaFile {
        MediaFile {
            path: format!("/in/{}.mp4", stem).into(),
            name: format!("{}.mp4", stem),
            stem: stem.into(),
            duration_seconds: 60.0,
        }
    }

    fn subtitle(name: &str) -> SubtitleFile {
        let extension: Extension = ".srt".parse().unwrap();
        SubtitleFile {
            path: format!("/in/{}", name).into(),
            name: name.into(),
            stem: name.trim_end_matches(".srt").into(),
            extension,
        }
    }

    fn targets(placements: &[SubtitlePlacement]) -> Vec<&str> {
        placements
            .iter()
            .map(|p| p.target_name.as_str())
            .collect()
    }

    #[test]
    fn test_no_candidates() {
        let candidates = vec![subtitle("other.srt"), subtitle("mov.srt")];
        assert!(associate_subtitles(&video("movie"), &candidates).is_empty());
        assert!(associate_subtitles(&video("movie"), &Vec::<SubtitleFile>::new()).is_empty());
    }

    #[test]
    fn test_single_candidate_is_renamed() {
        let candidates = vec![subtitle("movie.en.srt"), subtitle("other.srt")];
        let placements = associate_subtitles(&video("movie"), &candidates);

        assert_eq!(vec!["movie.srt"], targets(&placements));
        assert_eq!("movie.en.srt", placements[0].subtitle.name);
    }

    #[test]
    fn test_multiple_candidates_keep_names() {
        let candidates = vec![
            subtitle("movie.fr.srt"),
            subtitle("movie.en.srt"),
            subtitle("other.srt"),
        ];
        let placements = associate_subtitles(&video("movie"), &candidates);

        assert_eq!(vec!["movie.en.srt", "movie.fr.srt"], targets(&placements));
    }

    #[test]
    fn test_prefix_over_match() {
        let candidates = vec![subtitle("movie1.srt")];
        let placements = associate_subtitles(&video("movie"), &candidates);

        assert_eq!(vec!["movie.srt"], targets(&placements));
        assert_eq!("movie1.srt", placements[0].subtitle.name);
    }

    #[test]
    fn test_exact_stem_candidate() {
        let candidates = vec![subtitle("movie.srt")];
        let placements = associate_subtitles(&video("movie"), &candidates);
        assert_eq!(vec!["movie.srt"], targets(&placements));
    }
}
