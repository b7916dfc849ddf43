use crate::error::StageResult;
use crate::srt::Cue;
use crate::subtitle::{SubtitleInterval, SubtitleTrack};

use std::collections::HashSet;

use regex::Regex;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ProcessOpts {
    /// Remove inline markup such as `<i>` or `{\an8}`.
    pub strip_markup: bool,
    /// Always renumber ids, even when the source numbering is usable.
    pub renumber: bool,
}

impl Default for ProcessOpts {
    fn default() -> Self {
        Self {
            strip_markup: true,
            renumber: false,
        }
    }
}

/// Turns parsed cues into a subtitle track. The first text line of each cue
/// is the original, any further lines form the translation.
pub fn process(cues: Vec<Cue>, opts: &ProcessOpts) -> StageResult<SubtitleTrack> {
    let cues = clean_text(cues, opts.strip_markup)?;
    let cues = drop_empty(cues);
    let cues = if opts.renumber || !has_usable_ids(&cues) {
        generate_seqnum(cues)
    } else {
        cues
    };
    Ok(SubtitleTrack::new(cues.into_iter().map(into_interval).collect()))
}

fn clean_text(cues: Vec<Cue>, strip_markup: bool) -> StageResult<Vec<Cue>> {
    let markup = Regex::new(r"<[^>]*>|\{\\[^}]*\}")?;
    let spaces = Regex::new(r"\s+")?;

    let cleaned = cues
        .into_iter()
        .map(|mut cue| {
            cue.text = cue
                .text
                .iter()
                .map(|line| {
                    let mut line = line.to_string();
                    if strip_markup {
                        line = markup.replace_all(&line, "").into_owned();
                    }
                    spaces.replace_all(&line, " ").trim().to_string()
                })
                .filter(|line| !line.is_empty())
                .collect();
            cue
        })
        .collect();
    Ok(cleaned)
}

fn drop_empty(cues: Vec<Cue>) -> Vec<Cue> {
    cues.into_iter()
        .filter(|cue| {
            let keep = !cue.text.is_empty();
            if !keep {
                warn!(seq = ?cue.sequence_number, "dropping cue without text");
            }
            keep
        })
        .collect()
}

fn has_usable_ids(cues: &[Cue]) -> bool {
    let mut seen = HashSet::new();
    cues.iter().all(|cue| match cue.sequence_number {
        Some(n) => u32::try_from(n).is_ok() && seen.insert(n),
        None => false,
    })
}

fn generate_seqnum(cues: Vec<Cue>) -> Vec<Cue> {
    debug!(count = cues.len(), "renumbering cues");
    cues.into_iter()
        .zip(1..)
        .map(|(mut cue, seqnum)| {
            cue.sequence_number = Some(seqnum);
            cue
        })
        .collect()
}

fn into_interval(cue: Cue) -> SubtitleInterval {
    let mut lines = cue.text.into_iter();
    let original = lines.next().unwrap_or_default();
    let translated = lines.collect::<Vec<_>>().join(" ");
    let id = cue
        .sequence_number
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_default();
    SubtitleInterval::new(
        id,
        original,
        translated,
        cue.show_at.as_secs_f64(),
        cue.hide_at.as_secs_f64(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cue(seq: Option<usize>, start_ms: u64, end_ms: u64, text: &[&str]) -> Cue {
        let mut cue = Cue::new(
            Duration::from_millis(start_ms),
            Duration::from_millis(end_ms),
            text.iter().map(|s| s.to_string()).collect(),
        );
        cue.sequence_number = seq;
        cue
    }

    #[test]
    fn splits_original_and_translation() {
        let track = process(
            vec![cue(
                Some(4),
                17_100,
                20_000,
                &["But this is the first time", "Pero esta es", "la primera vez"],
            )],
            &ProcessOpts::default(),
        )
        .unwrap();

        let interval = &track.intervals()[0];
        assert_eq!(interval.id, 4);
        assert_eq!(interval.original_text, "But this is the first time");
        assert_eq!(interval.translated_text, "Pero esta es la primera vez");
        assert!((interval.start_time - 17.1).abs() < 1e-9);
        assert_eq!(interval.end_time, 20.0);
    }

    #[test]
    fn strips_markup_and_whitespace() {
        let track = process(
            vec![cue(
                Some(1),
                0,
                1000,
                &["{\\an8}<i>That I  cannot</i> do.", "<b>Eso</b>\tno"],
            )],
            &ProcessOpts::default(),
        )
        .unwrap();

        let interval = &track.intervals()[0];
        assert_eq!(interval.original_text, "That I cannot do.");
        assert_eq!(interval.translated_text, "Eso no");
    }

    #[test]
    fn markup_kept_when_asked() {
        let opts = ProcessOpts {
            strip_markup: false,
            ..ProcessOpts::default()
        };
        let track = process(vec![cue(Some(1), 0, 1000, &["<i>hi</i>"])], &opts).unwrap();
        assert_eq!(track.intervals()[0].original_text, "<i>hi</i>");
    }

    #[test]
    fn duplicate_ids_are_renumbered() {
        let track = process(
            vec![
                cue(Some(1), 0, 1000, &["a"]),
                cue(Some(1), 2000, 3000, &["b"]),
                cue(Some(9), 4000, 5000, &["c"]),
            ],
            &ProcessOpts::default(),
        )
        .unwrap();
        let ids: Vec<u32> = track.intervals().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn unique_ids_are_kept() {
        let track = process(
            vec![cue(Some(7), 0, 1000, &["a"]), cue(Some(3), 2000, 3000, &["b"])],
            &ProcessOpts::default(),
        )
        .unwrap();
        let ids: Vec<u32> = track.intervals().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![7, 3]);
    }

    #[test]
    fn demo_scene_matches_built_in_track() {
        let cues = crate::parser::parse(include_str!("../demos/scene.srt")).unwrap();
        let track = process(cues, &ProcessOpts::default()).unwrap();
        assert_eq!(track, SubtitleTrack::sample());
    }

    #[test]
    fn cues_emptied_by_cleanup_are_dropped() {
        let track = process(
            vec![cue(Some(1), 0, 1000, &["<i></i>"]), cue(Some(2), 2000, 3000, &["b"])],
            &ProcessOpts::default(),
        )
        .unwrap();
        assert_eq!(track.len(), 1);
        assert_eq!(track.intervals()[0].id, 2);
    }
}
