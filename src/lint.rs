//! Authoring checks. The resolvers accept anything and break ties
//! deterministically; these checks point at the data that relies on it.

use crate::config::{Breakpoint, StageConfig};
use crate::subtitle::SubtitleTrack;

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    InvertedInterval { id: u32, start: f64, end: f64 },
    DuplicateId { id: u32 },
    /// Both windows contain some instant; `first` wins there.
    OverlappingWindows { first: u32, second: u32 },
    UnorderedBreakpoints { lower: Breakpoint, upper: Breakpoint },
    EmptyScaleRange { min: f64, max: f64 },
    AnimationPercent { name: &'static str, value: f64 },
    EaseNotEaseIn,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::InvertedInterval { id, start, end } => write!(
                f,
                "subtitle {} ends at {} but starts at {}",
                id, end, start
            ),
            Finding::DuplicateId { id } => write!(f, "subtitle id {} is used more than once", id),
            Finding::OverlappingWindows { first, second } => write!(
                f,
                "subtitles {} and {} overlap once the lead time is applied; {} wins",
                first, second, first
            ),
            Finding::UnorderedBreakpoints { lower, upper } => write!(
                f,
                "breakpoint {} has a threshold above {}",
                lower.name(),
                upper.name()
            ),
            Finding::EmptyScaleRange { min, max } => {
                write!(f, "scale range [{}, {}] is empty", min, max)
            }
            Finding::AnimationPercent { name, value } => write!(
                f,
                "animation.{} = {} is outside (0, 100]",
                name, value
            ),
            Finding::EaseNotEaseIn => write!(f, "ease_in does not start slowly"),
        }
    }
}

pub fn lint_track(track: &SubtitleTrack, lead_time: f64) -> Vec<Finding> {
    let intervals = track.intervals();
    let mut findings = Vec::new();

    let mut counts: HashMap<u32, usize> = HashMap::new();
    for interval in intervals {
        if interval.end_time <= interval.start_time {
            findings.push(Finding::InvertedInterval {
                id: interval.id,
                start: interval.start_time,
                end: interval.end_time,
            });
        }
        *counts.entry(interval.id).or_default() += 1;
    }

    let mut duplicates: Vec<u32> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(id, _)| id)
        .collect();
    duplicates.sort_unstable();
    findings.extend(duplicates.into_iter().map(|id| Finding::DuplicateId { id }));

    for (i, first) in intervals.iter().enumerate() {
        for second in &intervals[i + 1..] {
            let start = first
                .effective_start(lead_time)
                .max(second.effective_start(lead_time));
            let end = first.end_time.min(second.end_time);
            if start <= end {
                findings.push(Finding::OverlappingWindows {
                    first: first.id,
                    second: second.id,
                });
            }
        }
    }

    report(&findings);
    findings
}

pub fn lint_config(config: &StageConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    let ascending = [Breakpoint::Xs, Breakpoint::Sm, Breakpoint::Md, Breakpoint::Lg];
    for pair in ascending.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        if config.breakpoints.get(lower).min_width >= config.breakpoints.get(upper).min_width {
            findings.push(Finding::UnorderedBreakpoints { lower, upper });
        }
    }

    if config.scale.min >= config.scale.max {
        findings.push(Finding::EmptyScaleRange {
            min: config.scale.min,
            max: config.scale.max,
        });
    }

    for (name, value) in [
        ("mobile", config.animation.mobile),
        ("desktop", config.animation.desktop),
    ] {
        if !(value > 0.0 && value <= 100.0) {
            findings.push(Finding::AnimationPercent { name, value });
        }
    }

    if !config.ease_in.is_ease_in() {
        findings.push(Finding::EaseNotEaseIn);
    }

    report(&findings);
    findings
}

fn report(findings: &[Finding]) {
    for finding in findings {
        warn!("{}", finding);
    }
}
