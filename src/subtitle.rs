use serde::{Deserialize, Serialize};

/// One bilingual line of dialogue and the span of video time it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleInterval {
    pub id: u32,
    pub original_text: String,
    pub translated_text: String,
    /// Seconds.
    pub start_time: f64,
    /// Seconds, greater than `start_time` in well-formed data.
    pub end_time: f64,
}

impl SubtitleInterval {
    pub fn new(
        id: u32,
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            id,
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            start_time,
            end_time,
        }
    }

    /// Start of the activation window once the lead time is applied.
    pub fn effective_start(&self, lead_time: f64) -> f64 {
        self.start_time - lead_time
    }

    /// Inclusive on both ends.
    pub fn is_active_at(&self, current_time: f64, lead_time: f64) -> bool {
        self.effective_start(lead_time) <= current_time && current_time <= self.end_time
    }

    /// The rendered lines, original first.
    pub fn lines(&self) -> [&str; 2] {
        [&self.original_text, &self.translated_text]
    }
}

/// Returns the first interval, in sequence order, whose effective window
/// contains `current_time`.
///
/// When windows overlap the earlier-declared interval wins, regardless of
/// which one starts first.
pub fn resolve_active(
    current_time: f64,
    intervals: &[SubtitleInterval],
    lead_time: f64,
) -> Option<&SubtitleInterval> {
    intervals
        .iter()
        .find(|interval| interval.is_active_at(current_time, lead_time))
}

fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{FEFF}').unwrap_or(input)
}

/// An ordered, immutable list of subtitle intervals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtitleTrack {
    intervals: Vec<SubtitleInterval>,
}

impl SubtitleTrack {
    pub fn new(intervals: Vec<SubtitleInterval>) -> Self {
        Self { intervals }
    }

    pub fn intervals(&self) -> &[SubtitleInterval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn resolve(&self, current_time: f64, lead_time: f64) -> Option<&SubtitleInterval> {
        resolve_active(current_time, &self.intervals, lead_time)
    }

    /// Latest end time in the track, or zero when empty.
    pub fn duration(&self) -> f64 {
        self.intervals
            .iter()
            .map(|i| i.end_time)
            .fold(0.0, f64::max)
    }

    /// JSON tracks are a top-level array. A leading byte-order mark is
    /// skipped, as the SRT parser does.
    pub fn looks_like_json(input: &str) -> bool {
        strip_bom(input).trim_start().starts_with('[')
    }

    pub fn from_json(input: &str) -> crate::error::StageResult<Self> {
        Ok(serde_json::from_str(strip_bom(input))?)
    }

    pub fn to_json(&self) -> crate::error::StageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The scene shipped with the landing page.
    pub fn sample() -> Self {
        Self::new(vec![
            SubtitleInterval::new(
                1,
                "That I cannot do.",
                "Eso no lo puedo hacer.",
                8.0,
                9.0,
            ),
            SubtitleInterval::new(
                2,
                "I'll give you anything you ask.",
                "Te daré todo lo que me pidas.",
                11.0,
                13.0,
            ),
            SubtitleInterval::new(
                3,
                "We've known each other many years",
                "Nos conocemos desde hace muchos años",
                15.5,
                17.0,
            ),
            SubtitleInterval::new(
                4,
                "But this is the first time you ever came to me for counsel, for help.",
                "Pero esta es la primera vez que acudes a mí en busca de consejo y ayuda.",
                17.1,
                20.0,
            ),
        ])
    }
}
