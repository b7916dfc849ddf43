use std::time::Duration;

/// A single cue as it appears in an SRT file, before it is turned into a
/// [`SubtitleInterval`](crate::subtitle::SubtitleInterval).
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub(crate) sequence_number: Option<usize>,
    pub(crate) show_at: Duration,
    pub(crate) hide_at: Duration,
    pub(crate) text: Vec<String>,
}

impl Cue {
    pub fn new(show_at: Duration, hide_at: Duration, text: Vec<String>) -> Self {
        Self {
            sequence_number: None,
            show_at,
            hide_at,
            text,
        }
    }
}
