//! Enter/exit presentation for the subtitle lines.
//!
//! Every change replaces whatever transition is running ("last write wins");
//! nothing is queued. An exit starts from the lines' current visual state, an
//! enter always starts from the fixed off-screen pose.

use crate::ease::{lerp, Ease};
use crate::subtitle::SubtitleInterval;
use crate::sync::SubtitleChange;

use tracing::trace;

/// Number of rendered text lines: original and translation.
pub const LINE_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineState {
    /// Vertical displacement in pixels, positive is down.
    pub y: f64,
    pub opacity: f64,
    /// Blur radius in pixels.
    pub blur: f64,
}

impl LineState {
    pub const SHOWN: LineState = LineState {
        y: 0.0,
        opacity: 1.0,
        blur: 0.0,
    };

    pub const ENTER_FROM: LineState = LineState {
        y: 15.0,
        opacity: 0.0,
        blur: 4.0,
    };

    pub const EXIT_TO: LineState = LineState {
        y: -10.0,
        opacity: 0.0,
        blur: 4.0,
    };

    pub fn hidden() -> Self {
        Self::ENTER_FROM
    }

    fn lerp(&self, to: &LineState, t: f64) -> LineState {
        LineState {
            y: lerp(self.y, to.y, t),
            opacity: lerp(self.opacity, to.opacity, t),
            blur: lerp(self.blur, to.blur, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSpec {
    pub to: LineState,
    /// Seconds per line.
    pub duration: f64,
    /// Delay between consecutive lines, in seconds.
    pub stagger: f64,
    pub ease: Ease,
}

impl TransitionSpec {
    pub const ENTER: TransitionSpec = TransitionSpec {
        to: LineState::SHOWN,
        duration: 0.25,
        stagger: 0.05,
        ease: Ease::OutQuad,
    };

    pub const EXIT: TransitionSpec = TransitionSpec {
        to: LineState::EXIT_TO,
        duration: 0.2,
        stagger: 0.05,
        ease: Ease::InQuad,
    };

    pub fn total_duration(&self) -> f64 {
        self.duration + self.stagger * (LINE_COUNT - 1) as f64
    }

    fn line_progress(&self, line: usize, elapsed: f64) -> f64 {
        let local = elapsed - self.stagger * line as f64;
        if self.duration <= 0.0 {
            return if local >= 0.0 { 1.0 } else { 0.0 };
        }
        self.ease.apply(local / self.duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Entering,
    Exiting,
}

#[derive(Debug, Clone)]
struct Running {
    phase: Phase,
    spec: TransitionSpec,
    origins: [LineState; LINE_COUNT],
    elapsed: f64,
}

/// Drives the visual state of the subtitle lines from change events.
#[derive(Debug, Clone)]
pub struct Transitioner {
    enter: TransitionSpec,
    exit: TransitionSpec,
    lines: [LineState; LINE_COUNT],
    shown: Option<SubtitleInterval>,
    running: Option<Running>,
}

impl Default for Transitioner {
    fn default() -> Self {
        Self::new(TransitionSpec::ENTER, TransitionSpec::EXIT)
    }
}

impl Transitioner {
    pub fn new(enter: TransitionSpec, exit: TransitionSpec) -> Self {
        Self {
            enter,
            exit,
            lines: [LineState::hidden(); LINE_COUNT],
            shown: None,
            running: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.running.as_ref().map_or(Phase::Idle, |r| r.phase)
    }

    pub fn lines(&self) -> &[LineState; LINE_COUNT] {
        &self.lines
    }

    /// The interval whose text is on screen. Kept through an exit so the
    /// fading lines still have something to show.
    pub fn shown(&self) -> Option<&SubtitleInterval> {
        self.shown.as_ref()
    }

    pub fn apply(&mut self, change: &SubtitleChange) {
        match &change.current {
            Some(interval) => {
                self.shown = Some(interval.clone());
                self.lines = [LineState::ENTER_FROM; LINE_COUNT];
                self.start(Phase::Entering, self.enter);
            }
            None => self.start(Phase::Exiting, self.exit),
        }
    }

    fn start(&mut self, phase: Phase, spec: TransitionSpec) {
        if let Some(prev) = &self.running {
            trace!(from = ?prev.phase, to = ?phase, "overwriting running transition");
        }
        self.running = Some(Running {
            phase,
            spec,
            origins: self.lines,
            elapsed: 0.0,
        });
    }

    /// Advances the running transition by `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        let running = match self.running.as_mut() {
            Some(running) => running,
            None => return,
        };
        running.elapsed += dt.max(0.0);

        for (line, state) in self.lines.iter_mut().enumerate() {
            let t = running.spec.line_progress(line, running.elapsed);
            *state = running.origins[line].lerp(&running.spec.to, t);
        }

        if running.elapsed >= running.spec.total_duration() {
            if running.phase == Phase::Exiting {
                self.shown = None;
            }
            self.running = None;
        }
    }
}
