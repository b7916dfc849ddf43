use crate::subtitle::{SubtitleInterval, SubtitleTrack};

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

/// Something that exposes a playback position, typically a video element.
///
/// `None` means the source is not attached or not yet readable.
pub trait TimeSource {
    fn current_time(&self) -> Option<f64>;
}

impl<T: TimeSource + ?Sized> TimeSource for Rc<T> {
    fn current_time(&self) -> Option<f64> {
        (**self).current_time()
    }
}

/// A playback clock advanced by hand, shared between the owner and readers.
#[derive(Debug, Default)]
pub struct ManualClock {
    time: Cell<Option<f64>>,
}

impl ManualClock {
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn at(time: f64) -> Self {
        Self {
            time: Cell::new(Some(time)),
        }
    }

    pub fn set(&self, time: f64) {
        self.time.set(Some(time));
    }
}

impl TimeSource for ManualClock {
    fn current_time(&self) -> Option<f64> {
        self.time.get().filter(|t| t.is_finite())
    }
}

/// Emitted when the active subtitle changes identity.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleChange {
    pub time: f64,
    pub previous: Option<u32>,
    pub current: Option<SubtitleInterval>,
}

impl SubtitleChange {
    pub fn current_id(&self) -> Option<u32> {
        self.current.as_ref().map(|s| s.id)
    }
}

/// Holds the active-subtitle state and turns per-frame samples into change
/// events.
///
/// Sampling is expected once per rendered frame. Consecutive samples that
/// resolve to the same interval id produce no event.
#[derive(Debug, Clone)]
pub struct SubtitleSync {
    track: SubtitleTrack,
    lead_time: f64,
    active: Option<SubtitleInterval>,
}

impl SubtitleSync {
    pub fn new(track: SubtitleTrack, lead_time: f64) -> Self {
        Self {
            track,
            lead_time,
            active: None,
        }
    }

    pub fn track(&self) -> &SubtitleTrack {
        &self.track
    }

    pub fn lead_time(&self) -> f64 {
        self.lead_time
    }

    pub fn active(&self) -> Option<&SubtitleInterval> {
        self.active.as_ref()
    }

    /// Reads the source once and resolves it. An unavailable source leaves
    /// the state untouched.
    pub fn sample<S: TimeSource + ?Sized>(&mut self, source: &S) -> Option<SubtitleChange> {
        match source.current_time() {
            Some(time) => self.update(time),
            None => {
                trace!("time source unavailable, skipping sample");
                None
            }
        }
    }

    pub fn update(&mut self, time: f64) -> Option<SubtitleChange> {
        let resolved = self.track.resolve(time, self.lead_time);
        let previous = self.active.as_ref().map(|s| s.id);
        if resolved.map(|s| s.id) == previous {
            return None;
        }

        let current = resolved.cloned();
        debug!(
            time,
            ?previous,
            current = ?current.as_ref().map(|s| s.id),
            "active subtitle changed"
        );
        self.active = current.clone();
        Some(SubtitleChange {
            time,
            previous,
            current,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync() -> SubtitleSync {
        SubtitleSync::new(
            SubtitleTrack::new(vec![
                SubtitleInterval::new(1, "a", "b", 8.0, 9.0),
                SubtitleInterval::new(2, "c", "d", 11.0, 13.0),
            ]),
            0.25,
        )
    }

    #[test]
    fn starts_with_nothing_active() {
        assert!(sync().active().is_none());
    }

    #[test]
    fn repeated_samples_emit_once() {
        let mut sync = sync();
        let change = sync.update(7.8).unwrap();
        assert_eq!(change.previous, None);
        assert_eq!(change.current_id(), Some(1));

        assert!(sync.update(7.8).is_none());
        assert!(sync.update(8.5).is_none());
        assert_eq!(sync.active().map(|s| s.id), Some(1));
    }

    #[test]
    fn none_to_none_is_silent() {
        let mut sync = sync();
        assert!(sync.update(0.0).is_none());
        assert!(sync.update(9.5).is_none());
    }

    #[test]
    fn leaving_an_interval_emits_none() {
        let mut sync = sync();
        sync.update(8.0);
        let change = sync.update(9.5).unwrap();
        assert_eq!(change.previous, Some(1));
        assert!(change.current.is_none());
    }

    #[test]
    fn looping_video_reenters_first_subtitle_once() {
        let mut sync = sync();
        let mut changes = Vec::new();
        let times = [7.9, 8.5, 9.5, 12.0, 14.0, 0.0, 7.9, 8.1];
        for t in times {
            if let Some(change) = sync.update(t) {
                changes.push(change.current_id());
            }
        }
        assert_eq!(changes, vec![Some(1), None, Some(2), None, Some(1)]);
    }

    #[test]
    fn direct_switch_between_intervals() {
        let mut sync = SubtitleSync::new(
            SubtitleTrack::new(vec![
                SubtitleInterval::new(3, "x", "", 15.5, 17.0),
                SubtitleInterval::new(4, "y", "", 17.1, 20.0),
            ]),
            0.25,
        );
        sync.update(16.0);
        let change = sync.update(17.05).unwrap();
        assert_eq!(change.previous, Some(3));
        assert_eq!(change.current_id(), Some(4));
    }

    #[test]
    fn unavailable_source_is_a_no_op() {
        let mut sync = sync();
        sync.update(8.0);

        let clock = ManualClock::detached();
        assert!(sync.sample(&clock).is_none());
        assert_eq!(sync.active().map(|s| s.id), Some(1));
    }

    #[test]
    fn shared_clock_drives_samples() {
        let clock = Rc::new(ManualClock::at(0.0));
        let mut sync = sync();
        assert!(sync.sample(&clock).is_none());

        clock.set(11.0);
        assert_eq!(sync.sample(&clock).and_then(|c| c.current_id()), Some(2));

        clock.set(f64::NAN);
        assert!(sync.sample(&clock).is_none());
    }
}
