//! Wires the resolvers to their drivers.
//!
//! The subtitle view listens to the frame ticker and the hero timeline to the
//! scroll driver. Each attachment hands back a [`Subscription`]; dropping it
//! stops further callbacks.

use crate::driver::{Frame, FrameTicker, ScrollDriver, ScrollSample, Subscription};
use crate::subtitle::SubtitleTrack;
use crate::sync::{SubtitleChange, SubtitleSync, TimeSource};
use crate::timeline::{HeroFrame, ScrollTimeline};
use crate::transition::Transitioner;

use std::cell::RefCell;
use std::rc::Rc;

/// Subtitle state plus the transitions presenting it.
#[derive(Debug, Clone)]
pub struct SubtitleView {
    sync: SubtitleSync,
    transitions: Transitioner,
}

impl SubtitleView {
    pub fn new(track: SubtitleTrack, lead_time: f64) -> Self {
        Self {
            sync: SubtitleSync::new(track, lead_time),
            transitions: Transitioner::default(),
        }
    }

    pub fn sync(&self) -> &SubtitleSync {
        &self.sync
    }

    pub fn transitions(&self) -> &Transitioner {
        &self.transitions
    }

    /// One frame: advance the running transition, then sample the source.
    /// A change starts its transition from zero elapsed time.
    pub fn on_frame<S: TimeSource + ?Sized>(
        &mut self,
        source: &S,
        frame: &Frame,
    ) -> Option<SubtitleChange> {
        self.transitions.advance(frame.delta);
        let change = self.sync.sample(source)?;
        self.transitions.apply(&change);
        Some(change)
    }
}

pub fn attach_subtitles<S, F>(
    ticker: &FrameTicker,
    view: Rc<RefCell<SubtitleView>>,
    source: S,
    mut on_change: F,
) -> Subscription
where
    S: TimeSource + 'static,
    F: FnMut(&SubtitleChange) + 'static,
{
    ticker.subscribe(move |frame| {
        let change = view.borrow_mut().on_frame(&source, frame);
        if let Some(change) = change {
            on_change(&change);
        }
    })
}

pub fn attach_timeline<F>(
    driver: &ScrollDriver,
    timeline: Rc<RefCell<ScrollTimeline>>,
    mut on_frame: F,
) -> Subscription
where
    F: FnMut(&HeroFrame) + 'static,
{
    driver.subscribe(move |sample: &ScrollSample| {
        let frame = {
            let mut timeline = timeline.borrow_mut();
            timeline.resize(sample.viewport);
            timeline.frame_at(sample.progress)
        };
        on_frame(&frame);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;
    use crate::sync::ManualClock;
    use crate::transform::{TransformResolver, Viewport};
    use crate::transition::Phase;

    fn frame(time: f64) -> Frame {
        Frame {
            time,
            delta: 1.0 / 60.0,
        }
    }

    #[test]
    fn ticker_drives_subtitle_changes() {
        let ticker = FrameTicker::new();
        let clock = Rc::new(ManualClock::at(0.0));
        let view = Rc::new(RefCell::new(SubtitleView::new(SubtitleTrack::sample(), 0.25)));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sub = {
            let seen = Rc::clone(&seen);
            attach_subtitles(&ticker, Rc::clone(&view), Rc::clone(&clock), move |c| {
                seen.borrow_mut().push(c.current_id())
            })
        };

        for t in [7.0, 7.8, 8.5, 9.5, 10.8] {
            clock.set(t);
            ticker.emit(&frame(t));
        }
        assert_eq!(*seen.borrow(), vec![Some(1), None, Some(2)]);
        assert_eq!(view.borrow().transitions().phase(), Phase::Entering);

        drop(sub);
        clock.set(15.4);
        ticker.emit(&frame(15.4));
        assert_eq!(seen.borrow().len(), 3);
        assert_eq!(view.borrow().sync().active().map(|s| s.id), Some(2));
    }

    #[test]
    fn detached_clock_produces_nothing() {
        let ticker = FrameTicker::new();
        let view = Rc::new(RefCell::new(SubtitleView::new(SubtitleTrack::sample(), 0.25)));
        let count = Rc::new(RefCell::new(0));

        let _sub = {
            let count = Rc::clone(&count);
            attach_subtitles(&ticker, view, ManualClock::detached(), move |_| {
                *count.borrow_mut() += 1
            })
        };
        ticker.emit(&frame(8.0));
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn scroll_driver_feeds_timeline() {
        let driver = ScrollDriver::new();
        let mut timeline = ScrollTimeline::new(TransformResolver::new(StageConfig::default()));
        timeline.measure(2000.0);
        let timeline = Rc::new(RefCell::new(timeline));
        let last = Rc::new(RefCell::new(None));

        let _sub = {
            let last = Rc::clone(&last);
            attach_timeline(&driver, timeline, move |f| *last.borrow_mut() = Some(*f))
        };
        driver.emit(&ScrollSample {
            progress: 1.0,
            viewport: Viewport::new(1280, 800),
        });

        let frame = last.borrow().unwrap();
        assert_eq!(frame.phone.scale, 0.5);
        assert_eq!(frame.subtitle_opacity, 1.0);
    }
}
