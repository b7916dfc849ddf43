//! The pinned hero timeline scrubbed by scroll progress.
//!
//! Three tweens of equal length play back to back: the hero text fades out,
//! the phone shrinks from its start pose into the resolved end transform, then
//! the subtitle layer fades in.

use crate::ease::{clamp01, lerp, Ease};
use crate::transform::{TransformResolver, TransformResult, Viewport};

use tracing::debug;

/// Visual state of the phone mockup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhonePose {
    pub scale: f64,
    pub y: f64,
    pub brightness: f64,
}

impl PhonePose {
    pub const START: PhonePose = PhonePose {
        scale: 1.6,
        y: -20.0,
        brightness: 0.2,
    };

    fn settled(end: TransformResult) -> Self {
        Self {
            scale: end.scale,
            y: end.vertical_offset,
            brightness: 1.0,
        }
    }

    fn lerp(&self, to: &PhonePose, t: f64) -> PhonePose {
        PhonePose {
            scale: lerp(self.scale, to.scale, t),
            y: lerp(self.y, to.y, t),
            brightness: lerp(self.brightness, to.brightness, t),
        }
    }
}

/// Everything the scroll region drives at one progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroFrame {
    pub hero_text_opacity: f64,
    pub phone: PhonePose,
    pub subtitle_opacity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    HeroText,
    Phone,
    Subtitles,
}

impl Segment {
    const COUNT: f64 = 3.0;

    fn index(self) -> f64 {
        match self {
            Segment::HeroText => 0.0,
            Segment::Phone => 1.0,
            Segment::Subtitles => 2.0,
        }
    }

    /// Local progress of this segment at overall `progress`.
    fn local(self, progress: f64) -> f64 {
        clamp01(progress * Self::COUNT - self.index())
    }
}

#[derive(Debug)]
pub struct ScrollTimeline {
    resolver: TransformResolver,
    ease: Ease,
    viewport: Option<Viewport>,
    base_width: f64,
    end: Option<TransformResult>,
}

impl ScrollTimeline {
    pub fn new(resolver: TransformResolver) -> Self {
        Self {
            resolver,
            ease: Ease::OutQuad,
            viewport: None,
            base_width: 0.0,
            end: None,
        }
    }

    /// Records a new viewport size. A change invalidates the cached end
    /// transform.
    pub fn resize(&mut self, viewport: Viewport) {
        if self.viewport != Some(viewport) {
            debug!(width = viewport.width, height = viewport.height, "viewport resized");
            self.viewport = Some(viewport);
            self.invalidate();
        }
    }

    /// Records a new measurement of the reference element.
    pub fn measure(&mut self, base_width: f64) {
        if self.base_width != base_width {
            self.base_width = base_width;
            self.invalidate();
        }
    }

    pub fn invalidate(&mut self) {
        self.end = None;
    }

    /// The end transform, recomputed only after an invalidation.
    pub fn end_transform(&mut self) -> TransformResult {
        if let Some(end) = self.end {
            return end;
        }
        let end = match self.viewport {
            Some(viewport) => self.resolver.resolve(viewport, self.base_width),
            None => self.resolver.fallback(),
        };
        self.end = Some(end);
        end
    }

    pub fn frame_at(&mut self, progress: f64) -> HeroFrame {
        let progress = clamp01(progress);
        let end = PhonePose::settled(self.end_transform());

        let text = self.ease.apply(Segment::HeroText.local(progress));
        let phone = self.ease.apply(Segment::Phone.local(progress));
        let subtitles = self.ease.apply(Segment::Subtitles.local(progress));

        HeroFrame {
            hero_text_opacity: lerp(1.0, 0.0, text),
            phone: PhonePose::START.lerp(&end, phone),
            subtitle_opacity: lerp(0.0, 1.0, subtitles),
        }
    }
}
