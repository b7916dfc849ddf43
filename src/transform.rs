use crate::config::{Breakpoint, StageConfig};
use crate::ease::lerp;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Viewport size in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// End-state transform of the pinned phone mockup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub scale: f64,
    /// Pixels, positive is down.
    pub vertical_offset: f64,
}

/// Every intermediate value of one resolution, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformTrace {
    pub breakpoint: Breakpoint,
    pub is_mobile: bool,
    pub fit_scale: f64,
    pub target_offset: f64,
    pub eased_progress: f64,
    pub result: TransformResult,
}

/// Computes the end transform of the scroll-pinned phone from the viewport
/// and the measured width of the reference element.
#[derive(Debug, Clone)]
pub struct TransformResolver {
    config: StageConfig,
}

impl TransformResolver {
    pub fn new(config: StageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Used whenever there is nothing measured to fit against.
    pub fn fallback(&self) -> TransformResult {
        TransformResult {
            scale: self.config.scale.max,
            vertical_offset: 0.0,
        }
    }

    pub fn resolve(&self, viewport: Viewport, base_width: f64) -> TransformResult {
        match self.resolve_traced(viewport, base_width) {
            Some(trace) => trace.result,
            None => {
                warn!(
                    width = viewport.width,
                    base_width, "reference element not measured, using default transform"
                );
                self.fallback()
            }
        }
    }

    /// Returns `None` when the viewport or the reference width is unusable.
    pub fn resolve_traced(&self, viewport: Viewport, base_width: f64) -> Option<TransformTrace> {
        if viewport.width == 0 || !base_width.is_finite() || base_width <= 0.0 {
            return None;
        }
        let config = &self.config;
        let breakpoints = &config.breakpoints;
        let width = f64::from(viewport.width);

        let breakpoint = breakpoints.active(viewport.width);
        let is_mobile = breakpoints.is_mobile(viewport.width);

        let fit_scale = width * config.viewport_fit / base_width;
        let final_scale = config.scale.clamp(fit_scale);

        let anim_gap = (100.0 - config.animation.end_percent(is_mobile)) / 100.0;
        let center_compensation = f64::from(viewport.height) * anim_gap;
        let target_offset = center_compensation + breakpoints.offset(breakpoint);

        let progress = config.scale.progress(final_scale);
        let eased_progress = config.ease_in.apply(progress);

        let vertical_offset = if is_mobile {
            lerp(
                target_offset,
                breakpoints.offset(Breakpoint::Lg),
                eased_progress,
            )
        } else {
            target_offset
        };

        trace!(
            bp = breakpoint.name(),
            is_mobile,
            fit_scale,
            final_scale,
            target_offset,
            vertical_offset,
            "resolved transform"
        );

        Some(TransformTrace {
            breakpoint,
            is_mobile,
            fit_scale,
            target_offset,
            eased_progress,
            result: TransformResult {
                scale: final_scale,
                vertical_offset,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BreakpointSpec;

    fn config() -> StageConfig {
        let mut config = StageConfig::default();
        config.breakpoints.xs = BreakpointSpec::new(0, 60.0);
        config.breakpoints.sm = BreakpointSpec::new(640, 40.0);
        config.breakpoints.md = BreakpointSpec::new(768, 20.0);
        config.breakpoints.lg = BreakpointSpec::new(1024, -10.0);
        config
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn lg_threshold_is_desktop_without_interpolation() {
        let resolver = TransformResolver::new(config());
        let trace = resolver
            .resolve_traced(Viewport::new(1024, 900), 4000.0)
            .unwrap();

        assert_eq!(trace.breakpoint, Breakpoint::Lg);
        assert!(!trace.is_mobile);
        // Desktop ends at 100 %, so there is no compensation.
        assert!(close(trace.target_offset, -10.0));
        assert!(close(trace.result.vertical_offset, trace.target_offset));
    }

    #[test]
    fn narrow_mobile_fully_shrunk_lands_on_lg_offset() {
        let resolver = TransformResolver::new(config());
        let trace = resolver
            .resolve_traced(Viewport::new(500, 800), 800.0)
            .unwrap();

        assert!(close(trace.fit_scale, 0.5625));
        assert!(close(trace.result.scale, 0.5));
        assert!(close(trace.eased_progress, 1.0));
        assert_eq!(trace.breakpoint, Breakpoint::Xs);
        assert!(trace.is_mobile);
        // 800 * (100 - 80) / 100 + 60
        assert!(close(trace.target_offset, 220.0));
        assert!(close(trace.result.vertical_offset, -10.0));
    }

    #[test]
    fn mobile_at_min_scale_keeps_target_offset() {
        let resolver = TransformResolver::new(config());
        let result = resolver.resolve(Viewport::new(700, 1000), 10_000.0);

        assert!(close(result.scale, 0.25));
        // sm offset plus 20 % of the height, no pull toward lg.
        assert!(close(result.vertical_offset, 240.0));
    }

    #[test]
    fn mobile_midway_uses_eased_progress() {
        let resolver = TransformResolver::new(config());
        // 600 * 0.9 / 1440 = 0.375, halfway between the bounds.
        let trace = resolver
            .resolve_traced(Viewport::new(600, 1000), 1440.0)
            .unwrap();

        assert!(close(trace.result.scale, 0.375));
        assert!(close(trace.eased_progress, 0.25));
        // lerp(260, -10, 0.25)
        assert!(close(trace.result.vertical_offset, 192.5));
    }

    #[test]
    fn breakpoint_thresholds_are_inclusive() {
        let resolver = TransformResolver::new(config());
        for (width, expected) in [
            (639, Breakpoint::Xs),
            (640, Breakpoint::Sm),
            (768, Breakpoint::Md),
            (1024, Breakpoint::Lg),
        ] {
            let trace = resolver
                .resolve_traced(Viewport::new(width, 800), 1000.0)
                .unwrap();
            assert_eq!(trace.breakpoint, expected, "width {}", width);
        }
    }

    #[test]
    fn scale_stays_within_bounds() {
        let resolver = TransformResolver::new(config());
        for width in (1..4000).step_by(7) {
            for base in [1.0, 100.0, 800.0, 2400.0, 1e6] {
                let result = resolver.resolve(Viewport::new(width, 900), base);
                assert!(
                    (0.25..=0.5).contains(&result.scale),
                    "scale {} at width {} base {}",
                    result.scale,
                    width,
                    base
                );
            }
        }
    }

    #[test]
    fn unmeasured_inputs_fall_back() {
        let resolver = TransformResolver::new(config());
        let fallback = TransformResult {
            scale: 0.5,
            vertical_offset: 0.0,
        };

        assert_eq!(resolver.resolve(Viewport::new(0, 800), 800.0), fallback);
        assert_eq!(resolver.resolve(Viewport::new(500, 800), 0.0), fallback);
        assert_eq!(resolver.resolve(Viewport::new(500, 800), f64::NAN), fallback);
        assert!(resolver
            .resolve_traced(Viewport::new(500, 800), -3.0)
            .is_none());
    }
}
