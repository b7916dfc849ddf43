use crate::ease::Ease;
use crate::error::{StageError, StageResult};

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seconds by which a subtitle is activated ahead of its nominal start.
pub const DEFAULT_LEAD_TIME: f64 = 0.25;
/// Share of the viewport width the reference element is fitted into.
pub const DEFAULT_VIEWPORT_FIT: f64 = 0.9;

/// Static configuration shared by both resolvers. Built once at startup and
/// passed in by reference; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfig {
    pub lead_time: f64,
    pub viewport_fit: f64,
    pub ease_in: Ease,
    pub scale: ScaleBounds,
    pub animation: AnimationLength,
    pub breakpoints: BreakpointTable,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            lead_time: DEFAULT_LEAD_TIME,
            viewport_fit: DEFAULT_VIEWPORT_FIT,
            ease_in: Ease::InQuad,
            scale: ScaleBounds::default(),
            animation: AnimationLength::default(),
            breakpoints: BreakpointTable::default(),
        }
    }
}

impl StageConfig {
    pub fn from_toml_str(input: &str) -> StageResult<Self> {
        let config: Self = toml::from_str(input)?;
        config.check()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> StageResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading stage config");
        let data = std::fs::read_to_string(path)?;
        Self::from_toml_str(&data)
    }

    /// Rejects values the resolvers cannot work with at all. Softer authoring
    /// problems (unordered breakpoints, odd percentages) are left to the lint.
    fn check(&self) -> StageResult<()> {
        if !self.lead_time.is_finite() || self.lead_time < 0.0 {
            return Err(StageError::config("lead_time must be a non-negative number"));
        }
        if !self.viewport_fit.is_finite() || self.viewport_fit <= 0.0 {
            return Err(StageError::config("viewport_fit must be positive"));
        }
        if !self.scale.min.is_finite() || !self.scale.max.is_finite() {
            return Err(StageError::config("scale bounds must be finite"));
        }
        if self.scale.min > self.scale.max {
            return Err(StageError::config("scale.min must not exceed scale.max"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self { min: 0.25, max: 0.5 }
    }
}

impl ScaleBounds {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.max(self.min).min(self.max)
    }

    /// Where `scale` sits between the bounds, in `[0, 1]`. Degenerate bounds
    /// count as fully shrunk.
    pub fn progress(&self, scale: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 1.0;
        }
        crate::ease::clamp01((scale - self.min) / span)
    }
}

/// Scroll percentage at which the pinned section releases, per layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationLength {
    pub mobile: f64,
    pub desktop: f64,
}

impl Default for AnimationLength {
    fn default() -> Self {
        Self {
            mobile: 80.0,
            desktop: 100.0,
        }
    }
}

impl AnimationLength {
    pub fn end_percent(&self, is_mobile: bool) -> f64 {
        if is_mobile {
            self.mobile
        } else {
            self.desktop
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
}

impl Breakpoint {
    /// Largest first, the order thresholds are compared in.
    pub const DESCENDING: [Breakpoint; 4] =
        [Breakpoint::Lg, Breakpoint::Md, Breakpoint::Sm, Breakpoint::Xs];

    pub fn name(self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakpointSpec {
    pub min_width: u32,
    #[serde(default)]
    pub offset: f64,
}

impl BreakpointSpec {
    pub const fn new(min_width: u32, offset: f64) -> Self {
        Self { min_width, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BreakpointTable {
    pub xs: BreakpointSpec,
    pub sm: BreakpointSpec,
    pub md: BreakpointSpec,
    pub lg: BreakpointSpec,
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self {
            xs: BreakpointSpec::new(0, 0.0),
            sm: BreakpointSpec::new(640, 0.0),
            md: BreakpointSpec::new(768, 0.0),
            lg: BreakpointSpec::new(1024, 0.0),
        }
    }
}

impl BreakpointTable {
    pub fn get(&self, breakpoint: Breakpoint) -> &BreakpointSpec {
        match breakpoint {
            Breakpoint::Xs => &self.xs,
            Breakpoint::Sm => &self.sm,
            Breakpoint::Md => &self.md,
            Breakpoint::Lg => &self.lg,
        }
    }

    pub fn offset(&self, breakpoint: Breakpoint) -> f64 {
        self.get(breakpoint).offset
    }

    /// Highest breakpoint whose threshold is reached, falling back to `xs`.
    /// Thresholds are compared largest first, so a non-ascending table still
    /// resolves deterministically.
    pub fn active(&self, width: u32) -> Breakpoint {
        Breakpoint::DESCENDING
            .iter()
            .copied()
            .find(|bp| width >= self.get(*bp).min_width)
            .unwrap_or(Breakpoint::Xs)
    }

    pub fn is_mobile(&self, width: u32) -> bool {
        width < self.md.min_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_active_breakpoint {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (width, expected) = $value;

                let table = BreakpointTable::default();

                assert_eq!(table.active(width), expected);
            }
        )*
        }
    }

    test_active_breakpoint! {
        test_active_bp_0: (0, Breakpoint::Xs),
        test_active_bp_1: (639, Breakpoint::Xs),
        test_active_bp_2: (640, Breakpoint::Sm),
        test_active_bp_3: (767, Breakpoint::Sm),
        test_active_bp_4: (768, Breakpoint::Md),
        test_active_bp_5: (1023, Breakpoint::Md),
        test_active_bp_6: (1024, Breakpoint::Lg),
        test_active_bp_7: (3840, Breakpoint::Lg),
    }

    #[test]
    fn mobile_is_below_md() {
        let table = BreakpointTable::default();
        assert!(table.is_mobile(767));
        assert!(!table.is_mobile(768));
    }

    #[test]
    fn unordered_table_falls_back_to_first_match_from_top() {
        let mut table = BreakpointTable::default();
        table.sm.min_width = 2000;
        assert_eq!(table.active(1500), Breakpoint::Lg);
        assert_eq!(table.active(700), Breakpoint::Xs);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = StageConfig::from_toml_str("").unwrap();
        assert_eq!(config, StageConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_fields() {
        let config = StageConfig::from_toml_str(
            r#"
            lead_time = 0.5

            [scale]
            min = 0.3
            max = 0.6

            [breakpoints.xs]
            min_width = 0
            offset = 40.0

            [breakpoints.sm]
            min_width = 640

            [breakpoints.md]
            min_width = 768
            offset = 20.0

            [breakpoints.lg]
            min_width = 1024
            offset = -10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.lead_time, 0.5);
        assert_eq!(config.scale, ScaleBounds { min: 0.3, max: 0.6 });
        assert_eq!(config.breakpoints.offset(Breakpoint::Xs), 40.0);
        assert_eq!(config.breakpoints.offset(Breakpoint::Sm), 0.0);
        assert_eq!(config.breakpoints.offset(Breakpoint::Lg), -10.0);
        assert_eq!(config.animation, AnimationLength::default());
        assert_eq!(config.ease_in, Ease::InQuad);
    }

    #[test]
    fn demo_config_loads() {
        let config = StageConfig::from_toml_str(include_str!("../demos/stage.toml")).unwrap();
        assert_eq!(config.breakpoints.offset(Breakpoint::Xs), 60.0);
        assert_eq!(config.breakpoints.lg.min_width, 1024);
    }

    #[test]
    fn inverted_scale_bounds_are_rejected() {
        let err = StageConfig::from_toml_str("[scale]\nmin = 0.6\nmax = 0.2\n").unwrap_err();
        assert!(matches!(err, StageError::Config(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = StageConfig::from_toml_str("lead = 1.0\n").unwrap_err();
        assert!(matches!(err, StageError::Config(_)));
    }

    #[test]
    fn scale_progress_is_normalised() {
        let bounds = ScaleBounds::default();
        assert_eq!(bounds.progress(0.25), 0.0);
        assert_eq!(bounds.progress(0.5), 1.0);
        assert!((bounds.progress(0.375) - 0.5).abs() < 1e-12);
        assert_eq!(ScaleBounds { min: 0.5, max: 0.5 }.progress(0.5), 1.0);
    }
}
