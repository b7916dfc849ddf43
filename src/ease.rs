use serde::{Deserialize, Serialize};

/// Easing curves used by the transitions and the scroll timeline.
///
/// `InQuad`/`OutQuad` correspond to the "power2" family, the cubic variants to
/// "power3".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InCubic,
    OutCubic,
}

impl Default for Ease {
    fn default() -> Self {
        Self::Linear
    }
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = clamp01(t);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }

    /// True for curves whose early motion is strictly slower than linear,
    /// i.e. `apply(t) < t` on `(0, 1)`. `Linear` does not qualify.
    pub fn is_ease_in(self) -> bool {
        matches!(self, Self::InQuad | Self::InCubic)
    }
}

/// Exact at both `t = 0` and `t = 1`.
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from * (1.0 - t) + to * t
}

/// Clamps to `[0, 1]`, mapping NaN to zero.
pub fn clamp01(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}
