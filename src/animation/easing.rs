//! Easing functions for the roulette spin.
//!
//! An easing function remaps linear time `t` in `[0, 1]` to eased progress in
//! `[0, 1]`. Every curve here is pure, monotonically non-decreasing, and maps
//! `0 -> 0` and `1 -> 1`.

/// Easing curve variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// Quintic ease-in-out: slow start, fast middle, long deceleration.
    /// Formula: `16t⁵` for `t < 0.5`, else `1 - (2 - 2t)⁵ / 2`.
    QuinticInOut,
}

impl EasingFunction {
    /// Default easing function used by the roulette.
    pub const DEFAULT: EasingFunction = EasingFunction::QuinticInOut;

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0].
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::QuinticInOut => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
        }
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}
