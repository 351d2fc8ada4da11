/// Progress curve of a smooth scroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    #[default]
    SmoothStep,
    EaseInOutCubic,
}

impl Easing {
    /// Maps `t` in `[0, 1]` to eased progress in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
            Self::EaseInOutCubic if t < 0.5 => 4.0 * t * t * t,
            Self::EaseInOutCubic => {
                let u = 2.0 - 2.0 * t;
                1.0 - u * u * u / 2.0
            }
        }
    }
}

/// A scroll offset animated from `from` to `to` over `duration_ms`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollTween {
    pub from: f64,
    pub to: f64,
    pub started_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl ScrollTween {
    /// A zero duration is treated as one millisecond.
    pub fn new(from: f64, to: f64, started_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            from,
            to,
            started_ms,
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    fn progress(&self, now_ms: u64) -> f64 {
        let elapsed = now_ms.saturating_sub(self.started_ms) as f64;
        (elapsed / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now_ms: u64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// The offset at `now_ms`, never negative.
    pub fn offset_at(&self, now_ms: u64) -> f64 {
        let eased = self.easing.apply(self.progress(now_ms));
        (self.from + (self.to - self.from) * eased).max(0.0)
    }

    /// Continues from the current offset towards a new target.
    pub fn redirect(&mut self, now_ms: u64, to: f64, duration_ms: u64) {
        *self = Self::new(self.offset_at(now_ms), to, now_ms, duration_ms, self.easing);
    }
}
