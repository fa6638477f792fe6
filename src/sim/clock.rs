//! Frame-time source
//!
//! Turns display-refresh timestamps (milliseconds) into bounded per-tick delta
//! times. The anchor is dropped on reset so the first frame after a pause
//! measures nothing instead of the whole paused interval.

/// Delta-time source fed by frame timestamps
#[derive(Debug, Clone)]
pub struct TimeSource {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl TimeSource {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Forget the reference timestamp; the next sample re-anchors
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn is_anchored(&self) -> bool {
        self.last_ms.is_some()
    }

    /// Seconds since the previous sample, clamped to `max_dt`.
    ///
    /// Returns `Some(0.0)` on the anchoring sample and `None` when the clock
    /// ran backwards or produced a non-finite value; the anchor is re-taken in
    /// both cases.
    pub fn sample(&mut self, now_ms: f64) -> Option<f32> {
        if !now_ms.is_finite() {
            self.last_ms = None;
            return None;
        }

        let Some(last) = self.last_ms.replace(now_ms) else {
            return Some(0.0);
        };

        let dt = ((now_ms - last) / 1000.0) as f32;
        if dt < 0.0 {
            log::warn!("Frame clock went backwards by {:.1}ms", (last - now_ms));
            return None;
        }
        Some(dt.min(self.max_dt))
    }
}
