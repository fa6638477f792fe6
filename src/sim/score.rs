//! Survival score

/// Accrue `rate` points per second over `dt`
pub fn advance(score: f32, dt: f32, rate: f32) -> f32 {
    score + rate * dt
}

/// Whole points, truncated toward zero
pub fn finalize(score: f32) -> u64 {
    if score.is_finite() && score > 0.0 {
        score.trunc() as u64
    } else {
        0
    }
}

/// Index of the milestone band the score sits in
pub fn milestone(score: f32, interval: f32) -> u32 {
    (score / interval).floor().max(0.0) as u32
}
