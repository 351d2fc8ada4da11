// `f64::{floor, ceil, round}` live in std; these keep `no_std` builds working. Inputs are pixel
// offsets and item counts, well inside `i64` range.

pub(crate) fn floor(v: f64) -> f64 {
    let t = v as i64 as f64;
    if t > v { t - 1.0 } else { t }
}

pub(crate) fn ceil(v: f64) -> f64 {
    let t = v as i64 as f64;
    if t < v { t + 1.0 } else { t }
}

pub(crate) fn round(v: f64) -> f64 {
    floor(v + 0.5)
}

pub(crate) fn abs(v: f64) -> f64 {
    if v < 0.0 { -v } else { v }
}

/// Rounds to two decimals, absorbing sub-pixel noise in DOM measurements.
pub(crate) fn round_to(v: f64) -> f64 {
    round(v * 100.0) / 100.0
}
