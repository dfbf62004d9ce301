//! View/like ratio with additive smoothing for videos that have no likes.
//!
//! Without smoothing, a zero like count divides by zero and poisons the whole
//! vector; `(views + 1) / (likes + 1)` keeps the value finite while staying
//! close to the raw ratio for any realistic view count.

/// Smoothed view/like ratio, rounded to two decimal places.
pub fn smoothed_view_like_ratio(view_count: i64, like_count: i64) -> f64 {
    let ratio = if like_count == 0 {
        (view_count as f64 + 1.0) / (like_count as f64 + 1.0)
    } else {
        view_count as f64 / like_count as f64
    };
    round2(ratio)
}

/// Round half away from zero to two decimals.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
