//! Penalty adjustment for repeated tries.
//!
//! Each try already consumed deducts a fixed fraction from the raw grade,
//! clamped at zero. The tries-left value must be the one read *before*
//! the current submission consumes a try, so the first try carries no
//! penalty.

/// `max(0, raw - (total_tries - tries_left) * penalty_per_try)`.
pub fn adjusted_fraction(raw: f64, total_tries: u32, tries_left: u32, penalty_per_try: f64) -> f64 {
    let used = total_tries.saturating_sub(tries_left);
    (raw - used as f64 * penalty_per_try).max(0.0)
}
