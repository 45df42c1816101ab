//! One-repetition-maximum estimation.
//!
//! Uses the Epley formula: `weight * (1 + reps / 30)`, rounded to one
//! decimal place. Rounding works on the exact binary value with ties going
//! to the even digit, so 26.25 becomes 26.2. No bounds are applied here.

/// Estimate the 1RM (kg) for a set of `reps` at `weight` kg
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> f64 {
    let raw = weight * (1.0 + f64::from(reps) / 30.0);
    round_to_tenth(raw)
}

fn round_to_tenth(value: f64) -> f64 {
    // The formatter rounds the exact value; scaling by 10 first would not
    format!("{:.1}", value).parse().unwrap_or(value)
}
