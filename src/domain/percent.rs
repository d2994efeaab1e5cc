//! Percentage arithmetic helpers.
//!
//! Both helpers are total: a zero denominator yields `None` rather than an
//! error, and callers treat the absent value as "no signal".

/// `part` as a percentage of `base`. `None` when `base` is zero.
pub fn calc_percent(base: f64, part: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    Some(part * 100.0 / base)
}

/// Percentage by which `value` sits below `reference`.
///
/// Returns `Some(0.0)` when the two are numerically equal and `None` when
/// `reference` is zero. A `value` above `reference` yields a negative
/// magnitude.
pub fn percent_diff(value: f64, reference: f64) -> Option<f64> {
    if value == reference {
        return Some(0.0);
    }
    calc_percent(reference, value).map(|p| 100.0 - p)
}
