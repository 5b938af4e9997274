//! Performance metrics over a finalized value history.
//!
//! Pure functions with no internal state; identical inputs reproduce
//! identical figures bit for bit, which the persisted-record round-trip
//! contract relies on.

/// Annualized (geometric) return in percent.
///
/// `((final / start) ^ (365 / days) - 1) * 100`, with `days_held` counted
/// inclusive of the start day.
pub fn annualized_return(start_value: f64, final_value: f64, days_held: usize) -> f64 {
    ((final_value / start_value).powf(365.0 / days_held as f64) - 1.0) * 100.0
}

/// Volatility of a total-value history, in percent.
///
/// Sample standard deviation (n-1 denominator) of day-over-day percentage
/// changes. The first day has no prior-day change and is dropped. Histories
/// with fewer than two changes yield 0.
pub fn volatility(history: &[f64]) -> f64 {
    let changes = daily_changes(history);
    if changes.len() < 2 {
        return 0.0;
    }
    let n = changes.len() as f64;
    let mean = changes.iter().sum::<f64>() / n;
    let variance = changes.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

fn daily_changes(history: &[f64]) -> Vec<f64> {
    history
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect()
}
