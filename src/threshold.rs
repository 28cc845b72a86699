use crate::history::History;

pub const AVERAGING_WINDOW: usize = 50; // Baseline averaged over history[1..AVERAGING_WINDOW]
pub const THRESHOLD_OFFSET: u32 = 1024; // Trigger level above the baseline

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Baseline {
    pub average: u32,
    pub threshold: u32,
}

/// Noise floor estimate from the samples just behind the newest one.
///
/// The sum excludes index 0 but still divides by the full window, and the
/// division happens before the doubling. During warm-up the zero-filled
/// history pulls the threshold down towards `THRESHOLD_OFFSET`.
pub fn recompute(history: &History) -> Baseline {
    let sum = history.as_slice()[1..AVERAGING_WINDOW]
        .iter()
        .map(|&s| s as u32)
        .sum::<u32>();
    let average = sum / AVERAGING_WINDOW as u32 * 2;
    Baseline {
        average,
        threshold: average + THRESHOLD_OFFSET,
    }
}
