use serde::Serialize;

use crate::thermal::Thermal;

/// Contiguous run of thermals with the highest summed points
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WindowResult {
    pub points: f64,
    /// Indices into the thermal list the search ran over
    pub first_thermal_index: usize,
    pub last_thermal_index: usize,
    pub start_time: f64,
    pub end_time: f64,
}

/// Maximum-score run of consecutive thermals spanning at most `max_span_secs`.
///
/// `thermals` must be ordered by start time. Every pair `i <= j` is checked;
/// the span is `end_time[j] - start_time[i]` and ties keep the first pair in
/// (i, j) scan order. Returns `None` when no thermal fits the budget.
pub fn best_window(thermals: &[Thermal], max_span_secs: f64) -> Option<WindowResult> {
    let mut best: Option<WindowResult> = None;

    for i in 0..thermals.len() {
        for j in i..thermals.len() {
            let span = thermals[j].end_time - thermals[i].start_time;
            if span > max_span_secs {
                continue;
            }
            let points: f64 = thermals[i..=j].iter().map(|t| t.points).sum();
            if best.map_or(true, |b| points > b.points) {
                best = Some(WindowResult {
                    points,
                    first_thermal_index: i,
                    last_thermal_index: j,
                    start_time: thermals[i].start_time,
                    end_time: thermals[j].end_time,
                });
            }
        }
    }

    best
}

/// Strongest single thermal; the earliest wins on equal points
pub fn strongest(thermals: &[Thermal]) -> Option<Thermal> {
    thermals
        .iter()
        .copied()
        .reduce(|best, t| if t.points > best.points { t } else { best })
}
