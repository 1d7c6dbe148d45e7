use serde::Serialize;

use crate::config::ScoringMode;
use crate::error::ScoreResult;
use crate::thermal::Thermal;
use crate::trace::Trace;

/// Index range of a detected climbing turn.
///
/// `end_index` is the first sample after the run and the boundary sample used
/// for scoring, so `start_index < end_index < trace.len()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ThermalCandidate {
    pub start_index: usize,
    pub end_index: usize,
}

impl ThermalCandidate {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }
}

/// Hysteresis run detection over the smoothed turn rate.
///
/// A run starts at the first sample with |rate| >= threshold and ends at the
/// first sample failing the test. Samples without a smoothed value fail.
pub fn find_turn_runs(trace: &Trace, threshold: f64) -> Vec<ThermalCandidate> {
    let samples = trace.samples();
    let n = samples.len();
    let circling = |i: usize| {
        samples[i]
            .smoothed_turn_rate
            .map(|rate| rate.abs() >= threshold)
            .unwrap_or(false)
    };

    let mut runs = Vec::new();
    let mut i = 0;
    while i < n {
        if !circling(i) {
            i += 1;
            continue;
        }
        let begin = i;
        while i < n && circling(i) {
            i += 1;
        }
        // A run reaching the end of the trace closes on the last sample
        let end = i.min(n - 1);
        if end > begin {
            runs.push(ThermalCandidate::new(begin, end));
        }
    }
    runs
}

/// Turn runs whose whole-range score is positive
pub fn segment(trace: &Trace, threshold: f64, mode: ScoringMode) -> ScoreResult<Vec<ThermalCandidate>> {
    let runs = find_turn_runs(trace, threshold);
    let run_count = runs.len();

    let mut candidates = Vec::with_capacity(run_count);
    for run in runs {
        let scored = Thermal::score(trace.samples(), run.start_index, run.end_index, mode)?;
        if scored.points > 0.0 {
            candidates.push(run);
        } else {
            log::debug!(
                "dropping turn run {}..{} with {:.1} m effective gain",
                run.start_index,
                run.end_index,
                scored.effective_gain
            );
        }
    }

    log::info!(
        "segmentation: {} turn runs, {} climbing candidates",
        run_count,
        candidates.len()
    );
    Ok(candidates)
}

/// Join consecutive candidates separated by at most `max_gap_secs`.
///
/// Merging is transitive: the merged range is compared against the next
/// candidate again, so a chain of close candidates collapses into one.
pub fn merge_candidates(
    trace: &Trace,
    candidates: &[ThermalCandidate],
    max_gap_secs: f64,
) -> Vec<ThermalCandidate> {
    let samples = trace.samples();
    let mut merged: Vec<ThermalCandidate> = Vec::with_capacity(candidates.len());

    for next in candidates {
        match merged.last_mut() {
            Some(current)
                if samples[next.start_index].time - samples[current.end_index].time
                    <= max_gap_secs =>
            {
                current.end_index = current.end_index.max(next.end_index);
            }
            _ => merged.push(*next),
        }
    }

    if merged.len() != candidates.len() {
        log::info!(
            "merge: {} candidates -> {} thermals",
            candidates.len(),
            merged.len()
        );
    }
    merged
}
