//! Thermal scoring and sub-interval optimization
//!
//! A thermal's score depends only on its two boundary samples, which is what
//! makes the exhaustive search over all sub-intervals affordable.
use serde::Serialize;

use crate::config::ScoringMode;
use crate::error::{ScoreError, ScoreResult};
use crate::segmentation::ThermalCandidate;
use crate::types::Sample;

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.80665;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thermal {
    pub start_index: usize,
    pub end_index: usize,
    /// Seconds since midnight of the boundary samples
    pub start_time: f64,
    pub end_time: f64,
    /// altitude(end) - altitude(start), meters
    pub gain: f64,
    /// Gain plus the energy term when compensation is enabled, meters
    pub effective_gain: f64,
    /// effective_gain / duration, m/s
    pub average_climb: f64,
    pub points: f64,
}

impl Thermal {
    /// Score the interval bounded by samples `begin` and `end`.
    ///
    /// Physics:
    ///   effective_gain = gain + (v_end² - v_begin²) / 2g   (energy compensated)
    ///   points = max(effective_gain, 0) × effective_gain / duration
    pub fn score(samples: &[Sample], begin: usize, end: usize, mode: ScoringMode) -> ScoreResult<Self> {
        if begin >= end || end >= samples.len() {
            return Err(ScoreError::InvalidTrace(format!(
                "invalid thermal bounds {}..{} for {} samples",
                begin,
                end,
                samples.len()
            )));
        }
        let b = &samples[begin];
        let e = &samples[end];

        let duration = e.time - b.time;
        if duration <= 0.0 {
            return Err(ScoreError::InvalidTrace(format!(
                "thermal {}..{} has zero duration",
                begin, end
            )));
        }

        let gain = e.altitude - b.altitude;
        let effective_gain = match mode {
            ScoringMode::Plain => gain,
            ScoringMode::EnergyCompensated => {
                gain + (e.airspeed * e.airspeed - b.airspeed * b.airspeed) / (2.0 * STANDARD_GRAVITY)
            }
        };
        let average_climb = effective_gain / duration;
        let points = effective_gain.max(0.0) * average_climb;
        debug_assert!(points >= 0.0, "negative points for forward interval");

        Ok(Thermal {
            start_index: begin,
            end_index: end,
            start_time: b.time,
            end_time: e.time,
            gain,
            effective_gain,
            average_climb,
            points,
        })
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn candidate(&self) -> ThermalCandidate {
        ThermalCandidate::new(self.start_index, self.end_index)
    }
}

/// Best-scoring sub-interval of a candidate range.
///
/// Every pair (b, e) with `start <= b < e <= end` is evaluated; the full range
/// is the initial best and only a strictly higher score replaces it.
pub fn optimize(samples: &[Sample], candidate: ThermalCandidate, mode: ScoringMode) -> ScoreResult<Thermal> {
    let mut best = Thermal::score(samples, candidate.start_index, candidate.end_index, mode)?;

    for begin in candidate.start_index..candidate.end_index {
        for end in (begin + 1)..=candidate.end_index {
            let thermal = Thermal::score(samples, begin, end, mode)?;
            if thermal.points > best.points {
                best = thermal;
            }
        }
    }

    Ok(best)
}

/// Optimize every merged candidate, optionally one scoped thread per candidate.
///
/// Output order matches `candidates` in both modes.
pub fn optimize_all(
    samples: &[Sample],
    candidates: &[ThermalCandidate],
    mode: ScoringMode,
    parallel: bool,
) -> ScoreResult<Vec<Thermal>> {
    if !parallel || candidates.len() < 2 {
        return candidates
            .iter()
            .map(|&candidate| optimize(samples, candidate, mode))
            .collect();
    }

    let results = crossbeam::scope(|scope| {
        let handles: Vec<_> = candidates
            .iter()
            .map(|&candidate| scope.spawn(move |_| optimize(samples, candidate, mode)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(ScoreError::Internal("optimizer worker panicked".to_string())))
            })
            .collect::<Vec<_>>()
    })
    .map_err(|_| ScoreError::Internal("optimizer scope panicked".to_string()))?;

    results.into_iter().collect()
}
