// scoring.rs: pure computation layer
//
// Takes one loaded trace and runs every stage in order:
//   preprocess → smooth → segment → merge → optimize → classify → window search
// No I/O happens here; loaders and report formatting live at the edges.

use serde::Serialize;

use crate::airports::{self, Airport, AirportDirectory};
use crate::config::ScoringConfig;
use crate::error::{ScoreError, ScoreResult};
use crate::segmentation::{merge_candidates, segment};
use crate::thermal::{optimize_all, Thermal};
use crate::trace::Trace;
use crate::types::Fix;
use crate::window::{best_window, strongest, WindowResult};

// ─── Results ─────────────────────────────────────────────────────────────────

/// Score of one thermal class (local or cross-country)
#[derive(Clone, Debug, Serialize)]
pub struct CategoryScore {
    /// Thermals of this class, ordered by start time
    pub thermals: Vec<Thermal>,
    pub strongest: Thermal,
    /// Indices refer to `thermals`; `None` if no thermal fits the window
    pub best_window: Option<WindowResult>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FlightScore {
    pub takeoff: Airport,
    pub thermals: Vec<Thermal>,
    pub local: Option<CategoryScore>,
    pub remote: Option<CategoryScore>,
}

impl FlightScore {
    pub fn total_points(&self) -> f64 {
        self.thermals.iter().map(|t| t.points).sum()
    }
}

// ─── Scorer ──────────────────────────────────────────────────────────────────

pub struct FlightScorer {
    config: ScoringConfig,
}

impl FlightScorer {
    pub fn new(config: ScoringConfig) -> ScoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Build the sample arena from loader fixes
    pub fn prepare(&self, fixes: Vec<Fix>) -> ScoreResult<Trace> {
        Trace::from_fixes(fixes, &self.config)
    }

    /// Detected, merged and optimized thermals in time order
    pub fn detect_thermals(&self, trace: &Trace) -> ScoreResult<Vec<Thermal>> {
        let mode = self.config.scoring_mode;
        let candidates = segment(trace, self.config.turn_rate_threshold, mode)?;
        let merged = merge_candidates(trace, &candidates, self.config.merge_gap_secs);
        let thermals = optimize_all(trace.samples(), &merged, mode, self.config.parallel_optimize)?;

        for t in &thermals {
            log::debug!(
                "thermal {}..{}: {:.0} m in {:.0} s, {:.2} m/s, {:.1} points",
                t.start_index,
                t.end_index,
                t.effective_gain,
                t.duration(),
                t.average_climb,
                t.points
            );
        }
        Ok(thermals)
    }

    /// Run the whole pipeline on a prepared trace
    pub fn score(&self, trace: &Trace, directory: &AirportDirectory) -> ScoreResult<FlightScore> {
        if trace.is_empty() {
            return Err(ScoreError::InvalidTrace("trace has no samples".to_string()));
        }
        let first = &trace.samples()[0];
        let takeoff = directory
            .nearest(first.position)
            .cloned()
            .ok_or_else(|| ScoreError::Configuration("airport directory is empty".to_string()))?;
        log::info!("takeoff airport: {}", takeoff.name);

        let thermals = self.detect_thermals(trace)?;
        if thermals.is_empty() {
            log::warn!("no thermals detected");
        }

        let samples = trace.samples();
        let local = airports::select(&thermals, |t| {
            airports::is_local(samples, t, &takeoff, self.config.local_radius_m)
        });
        let remote = airports::select(&thermals, |t| {
            airports::is_remote(samples, t, &takeoff, self.config.glide_ratio)
        });
        log::info!(
            "{} thermals: {} local, {} cross-country",
            thermals.len(),
            local.len(),
            remote.len()
        );

        Ok(FlightScore {
            local: self.category(local, "local"),
            remote: self.category(remote, "cross-country"),
            takeoff,
            thermals,
        })
    }

    /// Load-to-result convenience for callers holding raw fixes
    pub fn score_fixes(&self, fixes: Vec<Fix>, directory: &AirportDirectory) -> ScoreResult<FlightScore> {
        let trace = self.prepare(fixes)?;
        self.score(&trace, directory)
    }

    fn category(&self, thermals: Vec<Thermal>, label: &str) -> Option<CategoryScore> {
        let Some(best) = strongest(&thermals) else {
            log::warn!("no {} thermals", label);
            return None;
        };
        let window = best_window(&thermals, self.config.window_secs);
        Some(CategoryScore {
            strongest: best,
            best_window: window,
            thermals,
        })
    }
}
