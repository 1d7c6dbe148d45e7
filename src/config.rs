use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};

/// How the energy term enters the effective gain of a thermal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Effective gain is the raw altitude gain
    Plain,
    /// Adds the kinetic energy exchanged with airspeed: (v_e² - v_b²) / 2g
    EnergyCompensated,
}

impl Default for ScoringMode {
    fn default() -> Self {
        ScoringMode::Plain
    }
}

impl FromStr for ScoringMode {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(ScoringMode::Plain),
            "energy" | "energy_compensated" | "energy-compensated" | "te" => {
                Ok(ScoringMode::EnergyCompensated)
            }
            other => Err(ScoreError::Configuration(format!(
                "unsupported scoring mode '{}' (expected plain or energy_compensated)",
                other
            ))),
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Plain => write!(f, "plain"),
            ScoringMode::EnergyCompensated => write!(f, "energy_compensated"),
        }
    }
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    // ── Detection ──
    pub smoothing_window: usize,
    pub turn_rate_threshold: f64,
    pub merge_gap_secs: f64,

    // ── Scoring ──
    pub scoring_mode: ScoringMode,

    // ── Classification ──
    pub local_radius_m: f64,
    pub glide_ratio: f64,

    // ── Window search ──
    pub window_secs: f64,

    // ── Feature flags ──
    pub parallel_optimize: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 17,
            turn_rate_threshold: 6.0,
            merge_gap_secs: 12.0,
            scoring_mode: ScoringMode::Plain,
            local_radius_m: 10_000.0,
            glide_ratio: 40.0,
            window_secs: 3600.0,
            parallel_optimize: false,
        }
    }
}

impl ScoringConfig {
    /// Load a (possibly partial) configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> ScoreResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: ScoringConfig = serde_json::from_reader(reader).map_err(|e| {
            ScoreError::Configuration(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScoreResult<()> {
        if self.smoothing_window == 0 {
            return Err(ScoreError::Configuration(
                "smoothing_window must be at least 1".to_string(),
            ));
        }
        let positive = [
            ("turn_rate_threshold", self.turn_rate_threshold),
            ("local_radius_m", self.local_radius_m),
            ("glide_ratio", self.glide_ratio),
            ("window_secs", self.window_secs),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScoreError::Configuration(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        if !self.merge_gap_secs.is_finite() || self.merge_gap_secs < 0.0 {
            return Err(ScoreError::Configuration(format!(
                "merge_gap_secs must be non-negative, got {}",
                self.merge_gap_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.smoothing_window, 17);
        assert_eq!(config.scoring_mode, ScoringMode::Plain);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("plain".parse::<ScoringMode>().unwrap(), ScoringMode::Plain);
        assert_eq!(
            "Energy".parse::<ScoringMode>().unwrap(),
            ScoringMode::EnergyCompensated
        );
        let err = "netto".parse::<ScoringMode>().unwrap_err();
        assert!(matches!(err, ScoreError::Configuration(_)));
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in [ScoringMode::Plain, ScoringMode::EnergyCompensated] {
            assert_eq!(mode.to_string().parse::<ScoringMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ScoringConfig::default();
        config.smoothing_window = 0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.window_secs = -1.0;
        assert!(config.validate().is_err());

        let mut config = ScoringConfig::default();
        config.glide_ratio = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{"scoring_mode": "energy_compensated", "window_secs": 7200}"#)
                .unwrap();
        assert_eq!(config.scoring_mode, ScoringMode::EnergyCompensated);
        assert_eq!(config.window_secs, 7200.0);
        assert_eq!(config.merge_gap_secs, 12.0);
    }

    #[test]
    fn test_unknown_mode_in_json_is_rejected() {
        let parsed = serde_json::from_str::<ScoringConfig>(r#"{"scoring_mode": "netto"}"#);
        assert!(parsed.is_err());
    }
}
