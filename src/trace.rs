//! Sample arena and turn-rate preprocessing.
//!
//! A `Trace` owns every sample of one flight. It is built once from the
//! loader's fixes and only read afterwards; thermals refer to it by index.

use crate::config::ScoringConfig;
use crate::error::{ScoreError, ScoreResult};
use crate::geodesy;
use crate::smoothing::{center_offset, centered_moving_average};
use crate::types::{Fix, Sample};

/// Normalize an angle difference into (-180, 180] degrees
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let a = (angle_deg + 360.0).rem_euclid(360.0);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Ground track of every sample towards its successor; `None` for the last one
pub fn ground_tracks(fixes: &[Fix]) -> Vec<Option<f64>> {
    let mut tracks: Vec<Option<f64>> = fixes
        .windows(2)
        .map(|pair| Some(geodesy::bearing(pair[0].position, pair[1].position)))
        .collect();
    if !fixes.is_empty() {
        tracks.push(None);
    }
    tracks
}

/// Signed turn rate in degrees per second from consecutive ground tracks.
///
/// Defined for `1 <= i < n - 1`; a zero time step is invalid input.
pub fn turn_rates(fixes: &[Fix], tracks: &[Option<f64>]) -> ScoreResult<Vec<Option<f64>>> {
    let mut rates = vec![None; fixes.len()];
    for i in 1..fixes.len().saturating_sub(1) {
        let (Some(prev), Some(current)) = (tracks[i - 1], tracks[i]) else {
            continue;
        };
        let dt = fixes[i].time - fixes[i - 1].time;
        if dt <= 0.0 {
            return Err(ScoreError::InvalidTrace(format!(
                "zero or negative time step at sample {} (t={:.1}s)",
                i, fixes[i].time
            )));
        }
        rates[i] = Some(normalize_angle(current - prev) / dt);
    }
    Ok(rates)
}

/// Best forward-speed signal per sample in m/s.
///
/// True airspeed when recorded, else recorded ground speed, else a
/// central-difference estimate from the neighbouring positions.
pub fn airspeeds(fixes: &[Fix]) -> Vec<f64> {
    let n = fixes.len();
    (0..n)
        .map(|i| {
            let fix = &fixes[i];
            if let Some(tas) = fix.true_airspeed {
                return tas;
            }
            if let Some(gsp) = fix.ground_speed {
                return gsp;
            }
            if n < 2 {
                return 0.0;
            }
            let before = i.saturating_sub(1);
            let after = (i + 1).min(n - 1);
            let dt = fixes[after].time - fixes[before].time;
            if dt > 0.0 {
                geodesy::distance(fixes[before].position, fixes[after].position) / dt
            } else {
                0.0
            }
        })
        .collect()
}

/// Immutable, time-ordered sample sequence of one flight
#[derive(Clone, Debug)]
pub struct Trace {
    samples: Vec<Sample>,
}

impl Trace {
    /// Derive tracks, turn rates, airspeed and the smoothed detection signal.
    ///
    /// Time must strictly increase; anything else is an `InvalidTrace`.
    pub fn from_fixes(fixes: Vec<Fix>, config: &ScoringConfig) -> ScoreResult<Self> {
        if let Some(i) = (1..fixes.len()).find(|&i| fixes[i].time <= fixes[i - 1].time) {
            return Err(ScoreError::InvalidTrace(format!(
                "time does not increase at sample {} ({:.1}s after {:.1}s)",
                i,
                fixes[i].time,
                fixes[i - 1].time
            )));
        }

        let window = config.smoothing_window.max(1);
        let tracks = ground_tracks(&fixes);
        let rates = turn_rates(&fixes, &tracks)?;
        let speeds = airspeeds(&fixes);

        // Undefined endpoint rates enter the filter as zero
        let signal: Vec<f64> = rates.iter().map(|r| r.unwrap_or(0.0)).collect();
        let smoothed = centered_moving_average(&signal, window);
        let offset = center_offset(window);

        if smoothed.is_empty() {
            log::warn!(
                "trace has {} samples, fewer than the smoothing window of {}",
                fixes.len(),
                window
            );
        }

        let samples = fixes
            .into_iter()
            .enumerate()
            .map(|(i, fix)| Sample {
                time: fix.time,
                position: fix.position,
                altitude: fix.altitude,
                airspeed: speeds[i],
                ground_track: tracks[i],
                turn_rate: rates[i],
                smoothed_turn_rate: i
                    .checked_sub(offset)
                    .and_then(|k| smoothed.get(k).copied()),
            })
            .collect();

        Ok(Trace { samples })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;
    use approx::assert_abs_diff_eq;

    fn straight_fixes(n: usize) -> Vec<Fix> {
        (0..n)
            .map(|i| Fix::new(i as f64, Position::new(50.0 + i as f64 * 0.0003, 8.0), 1000.0))
            .collect()
    }

    #[test]
    fn test_normalize_range() {
        for deg in [-720.0, -359.0, -181.0, -180.0, -10.0, 0.0, 10.0, 180.0, 181.0, 359.0, 540.0] {
            let n = normalize_angle(deg);
            assert!(n > -180.0 && n <= 180.0, "{} -> {}", deg, n);
        }
        assert_eq!(normalize_angle(-180.0), 180.0);
        assert_eq!(normalize_angle(350.0), -10.0);
        assert_eq!(normalize_angle(-350.0), 10.0);
    }

    #[test]
    fn test_normalize_idempotent() {
        for deg in [-500.0, -180.0, -90.5, 0.0, 45.0, 180.0, 270.0, 719.0] {
            let once = normalize_angle(deg);
            assert_eq!(normalize_angle(once), once);
        }
    }

    #[test]
    fn test_straight_flight_has_zero_turn_rate() {
        let trace = Trace::from_fixes(straight_fixes(30), &ScoringConfig::default()).unwrap();
        let s = trace.samples();
        assert!(s[0].turn_rate.is_none());
        assert!(s[29].turn_rate.is_none());
        assert!(s[29].ground_track.is_none());
        for sample in &s[1..29] {
            assert_abs_diff_eq!(sample.turn_rate.unwrap(), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_smoothed_coverage() {
        let trace = Trace::from_fixes(straight_fixes(40), &ScoringConfig::default()).unwrap();
        let covered: Vec<usize> = trace
            .samples()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.smoothed_turn_rate.is_some())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(covered.len(), 40 - 16);
        assert_eq!(covered[0], 8);
        assert_eq!(*covered.last().unwrap(), 31);
    }

    #[test]
    fn test_turn_sign_and_magnitude() {
        // Track north, then east: a 90 degree right turn over one second
        let fixes = vec![
            Fix::new(0.0, Position::new(50.0, 8.0), 1000.0),
            Fix::new(1.0, Position::new(50.001, 8.0), 1000.0),
            Fix::new(2.0, Position::new(50.001, 8.0015), 1000.0),
        ];
        let tracks = ground_tracks(&fixes);
        let rates = turn_rates(&fixes, &tracks).unwrap();
        assert_abs_diff_eq!(rates[1].unwrap(), 90.0, epsilon = 0.1);
    }

    #[test]
    fn test_non_monotonic_time_rejected() {
        let mut fixes = straight_fixes(5);
        fixes[3].time = fixes[2].time;
        let err = Trace::from_fixes(fixes, &ScoringConfig::default()).unwrap_err();
        assert!(err.is_invalid_trace());
    }

    #[test]
    fn test_zero_time_step_in_turn_rates() {
        let mut fixes = straight_fixes(4);
        fixes[2].time = fixes[1].time;
        let tracks = ground_tracks(&fixes);
        assert!(turn_rates(&fixes, &tracks).is_err());
    }

    #[test]
    fn test_airspeed_priority() {
        let mut fixes = straight_fixes(3);
        fixes[0].true_airspeed = Some(25.0);
        fixes[0].ground_speed = Some(30.0);
        fixes[1].ground_speed = Some(30.0);
        let speeds = airspeeds(&fixes);
        assert_eq!(speeds[0], 25.0);
        assert_eq!(speeds[1], 30.0);
        // 0.0003 deg latitude per second
        assert_abs_diff_eq!(speeds[2], 33.36, epsilon = 0.05);
    }

    #[test]
    fn test_short_trace_is_not_an_error() {
        let trace = Trace::from_fixes(straight_fixes(10), &ScoringConfig::default()).unwrap();
        assert!(trace.samples().iter().all(|s| s.smoothed_turn_rate.is_none()));
    }
}
