use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};
use crate::geodesy;
use crate::thermal::Thermal;
use crate::types::{Position, Sample};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub name: String,
    #[serde(flatten)]
    pub position: Position,
}

impl Airport {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            position: Position::new(latitude, longitude),
        }
    }
}

/// Gliding sites shipped with the binary: (name, latitude, longitude)
const BUILTIN_AIRPORTS: &[(&str, f64, f64)] = &[
    ("Aachen-Merzbrueck", 50.8231, 6.1861),
    ("Bad Sobernheim-Domberg", 49.7906, 7.6658),
    ("Dahlemer Binz", 50.4056, 6.5289),
    ("Hahnweide", 48.6319, 9.4297),
    ("Klippeneck", 48.1072, 8.7636),
    ("Koenigsdorf", 47.8286, 11.4656),
    ("Luesse", 52.1411, 12.6647),
    ("Oerlinghausen", 51.9322, 8.6614),
    ("Porta Westfalica", 52.2203, 8.8592),
    ("Unterwoessen", 47.7272, 12.4281),
    ("Wasserkuppe", 50.4989, 9.9536),
    ("Zell am See", 47.2925, 12.7875),
];

/// Static, read-only list of airports
#[derive(Clone, Debug)]
pub struct AirportDirectory {
    airports: Vec<Airport>,
}

impl AirportDirectory {
    pub fn new(airports: Vec<Airport>) -> ScoreResult<Self> {
        if airports.is_empty() {
            return Err(ScoreError::Configuration(
                "airport directory is empty".to_string(),
            ));
        }
        Ok(Self { airports })
    }

    pub fn builtin() -> Self {
        Self {
            airports: BUILTIN_AIRPORTS
                .iter()
                .map(|&(name, lat, lon)| Airport::new(name, lat, lon))
                .collect(),
        }
    }

    /// Load `[{"name": .., "latitude": .., "longitude": ..}, ..]`
    pub fn from_json_file(path: &Path) -> ScoreResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let airports: Vec<Airport> = serde_json::from_reader(reader)?;
        Self::new(airports)
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    /// Closest airport to `position`; the first entry wins on ties
    pub fn nearest(&self, position: Position) -> Option<&Airport> {
        self.airports.iter().min_by(|a, b| {
            geodesy::distance(position, a.position).total_cmp(&geodesy::distance(position, b.position))
        })
    }
}

/// Whether any sample of the thermal's range lies beyond `radius_m` of the airport.
///
/// The name is kept from the scoring rules even though the test fires for
/// thermals that wander away from the field.
pub fn is_local(samples: &[Sample], thermal: &Thermal, airport: &Airport, radius_m: f64) -> bool {
    samples[thermal.start_index..thermal.end_index]
        .iter()
        .any(|s| geodesy::distance(s.position, airport.position) > radius_m)
}

/// Whether the airport is within final-glide reach from the thermal's entry
pub fn is_remote(samples: &[Sample], thermal: &Thermal, airport: &Airport, glide_ratio: f64) -> bool {
    let entry = &samples[thermal.start_index];
    entry.altitude * glide_ratio > geodesy::distance(entry.position, airport.position)
}

/// Thermals passing a classification predicate, input order kept
pub fn select<F>(thermals: &[Thermal], mut predicate: F) -> Vec<Thermal>
where
    F: FnMut(&Thermal) -> bool,
{
    thermals.iter().filter(|&t| predicate(t)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(lat: f64, lon: f64, alt: f64, time: f64) -> Sample {
        Sample {
            time,
            position: Position::new(lat, lon),
            altitude: alt,
            airspeed: 25.0,
            ground_track: None,
            turn_rate: None,
            smoothed_turn_rate: None,
        }
    }

    fn thermal(start: usize, end: usize) -> Thermal {
        Thermal {
            start_index: start,
            end_index: end,
            start_time: start as f64,
            end_time: end as f64,
            gain: 100.0,
            effective_gain: 100.0,
            average_climb: 1.0,
            points: 100.0,
        }
    }

    #[test]
    fn test_builtin_not_empty() {
        assert!(!AirportDirectory::builtin().airports().is_empty());
    }

    #[test]
    fn test_nearest_airport() {
        let dir = AirportDirectory::builtin();
        let near_wasserkuppe = Position::new(50.49, 9.94);
        assert_eq!(dir.nearest(near_wasserkuppe).unwrap().name, "Wasserkuppe");
    }

    #[test]
    fn test_nearest_tie_first_wins() {
        let dir = AirportDirectory::new(vec![
            Airport::new("Far", 51.0, 8.0),
            Airport::new("Grass strip", 50.1, 8.0),
            Airport::new("Hard runway", 50.1, 8.0),
        ])
        .unwrap();
        assert_eq!(dir.nearest(Position::new(50.0, 8.0)).unwrap().name, "Grass strip");
    }

    #[test]
    fn test_empty_directory_rejected() {
        assert!(matches!(
            AirportDirectory::new(Vec::new()),
            Err(ScoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_directory_json_format() {
        let airports: Vec<Airport> =
            serde_json::from_str(r#"[{"name": "Home", "latitude": 50.0, "longitude": 8.0}]"#).unwrap();
        assert_eq!(airports[0], Airport::new("Home", 50.0, 8.0));
    }

    #[test]
    fn test_local_fires_beyond_radius() {
        let airport = Airport::new("Home", 50.0, 8.0);
        // 0.2 deg latitude is ~22 km
        let samples = vec![
            sample_at(50.0, 8.0, 1000.0, 0.0),
            sample_at(50.01, 8.0, 1100.0, 10.0),
            sample_at(50.2, 8.0, 1200.0, 20.0),
            sample_at(50.2, 8.0, 1300.0, 30.0),
        ];
        assert!(!is_local(&samples, &thermal(0, 2), &airport, 10_000.0));
        assert!(is_local(&samples, &thermal(1, 3), &airport, 10_000.0));
    }

    #[test]
    fn test_remote_glide_reach() {
        let airport = Airport::new("Home", 50.0, 8.0);
        // ~22.2 km out: 600 m * 40 = 24 km reaches, 500 m * 40 = 20 km does not
        let samples = vec![
            sample_at(50.2, 8.0, 600.0, 0.0),
            sample_at(50.2, 8.0, 500.0, 10.0),
            sample_at(50.2, 8.0, 700.0, 20.0),
        ];
        assert!(is_remote(&samples, &thermal(0, 2), &airport, 40.0));
        assert!(!is_remote(&samples, &thermal(1, 2), &airport, 40.0));
    }

    #[test]
    fn test_classes_are_independent() {
        let airport = Airport::new("Home", 50.0, 8.0);
        let samples = vec![
            sample_at(50.2, 8.0, 1500.0, 0.0),
            sample_at(50.2, 8.0, 1600.0, 10.0),
        ];
        let t = thermal(0, 1);
        assert!(is_local(&samples, &t, &airport, 10_000.0));
        assert!(is_remote(&samples, &t, &airport, 40.0));
    }

    #[test]
    fn test_select_keeps_order() {
        let thermals = vec![thermal(0, 1), thermal(2, 3), thermal(4, 5)];
        let picked = select(&thermals, |t| t.start_index != 2);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].start_index, 0);
        assert_eq!(picked[1].start_index, 4);
    }
}
