use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// WGS84 position in degrees, negative values are south/west
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl From<Position> for geo::Point<f64> {
    fn from(p: Position) -> Self {
        geo::Point::new(p.longitude, p.latitude)
    }
}

/// One recorder fix as delivered by the trace loader
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fix {
    /// Seconds since midnight UTC of the flight date
    pub time: f64,
    pub position: Position,
    /// Meters
    pub altitude: f64,
    /// m/s, from a TAS recorder extension
    pub true_airspeed: Option<f64>,
    /// m/s, from a GSP recorder extension
    pub ground_speed: Option<f64>,
}

impl Fix {
    pub fn new(time: f64, position: Position, altitude: f64) -> Self {
        Self {
            time,
            position,
            altitude,
            true_airspeed: None,
            ground_speed: None,
        }
    }
}

/// Fix plus the per-sample signals derived during preprocessing.
///
/// Samples live in the `Trace` arena and are never modified once built.
#[derive(Clone, Debug, Serialize)]
pub struct Sample {
    pub time: f64,
    pub position: Position,
    pub altitude: f64,
    /// Best forward-speed signal in m/s
    pub airspeed: f64,
    /// Degrees in [0, 360); undefined for the last sample
    pub ground_track: Option<f64>,
    /// Degrees per second; undefined for the first and last sample
    pub turn_rate: Option<f64>,
    /// Centered moving average of `turn_rate`; undefined near both ends
    pub smoothed_turn_rate: Option<f64>,
}

/// Recorder metadata, only used for reporting
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TraceHeader {
    pub date: Option<NaiveDate>,
    pub glider_type: Option<String>,
    pub glider_id: Option<String>,
    pub pilot: Option<String>,
}
