// Thermal Score Library
// Soaring performance scoring of one glider flight recorder trace

pub mod airports;
pub mod config;
pub mod error;
pub mod geodesy;
pub mod igc;
pub mod scoring;
pub mod segmentation;
pub mod smoothing;
pub mod thermal;
pub mod trace;
pub mod types;
pub mod window;

pub use airports::{Airport, AirportDirectory};
pub use config::{ScoringConfig, ScoringMode};
pub use error::{ScoreError, ScoreResult};
pub use igc::{load_igc, parse_igc, IgcFile};
pub use scoring::{CategoryScore, FlightScore, FlightScorer};
pub use segmentation::ThermalCandidate;
pub use thermal::Thermal;
pub use trace::Trace;
pub use types::{Fix, Position, Sample, TraceHeader};
pub use window::WindowResult;
