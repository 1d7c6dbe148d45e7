use geo::{HaversineBearing, Point};

use crate::types::Position;

/// Mean Earth radius used for all great-circle distances (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two positions in meters (haversine)
pub fn distance(from: Position, to: Position) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos() * to.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial forward azimuth from `from` towards `to`, degrees in [0, 360)
pub fn bearing(from: Position, to: Position) -> f64 {
    let origin: Point<f64> = from.into();
    let bearing = origin.haversine_bearing(to.into()).rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative inputs
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}
