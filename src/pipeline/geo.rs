use crate::types::track::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two WGS84 positions.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

pub fn distance_between<A: Coordinate, B: Coordinate>(a: &A, b: &B) -> f64 {
    haversine_distance(a.lat(), a.lon(), b.lat(), b.lon())
}

/// Approximate distance in meters from `point` to the line through
/// `start` and `end`.
///
/// The cross product is taken in raw degree space and the resulting ratio is
/// scaled by the haversine length of the segment. This is a flat projection:
/// it holds for the short segments found within a single workout, not for
/// segments spanning tens of kilometers or more. Simplification output
/// depends on this exact formula, so do not swap in a geodesic one.
pub fn perpendicular_distance<P, S>(point: &P, start: &S, end: &S) -> f64
where
    P: Coordinate,
    S: Coordinate,
{
    let (x0, y0) = (point.lon(), point.lat());
    let (x1, y1) = (start.lon(), start.lat());
    let (x2, y2) = (end.lon(), end.lat());

    let dx = x2 - x1;
    let dy = y2 - y1;
    let length_sq = dx * dx + dy * dy;

    if length_sq == 0.0 {
        return distance_between(point, start);
    }

    let cross = (dx * (y1 - y0) - (x1 - x0) * dy).abs();

    cross / length_sq * distance_between(start, end)
}
