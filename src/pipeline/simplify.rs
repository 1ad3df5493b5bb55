//! Douglas-Peucker track simplification.

use crate::pipeline::geo::perpendicular_distance;
use crate::types::track::Coordinate;

/// Default tolerance in meters.
pub const DEFAULT_EPSILON: f64 = 5.0;

/// Returns the subsequence of `points` kept under tolerance `epsilon` (meters).
///
/// The first and last points are always kept. A non-positive epsilon is valid
/// and keeps every point that deviates from its chord at all.
pub fn simplify<C: Coordinate + Clone>(points: &[C], epsilon: f64) -> Vec<C> {
    simplify_indices(points, epsilon)
        .into_iter()
        .map(|i| points[i].clone())
        .collect()
}

/// Indices of the points [`simplify`] would keep, in ascending order.
pub fn simplify_indices<C: Coordinate>(points: &[C], epsilon: f64) -> Vec<usize> {
    if points.len() <= 2 {
        return (0..points.len()).collect();
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    // Explicit stack instead of recursion; long tracks would otherwise risk
    // blowing the call stack. The kept set does not depend on visit order.
    let mut ranges = vec![(0usize, last)];

    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_distance = 0.0;
        let mut max_index = start;
        for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
            let distance = perpendicular_distance(point, &points[start], &points[end]);
            if distance > max_distance || max_index == start {
                max_distance = distance;
                max_index = i;
            }
        }

        if max_distance > epsilon {
            keep[max_index] = true;
            ranges.push((max_index, end));
            ranges.push((start, max_index));
        }
    }

    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect()
}
