//! Polyline sampling strategies.
//!
//! Router polylines have highly non-uniform vertex spacing, so the full
//! analysis samples by geographic distance rather than vertex index. The
//! quick scan only needs a yes/no answer and uses a fixed point count
//! regardless of route length.

use crate::geo::{haversine_distance_m, lerp};
use crate::models::Coordinate;

/// Pick roughly `n` evenly strided points from the polyline.
///
/// The last raw point is always present (it replaces the final sample when
/// the stride overshoots). Polylines of two points or fewer are returned
/// unchanged. Total for any input.
pub fn sample_by_count(points: &[Coordinate], n: usize) -> Vec<Coordinate> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let step = (points.len() / n.max(1)).max(1);
    let mut samples: Vec<Coordinate> = points.iter().copied().step_by(step).collect();
    if let (Some(last_sample), Some(last_point)) = (samples.last_mut(), points.last()) {
        if last_sample != last_point {
            *last_sample = *last_point;
        }
    }
    samples
}

/// Emit one sample every `interval_m` meters of great-circle distance along
/// the polyline, interpolating between raw vertices at the exact interval
/// boundary.
///
/// Always starts with the first raw point and ends with the last raw point.
/// Polylines of one point or fewer are returned unchanged. Total for any
/// input.
pub fn sample_by_distance(points: &[Coordinate], interval_m: f64) -> Vec<Coordinate> {
    if points.len() <= 1 {
        return points.to_vec();
    }
    let interval = interval_m.max(1.0);

    let mut samples = vec![points[0]];
    let mut cursor = points[0];
    let mut carried_m = 0.0;

    for &next in &points[1..] {
        let mut leg_m = haversine_distance_m(cursor, next);
        // Split the leg at every interval boundary it crosses, carrying the
        // remainder into the next leg.
        while leg_m > 0.0 && carried_m + leg_m >= interval {
            let t = (interval - carried_m) / leg_m;
            let boundary = lerp(cursor, next, t);
            samples.push(boundary);
            leg_m -= interval - carried_m;
            carried_m = 0.0;
            cursor = boundary;
        }
        carried_m += leg_m;
        cursor = next;
    }

    let last = points[points.len() - 1];
    if samples.last() != Some(&last) {
        samples.push(last);
    }
    samples
}
