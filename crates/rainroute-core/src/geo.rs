//! Spatial math and polyline codec for route analysis.

use crate::models::Coordinate;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate great-circle distance between two points in meters using the
/// Haversine formula.
pub fn haversine_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Linear interpolation between two coordinates.
///
/// Good enough at sampling-interval scale (hundreds of meters); the error
/// versus a true geodesic midpoint is far below the grid step.
pub fn lerp(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    let t = t.clamp(0.0, 1.0);
    Coordinate {
        lat: a.lat + (b.lat - a.lat) * t,
        lon: a.lon + (b.lon - a.lon) * t,
    }
}

/// Total length of a polyline in meters.
pub fn polyline_length_m(points: &[Coordinate]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance_m(pair[0], pair[1]))
        .sum()
}

// ==== Google encoded polyline format ====
// 1e-5 degree precision, delta-encoded, 5-bit chunks offset by 63.
// https://developers.google.com/maps/documentation/utilities/polylinealgorithm

const POLYLINE_PRECISION: f64 = 1e5;

/// Encode coordinates into the Google polyline wire format.
pub fn encode_polyline(points: &[Coordinate]) -> String {
    let mut out = String::with_capacity(points.len() * 4);
    let mut prev_lat = 0i64;
    let mut prev_lon = 0i64;
    for point in points {
        let lat = (point.lat * POLYLINE_PRECISION).round() as i64;
        let lon = (point.lon * POLYLINE_PRECISION).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lon - prev_lon, &mut out);
        prev_lat = lat;
        prev_lon = lon;
    }
    out
}

/// Decode a Google-encoded polyline. Trailing garbage or a truncated final
/// chunk simply ends the decode; this never fails.
pub fn decode_polyline(encoded: &str) -> Vec<Coordinate> {
    let mut points = Vec::new();
    let mut bytes = encoded.bytes();
    let mut lat = 0i64;
    let mut lon = 0i64;
    loop {
        let Some(dlat) = decode_value(&mut bytes) else {
            break;
        };
        let Some(dlon) = decode_value(&mut bytes) else {
            break;
        };
        lat += dlat;
        lon += dlon;
        points.push(Coordinate {
            lat: lat as f64 / POLYLINE_PRECISION,
            lon: lon as f64 / POLYLINE_PRECISION,
        });
    }
    points
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = (value << 1) ^ (value >> 63);
    while v >= 0x20 {
        out.push((((0x20 | (v & 0x1f)) + 63) as u8) as char);
        v >>= 5;
    }
    out.push(((v + 63) as u8) as char);
}

fn decode_value(bytes: &mut impl Iterator<Item = u8>) -> Option<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;
    loop {
        let byte = bytes.next()?.checked_sub(63)? as i64;
        result |= (byte & 0x1f) << shift;
        if byte < 0x20 {
            break;
        }
        shift += 5;
        if shift > 60 {
            return None;
        }
    }
    Some((result >> 1) ^ -(result & 1))
}
