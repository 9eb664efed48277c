//! Encoded polyline codec for route geometries.
//!
//! Routing services ship geometry as the standard encoded polyline string:
//! signed deltas from the previous point scaled by 1e5, zigzag-encoded and
//! packed five bits per ASCII character (offset 63), with 0x20 marking that
//! more chunks follow. Decoding happens here, at the boundary; everything
//! past this module works with [`GeoPoint`] sequences.

use serde::Serialize;

use crate::model::GeoPoint;

const PRECISION: f64 = 1e5;
const CHUNK_OFFSET: u8 = 63;
const CONTINUATION: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    points: Vec<GeoPoint>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Decodes an optional encoded string. Missing or malformed input gives
    /// an empty polyline.
    pub fn from_encoded(encoded: Option<&str>) -> Self {
        Self::new(encoded.map(decode).unwrap_or_default())
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Encodes the points at five decimal digits of precision.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let (mut prev_lat, mut prev_lng) = (0i64, 0i64);

        for point in &self.points {
            let lat = scale(point.lat);
            let lng = scale(point.lng);
            encode_value(lat - prev_lat, &mut out);
            encode_value(lng - prev_lng, &mut out);
            prev_lat = lat;
            prev_lng = lng;
        }

        out
    }
}

/// Decodes an encoded polyline string.
///
/// Returns an empty sequence for empty or malformed input: bytes outside the
/// encoding alphabet, a value cut off mid-continuation, a latitude without
/// its longitude, or a value or running coordinate that overflows 64 bits.
pub fn decode(encoded: &str) -> Vec<GeoPoint> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut cursor = 0;
    let (mut lat, mut lng) = (0i64, 0i64);

    while cursor < bytes.len() {
        let Some(delta_lat) = next_value(bytes, &mut cursor) else {
            return Vec::new();
        };
        let Some(delta_lng) = next_value(bytes, &mut cursor) else {
            return Vec::new();
        };

        let (Some(next_lat), Some(next_lng)) =
            (lat.checked_add(delta_lat), lng.checked_add(delta_lng))
        else {
            return Vec::new();
        };
        lat = next_lat;
        lng = next_lng;
        points.push(GeoPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    points
}

fn next_value(bytes: &[u8], cursor: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*cursor)?;
        if !(CHUNK_OFFSET..=b'~').contains(&byte) {
            return None;
        }
        if shift >= 64 {
            return None;
        }
        *cursor += 1;

        let chunk = i64::from(byte - CHUNK_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    Some(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn scale(coordinate: f64) -> i64 {
    (coordinate * PRECISION).round() as i64
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= CONTINUATION {
        out.push(char::from(((CONTINUATION | (v & CHUNK_MASK)) as u8) + CHUNK_OFFSET));
        v >>= 5;
    }
    out.push(char::from(v as u8 + CHUNK_OFFSET));
}
