//! Google Encoded Polyline Algorithm at 1e5 precision.
//!
//! See <https://developers.google.com/maps/documentation/utilities/polylinealgorithm>.
//! Coordinates are rounded to five decimal places before encoding, so a
//! decoded polyline only carries that precision.

use crate::error::PolylineError;
use crate::types::track::{Coordinate, LatLng};

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const ASCII_OFFSET: u8 = 63;
// Seven 5-bit chunks cover every valid delta; more means garbage input.
const MAX_SHIFT: u32 = 30;

pub fn encode<C: Coordinate>(points: &[C]) -> String {
    let mut encoded = String::with_capacity(points.len() * 8);
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for point in points {
        let lat = quantize(point.lat());
        let lng = quantize(point.lon());

        encode_value(lat - prev_lat, &mut encoded);
        encode_value(lng - prev_lng, &mut encoded);

        prev_lat = lat;
        prev_lng = lng;
    }

    encoded
}

pub fn decode(encoded: &str) -> Result<Vec<LatLng>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut pos = 0;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while pos < bytes.len() {
        let lat_offset = pos;
        lat += decode_value(bytes, &mut pos)?;

        if pos >= bytes.len() {
            return Err(PolylineError::MissingLongitude { offset: lat_offset });
        }
        lng += decode_value(bytes, &mut pos)?;

        points.push(LatLng::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

fn quantize(degrees: f64) -> i64 {
    (degrees * PRECISION).round() as i64
}

fn encode_value(value: i64, out: &mut String) {
    let mut zigzag = if value < 0 { !(value << 1) } else { value << 1 };

    while zigzag >= CONTINUATION {
        out.push(chunk_char((CONTINUATION | (zigzag & CHUNK_MASK)) as u8));
        zigzag >>= CHUNK_BITS;
    }
    out.push(chunk_char(zigzag as u8));
}

fn chunk_char(chunk: u8) -> char {
    char::from(chunk + ASCII_OFFSET)
}

fn decode_value(bytes: &[u8], pos: &mut usize) -> Result<i64, PolylineError> {
    let start = *pos;
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*pos) else {
            return Err(PolylineError::Truncated { offset: start });
        };
        if !(ASCII_OFFSET..=ASCII_OFFSET + 0x3f).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                offset: *pos,
                byte,
            });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { offset: start });
        }

        let chunk = i64::from(byte - ASCII_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        *pos += 1;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
