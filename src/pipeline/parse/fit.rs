use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::track::{FileFormat, GpsPoint, ParsedTrack};

pub const MIN_HEADER_LEN: usize = 12;
const SIGNATURE: &[u8; 4] = b".FIT";

/// The fixed file header that precedes a FIT message stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitHeader {
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    pub data_size: u32,
    pub has_signature: bool,
}

impl FitHeader {
    pub fn read(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() < MIN_HEADER_LEN {
            return Err(ParseError::TooShort {
                len: bytes.len(),
                min: MIN_HEADER_LEN,
            });
        }

        let header_size = bytes[0];
        if header_size != 12 && header_size != 14 {
            return Err(ParseError::InvalidHeader(format!(
                "FIT header size must be 12 or 14, got {}",
                header_size
            )));
        }

        Ok(Self {
            header_size,
            protocol_version: bytes[1],
            profile_version: u16::from_le_bytes([bytes[2], bytes[3]]),
            data_size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            has_signature: &bytes[8..12] == SIGNATURE,
        })
    }
}

/// Reads FIT activity files: header check, then the record stream.
///
/// Record decoding is only compiled in with the `fit-records` feature.
/// Without it a well-formed header yields [`ParseError::NotImplemented`].
pub struct FitParser;

impl Parser for FitParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrack, ParseError> {
        let header = FitHeader::read(bytes)?;
        tracing::debug!(
            header_size = header.header_size,
            protocol = header.protocol_version,
            profile = header.profile_version,
            data_size = header.data_size,
            "Read FIT header"
        );

        let points = decode_records(bytes, &header)?;
        ParsedTrack::from_points(FileFormat::Fit, points)
    }
}

#[cfg(not(feature = "fit-records"))]
fn decode_records(_bytes: &[u8], _header: &FitHeader) -> Result<Vec<GpsPoint>, ParseError> {
    Err(ParseError::NotImplemented(
        "FIT record decoding; upload a GPX file instead",
    ))
}

#[cfg(feature = "fit-records")]
fn decode_records(bytes: &[u8], _header: &FitHeader) -> Result<Vec<GpsPoint>, ParseError> {
    use chrono::DateTime;
    use fitparser::profile::MesgNum;
    use fitparser::Value;

    let data = fitparser::from_bytes(bytes)
        .map_err(|e| ParseError::InvalidFit(format!("Failed to parse FIT file: {}", e)))?;

    let mut points = Vec::new();

    for record in data {
        if record.kind() != MesgNum::Record {
            continue;
        }

        let mut point = GpsPoint::new(0.0, 0.0);
        let mut has_lat = false;
        let mut has_lon = false;

        for field in record.fields() {
            match (field.name(), field.value()) {
                ("position_lat", Value::SInt32(val)) => {
                    point.lat = semicircles_to_degrees(*val);
                    has_lat = true;
                }
                ("position_long", Value::SInt32(val)) => {
                    point.lon = semicircles_to_degrees(*val);
                    has_lon = true;
                }
                ("altitude" | "enhanced_altitude", Value::Float64(val)) => {
                    point.elevation = Some(*val);
                }
                ("timestamp", Value::Timestamp(val)) => {
                    point.timestamp = DateTime::from_timestamp(val.timestamp(), 0);
                }
                ("heart_rate", Value::UInt8(val)) => point.heart_rate = Some(u16::from(*val)),
                ("cadence", Value::UInt8(val)) => point.cadence = Some(u16::from(*val)),
                ("power", Value::UInt16(val)) => point.power = Some(*val),
                ("temperature", Value::SInt8(val)) => point.temperature = Some(f32::from(*val)),
                _ => {}
            }
        }

        if has_lat && has_lon {
            points.push(point);
        }
    }

    Ok(points)
}

/// FIT stores positions as semicircles: 2^31 of them span 180 degrees.
pub fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}
