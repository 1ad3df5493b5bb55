use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::pipeline::geo::haversine_distance;

/// Anything carrying a WGS84 position in decimal degrees.
pub trait Coordinate {
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GpsPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            timestamp: None,
            elevation: None,
            heart_rate: None,
            cadence: None,
            power: None,
            temperature: None,
        }
    }

    pub fn to_lat_lng(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lon,
        }
    }
}

impl Coordinate for GpsPoint {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

/// Bare coordinate pair carried by encoded polylines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl Coordinate for LatLng {
    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lng
    }
}

impl From<&GpsPoint> for LatLng {
    fn from(point: &GpsPoint) -> Self {
        point.to_lat_lng()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Gpx,
    Fit,
}

impl FileFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_lowercase().as_str() {
            "gpx" => Some(FileFormat::Gpx),
            "fit" => Some(FileFormat::Fit),
            _ => None,
        }
    }

    /// Maps a declared MIME type to a format. Parameters such as
    /// `; charset=utf-8` are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match mime_essence(content_type).as_str() {
            "application/gpx+xml" | "application/gpx" | "application/xml" | "text/xml" => {
                Some(FileFormat::Gpx)
            }
            "application/vnd.ant.fit" | "application/fit" | "application/x-fit" => {
                Some(FileFormat::Fit)
            }
            _ => None,
        }
    }

    /// Guesses the format from the leading bytes of a buffer.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.len() >= 12 && &bytes[8..12] == b".FIT" {
            return Some(FileFormat::Fit);
        }

        let text = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let start = text.iter().position(|b| !b.is_ascii_whitespace())?;
        let text = &text[start..];
        if text.starts_with(b"<?xml") || text.starts_with(b"<gpx") {
            return Some(FileFormat::Gpx);
        }

        None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Gpx => "gpx",
            FileFormat::Fit => "fit",
        }
    }
}

/// A track with its derived motion metrics.
///
/// The parsers build it through [`ParsedTrack::from_points`], which rejects
/// fewer than two points, zero distance and zero duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedTrack {
    pub format: FileFormat,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Whole seconds between the first and last point.
    pub duration: u64,
    /// Meters, summed pairwise along `gps_track`.
    pub distance: f64,
    pub gps_track: Vec<GpsPoint>,
}

impl ParsedTrack {
    pub fn from_points(format: FileFormat, points: Vec<GpsPoint>) -> Result<Self, ParseError> {
        if points.len() < 2 {
            return Err(ParseError::InsufficientPoints(points.len()));
        }

        let mut last_seen: Option<DateTime<Utc>> = None;
        for (index, point) in points.iter().enumerate() {
            if let Some(time) = point.timestamp {
                if last_seen.is_some_and(|prev| time < prev) {
                    return Err(ParseError::TimestampOutOfOrder { index });
                }
                last_seen = Some(time);
            }
        }

        let distance = track_distance(&points);
        if distance <= 0.0 {
            return Err(ParseError::ZeroDistance);
        }

        let (Some(start_time), Some(end_time)) = (
            points.first().and_then(|p| p.timestamp),
            points.last().and_then(|p| p.timestamp),
        ) else {
            return Err(ParseError::MissingTimestamps);
        };

        let duration = (end_time - start_time).num_seconds();
        if duration <= 0 {
            return Err(ParseError::ZeroDuration);
        }
        let duration = duration as u64;

        Ok(Self {
            format,
            start_time,
            end_time,
            duration,
            distance,
            gps_track: points,
        })
    }

    /// Seconds per kilometer, `None` when no distance was covered.
    pub fn avg_pace(&self) -> Option<f64> {
        pace(self.duration, self.distance)
    }

    pub fn avg_speed_kmh(&self) -> f64 {
        (self.distance / 1000.0) / (self.duration as f64) * 3600.0
    }
}

/// Lowercased MIME type with any `;` parameters removed.
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

pub fn track_distance(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon))
        .sum()
}

fn pace(duration: u64, distance: f64) -> Option<f64> {
    if distance > 0.0 {
        Some(duration as f64 / (distance / 1000.0))
    } else {
        None
    }
}
