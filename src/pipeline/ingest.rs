use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::IngestConfig;
use crate::error::{IngestError, ParseError};
use crate::pipeline::parse;
use crate::pipeline::{polyline, simplify};
use crate::types::track::{FileFormat, LatLng, ParsedTrack};

/// What the storage layer persists for one uploaded workout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestedWorkout {
    pub format: FileFormat,
    pub start_time: DateTime<Utc>,
    pub duration: u64,
    pub distance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_pace: Option<f64>,
    pub avg_speed_kmh: f64,
    pub polyline: String,
    pub original_points: usize,
    pub simplified_points: usize,
}

#[derive(Debug, Clone)]
pub struct Ingestor {
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn parse(&self, bytes: &[u8], content_type: Option<&str>) -> Result<ParsedTrack, IngestError> {
        if bytes.len() > self.config.max_file_size {
            return Err(IngestError::TooLarge {
                size: bytes.len(),
                limit: self.config.max_file_size,
            });
        }

        let format = parse::detect_format(bytes, content_type)?;
        parse::parse_limited(bytes, format, self.config.max_track_points).map_err(
            |err: ParseError| {
                tracing::warn!(format = format.as_str(), kind = err.kind(), "Rejected upload: {}", err);
                IngestError::from(err)
            },
        )
    }

    pub fn ingest(&self, bytes: &[u8], content_type: Option<&str>) -> Result<IngestedWorkout, IngestError> {
        let track = self.parse(bytes, content_type)?;
        Ok(self.summarize(&track))
    }

    /// Simplifies and encodes an already parsed track.
    pub fn summarize(&self, track: &ParsedTrack) -> IngestedWorkout {
        let simplified = simplify::simplify(&track.gps_track, self.config.simplify_epsilon);
        let encoded = polyline::encode(&simplified);

        tracing::info!(
            "Ingested {} track: {} -> {} points, {:.0} m in {} s",
            track.format.as_str(),
            track.gps_track.len(),
            simplified.len(),
            track.distance,
            track.duration
        );

        IngestedWorkout {
            format: track.format,
            start_time: track.start_time,
            duration: track.duration,
            distance: track.distance,
            avg_pace: track.avg_pace(),
            avg_speed_kmh: track.avg_speed_kmh(),
            polyline: encoded,
            original_points: track.gps_track.len(),
            simplified_points: simplified.len(),
        }
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

/// Rendering path: turns a stored polyline back into drawable coordinates.
pub fn decode_route(encoded: &str) -> Result<Vec<LatLng>, IngestError> {
    Ok(polyline::decode(encoded)?)
}
