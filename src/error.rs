use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("File too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Insufficient track points (need at least 2, got {0})")]
    InsufficientPoints(usize),
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("Not yet implemented: {0}")]
    NotImplemented(&'static str),
    #[error("Invalid GPX: {0}")]
    InvalidGpx(String),
    #[error("Invalid FIT: {0}")]
    InvalidFit(String),
    #[error("Track covers no distance")]
    ZeroDistance,
    #[error("Track has no start or end timestamp")]
    MissingTimestamps,
    #[error("Track has no elapsed time")]
    ZeroDuration,
    #[error("Timestamp at point {index} is earlier than the one before it")]
    TimestampOutOfOrder { index: usize },
}

impl ParseError {
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::TooShort { .. } => "too_short",
            ParseError::InvalidHeader(_) => "invalid_header",
            ParseError::InsufficientPoints(_) => "insufficient_points",
            ParseError::UnsupportedFormat(_) => "unsupported_format",
            ParseError::NotImplemented(_) => "not_implemented",
            ParseError::InvalidGpx(_) => "invalid_gpx",
            ParseError::InvalidFit(_) => "invalid_fit",
            ParseError::ZeroDistance => "zero_distance",
            ParseError::MissingTimestamps => "missing_timestamps",
            ParseError::ZeroDuration => "zero_duration",
            ParseError::TimestampOutOfOrder { .. } => "timestamp_out_of_order",
        }
    }
}

/// Structural violations found while decoding an encoded polyline.
/// Offsets are byte positions in the input string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolylineError {
    #[error("Malformed polyline: byte {byte:#04x} at offset {offset} is outside the encoding alphabet")]
    InvalidCharacter { offset: usize, byte: u8 },
    #[error("Malformed polyline: value starting at offset {offset} ends without a terminating chunk")]
    Truncated { offset: usize },
    #[error("Malformed polyline: latitude at offset {offset} has no longitude")]
    MissingLongitude { offset: usize },
    #[error("Malformed polyline: value starting at offset {offset} overflows")]
    Overflow { offset: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Polyline(#[from] PolylineError),
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

impl IngestError {
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Parse(err) => err.kind(),
            IngestError::Polyline(_) => "malformed_polyline",
            IngestError::TooLarge { .. } => "too_large",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::Parse(ParseError::NotImplemented(_)) => StatusCode::NOT_IMPLEMENTED,
            IngestError::Parse(ParseError::UnsupportedFormat(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            IngestError::Parse(_) | IngestError::Polyline(_) => StatusCode::BAD_REQUEST,
            IngestError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
