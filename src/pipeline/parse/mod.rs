pub mod fit;
pub mod gpx;

use crate::error::ParseError;
use crate::types::track::{mime_essence, FileFormat, ParsedTrack};

pub use fit::{FitHeader, FitParser};
pub use gpx::GpxParser;

pub trait Parser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrack, ParseError>;
}

const GENERIC_CONTENT_TYPES: &[&str] = &["application/octet-stream", "binary/octet-stream", ""];

/// Parses an uploaded buffer, choosing the format from the declared content
/// type when it names one and from the buffer contents otherwise.
pub fn parse(bytes: &[u8], content_type: Option<&str>) -> Result<ParsedTrack, ParseError> {
    let format = detect_format(bytes, content_type)?;
    parse_as(bytes, format)
}

/// Like [`parse`], but keyed on the uploaded file name.
pub fn parse_named(bytes: &[u8], filename: &str) -> Result<ParsedTrack, ParseError> {
    let format = FileFormat::from_filename(filename)
        .or_else(|| FileFormat::sniff(bytes))
        .ok_or_else(|| ParseError::UnsupportedFormat(filename.to_string()))?;
    parse_as(bytes, format)
}

pub fn parse_as(bytes: &[u8], format: FileFormat) -> Result<ParsedTrack, ParseError> {
    parse_limited(bytes, format, usize::MAX)
}

/// Parses as `format`, failing once more than `max_points` samples are read.
pub fn parse_limited(
    bytes: &[u8],
    format: FileFormat,
    max_points: usize,
) -> Result<ParsedTrack, ParseError> {
    tracing::debug!(format = format.as_str(), size = bytes.len(), "Parsing track");
    match format {
        FileFormat::Gpx => GpxParser::with_max_points(max_points).parse(bytes),
        FileFormat::Fit => FitParser.parse(bytes),
    }
}

pub fn detect_format(bytes: &[u8], content_type: Option<&str>) -> Result<FileFormat, ParseError> {
    if let Some(declared) = content_type {
        if let Some(format) = FileFormat::from_content_type(declared) {
            return Ok(format);
        }

        let essence = mime_essence(declared);
        let generic = GENERIC_CONTENT_TYPES.contains(&essence.as_str());
        if !generic {
            return Err(ParseError::UnsupportedFormat(declared.to_string()));
        }
    }

    FileFormat::sniff(bytes).ok_or_else(|| {
        ParseError::UnsupportedFormat(
            content_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or("unrecognized content")
                .to_string(),
        )
    })
}
