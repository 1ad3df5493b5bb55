use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::track::{FileFormat, GpsPoint, ParsedTrack};
use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parses GPX 1.0/1.1 documents. Every `<trkpt>` of every track and segment
/// is collected in document order.
pub struct GpxParser {
    max_points: usize,
}

impl Default for GpxParser {
    fn default() -> Self {
        Self {
            max_points: usize::MAX,
        }
    }
}

impl GpxParser {
    pub fn with_max_points(max_points: usize) -> Self {
        Self { max_points }
    }
}

impl Parser for GpxParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrack, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut points = Vec::new();
        let mut skipped = 0usize;
        let mut in_trkpt = false;
        let mut current_point: Option<GpsPoint> = None;
        let mut current_element = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = local_name(&e)?;
                    if name == "trkpt" {
                        in_trkpt = true;
                        current_point = point_from_attributes(&e)?;
                        if current_point.is_none() {
                            skipped += 1;
                        }
                    } else if in_trkpt {
                        current_element = name;
                    }
                }
                Ok(Event::Empty(e)) => {
                    if local_name(&e)? == "trkpt" {
                        match point_from_attributes(&e)? {
                            Some(point) => points.push(point),
                            None => skipped += 1,
                        }
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(point) = current_point.as_mut() {
                        let text = e
                            .unescape()
                            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                        apply_field(point, &current_element, text.trim());
                    }
                }
                Ok(Event::End(e)) => {
                    let name = e.local_name();
                    if name.as_ref() == b"trkpt" {
                        if let Some(point) = current_point.take() {
                            points.push(point);
                        }
                        in_trkpt = false;
                    }
                    current_element.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
                _ => {}
            }

            if points.len() > self.max_points {
                return Err(ParseError::InvalidGpx(format!(
                    "too many track points (limit {})",
                    self.max_points
                )));
            }
            buf.clear();
        }

        if skipped > 0 {
            tracing::debug!(skipped, "Skipped track points without usable coordinates");
        }

        ParsedTrack::from_points(FileFormat::Gpx, points)
    }
}

fn local_name(e: &BytesStart) -> Result<String, ParseError> {
    std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| ParseError::InvalidGpx(e.to_string()))
}

/// Builds a point from the `lat`/`lon` attributes, in whatever order they
/// appear. Returns `None` when either is missing or not a valid coordinate.
fn point_from_attributes(e: &BytesStart) -> Result<Option<GpsPoint>, ParseError> {
    let mut lat = None;
    let mut lon = None;

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
        let value = std::str::from_utf8(&attr.value)
            .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

        match attr.key.local_name().as_ref() {
            b"lat" => lat = value.trim().parse::<f64>().ok(),
            b"lon" => lon = value.trim().parse::<f64>().ok(),
            _ => {}
        }
    }

    let point = match (lat, lon) {
        (Some(lat), Some(lon)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) => {
            Some(GpsPoint::new(lat, lon))
        }
        _ => None,
    };

    Ok(point)
}

fn apply_field(point: &mut GpsPoint, element: &str, text: &str) {
    match element {
        "ele" => point.elevation = text.parse().ok(),
        "time" => point.timestamp = parse_time(text),
        "hr" | "heartrate" => point.heart_rate = text.parse().ok(),
        "cad" | "cadence" => point.cadence = text.parse().ok(),
        "power" | "watts" => point.power = text.parse().ok(),
        "atemp" | "temp" => point.temperature = text.parse().ok(),
        _ => {}
    }
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    text.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    })
}
