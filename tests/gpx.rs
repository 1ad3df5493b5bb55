use chrono::{TimeZone, Utc};
use workout_ingest::pipeline::parse::{GpxParser, Parser};
use workout_ingest::{FileFormat, ParseError};

fn gpx(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1"
     xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
  <trk><name>Morning Run</name>{body}</trk>
</gpx>"#
    )
}

fn parse(doc: &str) -> Result<workout_ingest::ParsedTrack, ParseError> {
    GpxParser::default().parse(doc.as_bytes())
}

#[test]
fn empty_segment_is_rejected() {
    let err = parse(&gpx("<trkseg></trkseg>")).unwrap_err();
    assert!(matches!(err, ParseError::InsufficientPoints(0)), "{err:?}");
}

#[test]
fn single_point_is_rejected() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="37.7749" lon="-122.4194"><time>2024-05-01T07:00:00Z</time></trkpt>
    </trkseg>"#);
    let err = parse(&doc).unwrap_err();
    assert!(matches!(err, ParseError::InsufficientPoints(1)), "{err:?}");
}

#[test]
fn two_points_about_a_kilometer_apart() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="37.7749" lon="-122.4194"><ele>12.5</ele><time>2024-05-01T07:00:00Z</time></trkpt>
        <trkpt lat="37.7839" lon="-122.4194"><ele>20.0</ele><time>2024-05-01T07:05:00Z</time></trkpt>
    </trkseg>"#);

    let track = parse(&doc).expect("track");
    assert_eq!(track.format, FileFormat::Gpx);
    assert_eq!(track.gps_track.len(), 2);
    assert!(track.distance > 900.0 && track.distance < 1100.0, "{}", track.distance);
    assert_eq!(track.duration, 300);
    assert_eq!(track.start_time, Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap());
    assert_eq!(track.end_time, Utc.with_ymd_and_hms(2024, 5, 1, 7, 5, 0).unwrap());
    assert_eq!(track.gps_track[0].elevation, Some(12.5));

    let pace = track.avg_pace().expect("pace");
    assert!((pace - 300.0 / (track.distance / 1000.0)).abs() < 1e-9);
    assert!(pace > 270.0 && pace < 330.0);
}

#[test]
fn attribute_order_does_not_matter() {
    let lat_first = gpx(r#"<trkseg>
        <trkpt lat="37.7749" lon="-122.4194"><time>2024-05-01T07:00:00Z</time></trkpt>
        <trkpt lat="37.7760" lon="-122.4180"><time>2024-05-01T07:01:00Z</time></trkpt>
    </trkseg>"#);
    let lon_first = gpx(r#"<trkseg>
        <trkpt lon="-122.4194" lat="37.7749"><time>2024-05-01T07:00:00Z</time></trkpt>
        <trkpt lon="-122.4180" lat="37.7760"><time>2024-05-01T07:01:00Z</time></trkpt>
    </trkseg>"#);

    let a = parse(&lat_first).expect("lat first");
    let b = parse(&lon_first).expect("lon first");
    assert_eq!(a.gps_track, b.gps_track);
    assert_eq!(a.gps_track[0].lat, 37.7749);
    assert_eq!(a.gps_track[0].lon, -122.4194);
}

#[test]
fn segments_and_tracks_are_flattened_in_order() {
    let doc = r#"<?xml version="1.0"?>
<gpx version="1.1" creator="test">
  <trk><trkseg>
    <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:00:00Z</time></trkpt>
    <trkpt lat="52.5205" lon="13.4060"><time>2024-05-01T07:00:10Z</time></trkpt>
  </trkseg><trkseg>
    <trkpt lat="52.5210" lon="13.4070"><time>2024-05-01T07:00:20Z</time></trkpt>
  </trkseg></trk>
  <trk><trkseg>
    <trkpt lat="52.5215" lon="13.4080"><time>2024-05-01T07:00:30Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;

    let track = parse(doc).expect("track");
    let lats: Vec<f64> = track.gps_track.iter().map(|p| p.lat).collect();
    assert_eq!(lats, vec![52.5200, 52.5205, 52.5210, 52.5215]);
    assert_eq!(track.duration, 30);
}

#[test]
fn sensor_extensions_are_read() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:00:00Z</time>
          <extensions><gpxtpx:TrackPointExtension>
            <gpxtpx:hr>140</gpxtpx:hr><gpxtpx:cad>88</gpxtpx:cad><gpxtpx:atemp>21.5</gpxtpx:atemp>
          </gpxtpx:TrackPointExtension><power>250</power></extensions>
        </trkpt>
        <trkpt lat="52.5205" lon="13.4060"><time>2024-05-01T07:00:10Z</time></trkpt>
    </trkseg>"#);

    let track = parse(&doc).expect("track");
    let first = &track.gps_track[0];
    assert_eq!(first.heart_rate, Some(140));
    assert_eq!(first.cadence, Some(88));
    assert_eq!(first.temperature, Some(21.5));
    assert_eq!(first.power, Some(250));

    let second = &track.gps_track[1];
    assert_eq!(second.heart_rate, None);
    assert_eq!(second.elevation, None);
}

#[test]
fn points_without_usable_coordinates_are_skipped() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:00:00Z</time></trkpt>
        <trkpt lat="abc" lon="13.4055"><time>2024-05-01T07:00:05Z</time></trkpt>
        <trkpt lat="95.0" lon="13.4055"><time>2024-05-01T07:00:06Z</time></trkpt>
        <trkpt lon="13.4058"><time>2024-05-01T07:00:07Z</time></trkpt>
        <trkpt lat="52.5205" lon="13.4060"><time>2024-05-01T07:00:10Z</time></trkpt>
    </trkseg>"#);

    let track = parse(&doc).expect("track");
    assert_eq!(track.gps_track.len(), 2);
    assert_eq!(track.duration, 10);
}

#[test]
fn timestamps_without_offset_are_utc() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:00:00</time></trkpt>
        <trkpt lat="52.5205" lon="13.4060"><time>2024-05-01T07:00:42.500</time></trkpt>
    </trkseg>"#);

    let track = parse(&doc).expect("track");
    assert_eq!(track.start_time, Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap());
    assert_eq!(track.duration, 42);
}

#[test]
fn self_closing_points_without_time_are_rejected() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="52.5200" lon="13.4050"/>
        <trkpt lat="52.5205" lon="13.4060"/>
    </trkseg>"#);

    let err = parse(&doc).unwrap_err();
    assert!(matches!(err, ParseError::MissingTimestamps), "{err:?}");
}

#[test]
fn timestamps_going_backwards_are_rejected() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:00:10Z</time></trkpt>
        <trkpt lat="52.5205" lon="13.4060"><time>2024-05-01T07:00:00Z</time></trkpt>
        <trkpt lat="52.5210" lon="13.4070"><time>2024-05-01T07:00:20Z</time></trkpt>
    </trkseg>"#);

    let err = parse(&doc).unwrap_err();
    assert!(matches!(err, ParseError::TimestampOutOfOrder { index: 1 }), "{err:?}");
}

#[test]
fn stationary_track_is_rejected() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:00:00Z</time></trkpt>
        <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:10:00Z</time></trkpt>
    </trkseg>"#);

    let err = parse(&doc).unwrap_err();
    assert!(matches!(err, ParseError::ZeroDistance), "{err:?}");
}

#[test]
fn track_without_elapsed_time_is_rejected() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:00:00Z</time></trkpt>
        <trkpt lat="52.5205" lon="13.4060"><time>2024-05-01T07:00:00Z</time></trkpt>
    </trkseg>"#);

    let err = parse(&doc).unwrap_err();
    assert!(matches!(err, ParseError::ZeroDuration), "{err:?}");
}

#[test]
fn malformed_xml_is_rejected() {
    let doc = r#"<gpx><trk><trkseg><trkpt lat="1" lon="2"></trkseg></trk></gpx>"#;
    let err = parse(doc).unwrap_err();
    assert!(matches!(err, ParseError::InvalidGpx(_)), "{err:?}");
}

#[test]
fn point_limit_is_enforced() {
    let doc = gpx(r#"<trkseg>
        <trkpt lat="52.5200" lon="13.4050"><time>2024-05-01T07:00:00Z</time></trkpt>
        <trkpt lat="52.5205" lon="13.4060"><time>2024-05-01T07:00:10Z</time></trkpt>
        <trkpt lat="52.5210" lon="13.4070"><time>2024-05-01T07:00:20Z</time></trkpt>
    </trkseg>"#);

    let err = GpxParser::with_max_points(2).parse(doc.as_bytes()).unwrap_err();
    assert!(matches!(err, ParseError::InvalidGpx(_)), "{err:?}");
    assert!(GpxParser::with_max_points(3).parse(doc.as_bytes()).is_ok());
}
