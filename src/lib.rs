//! GPS workout ingestion: format detection, GPX/FIT parsing, motion metrics,
//! Douglas-Peucker simplification and encoded polylines.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::IngestConfig;
pub use error::{IngestError, ParseError, PolylineError};
pub use pipeline::ingest::{decode_route, IngestedWorkout, Ingestor};
pub use pipeline::parse::{parse, parse_named};
pub use types::track::{Coordinate, FileFormat, GpsPoint, LatLng, ParsedTrack};

/// Installs a global fmt subscriber filtered by `RUST_LOG`, defaulting to
/// `workout_ingest=info`. Does nothing if a subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workout_ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
