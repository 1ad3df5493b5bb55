pub mod geo;
pub mod ingest;
pub mod parse;
pub mod polyline;
pub mod simplify;
