#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub max_file_size: usize,
    pub simplify_epsilon: f64,
    pub max_track_points: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: 25 * 1024 * 1024,
            simplify_epsilon: crate::pipeline::simplify::DEFAULT_EPSILON,
            max_track_points: 200_000,
        }
    }
}

impl IngestConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_file_size_mb: Option<usize> = std::env::var("MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok());

        let simplify_epsilon = std::env::var("SIMPLIFY_EPSILON_M")
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|eps| eps.is_finite())
            .unwrap_or(defaults.simplify_epsilon);

        let max_track_points = std::env::var("MAX_TRACK_POINTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_track_points);

        Self {
            max_file_size: max_file_size_mb
                .and_then(|mb| mb.checked_mul(1024 * 1024))
                .unwrap_or(defaults.max_file_size),
            simplify_epsilon,
            max_track_points,
        }
    }
}
