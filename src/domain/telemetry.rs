// Telemetry sample domain model

/// Readings below this are physically impossible for the power meter.
pub const MIN_VALID_WATTS: f64 = -1.0;

/// Accept a raw power reading only if it is present, finite and not below `MIN_VALID_WATTS`.
pub fn validate_sample(raw: Option<f64>) -> Option<f64> {
    match raw {
        Some(watts) if watts.is_finite() && watts >= MIN_VALID_WATTS => Some(watts),
        _ => None,
    }
}
