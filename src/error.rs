use thiserror::Error;

/// Contractually invalid query bounds. These are the only failures the core
/// surfaces to callers; malformed data rows are dropped in the loader and
/// external-service failures collapse to empty result sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid year range: start {start} is after end {end}")]
    InvalidYearRange { start: i32, end: i32 },
    #[error("invalid threshold band: min {min} is above max {max}")]
    InvalidThresholdBand { min: u64, max: u64 },
}
