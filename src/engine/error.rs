use thiserror::Error;

/// Configuration problems detected before a grid sweep starts.
///
/// Numeric trouble during iteration (near-zero denominators, overflow) is
/// never reported here; it is epsilon-guarded or propagates as NaN/inf.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid grid size {0}: must be at least 2")]
    InvalidGridSize(usize),
    #[error("Invalid max iterations {0}: must be at least 1")]
    InvalidMaxIterations(u32),
    #[error("Invalid escape radius {0}: must be positive and finite")]
    InvalidEscapeRadius(f64),
    #[error("Invalid zoom {0}: must be finite")]
    InvalidZoom(f64),
    #[error("Grid size {0} is too large to address its buffers")]
    GridTooLarge(usize),
    #[error("Output buffer '{buffer}' has length {actual}, expected {expected}")]
    BufferLength {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
}
