use thiserror::Error;

/// Errors originating from the core geometry types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid canvas: {width}×{height} (both dimensions must be > 0)")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },
}
