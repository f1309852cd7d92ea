use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the headless driver.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },

    #[error(transparent)]
    Render(#[from] mandelview_render::RenderError),

    #[error(transparent)]
    Core(#[from] mandelview_core::CoreError),
}

pub type Result<T> = std::result::Result<T, AppError>;
