//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Glyph path data could not be parsed.
    #[error("Invalid glyph path: {0}")]
    PathParse(String),

    /// Surface creation or resize failed.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Capture encoding failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// The render loop task ended abnormally.
    #[error("Render loop task failed: {0}")]
    Task(String),
}
