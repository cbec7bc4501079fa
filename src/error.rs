//! Error types for remixer.

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end a run.
///
/// All variants are terminal: there is no partial-success mode.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad command-line input that the argument parser could not catch.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Inputs that cannot produce a remix (missing file, no video stream,
    /// nothing long enough for a single sample).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// External tool failure at the probe, extract, or concat stage, or
    /// filesystem trouble around it.
    #[error(transparent)]
    ExternalTool(#[from] remixer_av::Error),
}
