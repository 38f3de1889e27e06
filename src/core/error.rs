use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
///
/// Note that the capture path itself never surfaces errors: decode and
/// extraction failures are swallowed per the containment contract, so this
/// enum only covers configuration and export-time failures.
#[derive(Debug, Error)]
pub enum PagetapError {
    /// A URL match pattern failed to compile.
    #[error("invalid URL pattern `{pattern}`: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// The underlying regex error.
        source: regex::Error,
    },

    /// A record could not be serialized at export time.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The session or config was assembled with invalid inputs.
    #[error("invalid configuration: {0}")]
    Config(String),
}
