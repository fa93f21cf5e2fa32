/// Errors that can occur while compiling a notify strategy document.
///
/// Only structural problems with the raw document are fatal. Malformed
/// relation references and operator-less expressions are tolerated and
/// logged instead, so a partially sloppy strategy still compiles.
///
/// # Examples
///
/// ```rust
/// use argus_strategy::error::StrategyError;
///
/// let err = StrategyError::Shape("`action` must be a string-to-string map".to_string());
/// assert!(err.to_string().contains("action"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    /// The raw document is not well-formed JSON.
    #[error("strategy: document is not well-formed JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// A field is present but does not have the expected scalar or
    /// container shape, or a required field is missing.
    #[error("strategy: unexpected document shape: {0}")]
    Shape(String),
}

/// Convenience `Result` alias for strategy compilation.
pub type Result<T> = std::result::Result<T, StrategyError>;
