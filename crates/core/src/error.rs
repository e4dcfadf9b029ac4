//! Error taxonomy for a single game step.

/// Every way a step can fail before an action reaches the caller.
///
/// The `Display` output is what the HTTP layer returns to the client, so no
/// variant ever carries raw model output.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A required setting (the inference credential) is absent.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The completion API could not be reached or returned a non-success status.
    #[error("Inference request failed: {0}")]
    UpstreamTransport(String),
    /// No JSON object with a `type` field survived extraction and repair.
    #[error("Model returned an unparseable response")]
    Parse,
    /// The action object was missing a field it needs, or the field was empty.
    #[error("Model action is missing required field '{0}'")]
    MissingField(&'static str),
    /// The action object carried a `type` that is not ask/guess/final.
    #[error("Model returned an unknown action type '{0}'")]
    InvalidType(String),
}
