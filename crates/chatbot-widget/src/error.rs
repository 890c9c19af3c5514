use thiserror::Error;

/// Failure of a single widget → relay exchange.
///
/// The widget never shows these to the user; any variant is replaced by
/// [`chatbot_types::ERROR_APOLOGY`].
#[derive(Debug, Error)]
pub enum RelayError {
    /// The relay could not be reached or the body could not be read.
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with a non-2xx status.
    #[error("relay returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The relay answered 2xx but without a `reply` field.
    #[error("invalid relay response: {0}")]
    InvalidResponse(String),
}

/// Errors raised while packaging the standalone widget script.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to encode bundle data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid dependency source '{0}': must be an absolute http(s) URL")]
    InvalidDependency(String),
}
