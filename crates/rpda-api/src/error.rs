//! Errors raised while building the REST client.
//!
//! Request-time failures are reported as `rpda_core::GatewayError`.

use thiserror::Error;

/// Client construction failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The appliance URL could not be parsed or joined with the API path.
    #[error("invalid appliance url '{value}'")]
    InvalidUrl {
        /// Offending URL.
        value: String,
        /// Parse error detail.
        source: url::ParseError,
    },
    /// A default header value contained characters HTTP does not allow.
    #[error("invalid value for header '{header}'")]
    InvalidHeader {
        /// Header name.
        header: &'static str,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Build {
        /// Source client error.
        source: reqwest::Error,
    },
}

/// Convenience alias for client construction results.
pub type ApiResult<T> = Result<T, ApiError>;
