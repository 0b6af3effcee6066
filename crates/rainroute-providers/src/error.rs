//! Provider-boundary error taxonomy.

use thiserror::Error;

/// Errors surfaced by the external provider clients.
///
/// Only the structural variants (`MissingCredential`, `PlaceNotFound`,
/// `NoRoute`) reach the user. Weather-side failures are absorbed by the
/// weather service and degrade to neutral bundles instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("could not resolve place: {0:?}")]
    PlaceNotFound(String),

    #[error("no route found between the given places")]
    NoRoute,

    #[error("provider returned HTTP {0}")]
    Http(reqwest::StatusCode),

    #[error("provider rejected the request: {0}")]
    ApiStatus(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed provider payload: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Transient errors are worth one more attempt; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(status) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            ProviderError::Transport(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}
