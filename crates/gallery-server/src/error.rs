use thiserror::Error;

/// Service-side failure taxonomy. Every variant is flattened to the same
/// generic 500 body on the wire; the variant only matters for the server log.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or unusable deployment configuration; not retryable without
    /// operator intervention.
    #[error("configuration error: {0}")]
    Config(String),

    /// Could not obtain an access token from the credential service.
    #[error("credential exchange failed: {0}")]
    Credentials(String),

    /// The storage provider's listing call failed; the caller may retry
    /// later.
    #[error("upstream listing failed: {0}")]
    Upstream(String),
}
