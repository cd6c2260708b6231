use thiserror::Error;

/// Why a page fetch failed, as seen by the widget. Transport failures,
/// non-2xx statuses, and malformed bodies all land in the same visible error
/// state with a manual retry affordance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Malformed(String),
}
