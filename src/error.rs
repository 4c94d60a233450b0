use thiserror::Error;

/// Failure surface for the activity service client. Construction problems,
/// remote call problems, payload problems, and empty lookups each get their
/// own variant so callers can tell them apart.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to connect to activity service: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned status {status}")]
    Status { status: u16, body: String },

    #[error("SOAP fault: {0}")]
    Fault(String),

    #[error("malformed response envelope: {0}")]
    Envelope(String),

    #[error("failed to decode JSON payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("activity {0} not found")]
    NotFound(i64),
}
