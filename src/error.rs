//! Error taxonomy shared by the session, tree and profile layers.
//!
//! Every failure carries a human-readable message meant to be shown to the
//! user as-is. Nothing here is fatal to the process.

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

/// Errors that can occur while browsing a store
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// Malformed endpoint or profile
    #[error("configuration error: {0}")]
    Config(String),

    /// Credentials rejected by the store
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport failure, timeout or unreachable endpoint
    #[error("network error: {0}")]
    Network(String),

    /// Bucket, key or profile absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Empty or invalid user-supplied value
    #[error("invalid input: {0}")]
    Validation(String),

    /// Stored record could not be decoded
    #[error("failed to parse {0}")]
    Parse(String),

    /// Local file system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;

const NOT_FOUND_CODES: &[&str] = &["NoSuchBucket", "NoSuchKey", "NotFound"];
const AUTH_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "AccessDenied",
    "InvalidToken",
];

impl BrowserError {
    /// Classify an SDK failure. `action` names what was attempted, e.g.
    /// "list objects in docs".
    pub fn from_sdk<E>(action: &str, err: SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        let message = format!("failed to {}: {}", action, DisplayErrorContext(&err));

        match &err {
            SdkError::ConstructionFailure(_) => BrowserError::Config(message),
            SdkError::DispatchFailure(_)
            | SdkError::TimeoutError(_)
            | SdkError::ResponseError(_) => BrowserError::Network(message),
            SdkError::ServiceError(service) => classify_service(
                service.err().code(),
                service.raw().status().as_u16(),
                message,
            ),
            _ => BrowserError::Network(message),
        }
    }

    /// Short category name, used by the shell as a message prefix
    pub fn kind(&self) -> &'static str {
        match self {
            BrowserError::Config(_) => "config",
            BrowserError::Auth(_) => "auth",
            BrowserError::Network(_) => "network",
            BrowserError::NotFound(_) => "not-found",
            BrowserError::Validation(_) => "validation",
            BrowserError::Parse(_) => "parse",
            BrowserError::Io(_) => "io",
        }
    }
}

/// Map a service error to a category. HEAD responses carry no body, so the
/// HTTP status decides when the service code is missing or unknown.
fn classify_service(code: Option<&str>, status: u16, message: String) -> BrowserError {
    match code {
        Some(code) if NOT_FOUND_CODES.contains(&code) => BrowserError::NotFound(message),
        Some(code) if AUTH_CODES.contains(&code) => BrowserError::Auth(message),
        _ => match status {
            404 => BrowserError::NotFound(message),
            401 | 403 => BrowserError::Auth(message),
            _ => BrowserError::Network(message),
        },
    }
}
