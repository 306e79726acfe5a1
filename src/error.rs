use thiserror::Error;

/// Type alias for Result with CleanupError
pub type Result<T> = std::result::Result<T, CleanupError>;

/// Errors raised while authenticating, searching, and cleaning up a mailbox
///
/// Run-level variants (`AuthError`, `SearchError`, `ConfigError`) abort the run.
/// Item-level variants (`ItemFetchError`, `ItemClassifyError`, `ItemTrashError`)
/// only affect the message they name.
#[derive(Error, Debug)]
pub enum CleanupError {
    /// No usable Gmail session could be obtained
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Candidate messages could not be enumerated
    #[error("Search failed: {0}")]
    SearchError(String),

    /// A single message could not be fetched or its headers decoded
    #[error("Failed to fetch message {id}: {reason}")]
    ItemFetchError { id: String, reason: String },

    /// A single message could not be fully classified (treated as no match)
    #[error("Failed to classify message {id}: {reason}")]
    ItemClassifyError { id: String, reason: String },

    /// A single message could not be moved to trash
    #[error("Failed to trash message {id}: {reason}")]
    ItemTrashError { id: String, reason: String },

    /// Configuration is malformed or has an invalid shape
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Gmail API returned an error
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Rate limit exceeded - should retry after specified seconds
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    /// Network-related error (connection issues, timeouts, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server returned 5xx error
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Resource not found (404)
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// Bad request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden (403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Invalid message format or header decoding error
    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl CleanupError {
    /// Check if the error is transient and the API call should be retried
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CleanupError::RateLimitExceeded { .. }
                | CleanupError::ServerError { .. }
                | CleanupError::NetworkError(_)
        )
    }

    /// Check if the error terminates the whole run rather than a single item
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            CleanupError::ItemFetchError { .. }
                | CleanupError::ItemClassifyError { .. }
                | CleanupError::ItemTrashError { .. }
        )
    }

    /// Wrap an API failure for a specific message as a fetch failure
    pub fn item_fetch(id: &str, source: &CleanupError) -> Self {
        CleanupError::ItemFetchError {
            id: id.to_string(),
            reason: source.to_string(),
        }
    }

    /// Wrap an API failure for a specific message as a category lookup failure
    pub fn item_classify(id: &str, source: &CleanupError) -> Self {
        CleanupError::ItemClassifyError {
            id: id.to_string(),
            reason: source.to_string(),
        }
    }

    /// Wrap an API failure for a specific message as a trash failure
    pub fn item_trash(id: &str, source: &CleanupError) -> Self {
        CleanupError::ItemTrashError {
            id: id.to_string(),
            reason: source.to_string(),
        }
    }
}

/// Parse the Retry-After header from an HTTP response
///
/// The Retry-After header can be specified in two formats:
/// 1. Delay-seconds: An integer indicating seconds to wait (e.g., "120")
/// 2. HTTP-date: An HTTP date format (e.g., "Wed, 21 Oct 2015 07:28:00 GMT")
///
/// Returns the number of seconds to wait. If the header is missing or invalid,
/// returns a default of 5 seconds.
fn parse_retry_after_header<B>(response: &hyper::Response<B>) -> u64 {
    const DEFAULT_RETRY_AFTER: u64 = 5;

    if let Some(retry_after_value) = response.headers().get("retry-after") {
        if let Ok(retry_after_str) = retry_after_value.to_str() {
            if let Ok(seconds) = retry_after_str.parse::<u64>() {
                return seconds;
            }

            if let Ok(http_date) = httpdate::parse_http_date(retry_after_str) {
                let now = std::time::SystemTime::now();
                if let Ok(duration) = http_date.duration_since(now) {
                    return duration.as_secs();
                }
            }
        }
    }

    DEFAULT_RETRY_AFTER
}

impl From<google_gmail1::Error> for CleanupError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let status_code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    status_code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match status_code {
                    429 => {
                        let retry_after = parse_retry_after_header(response);
                        CleanupError::RateLimitExceeded { retry_after }
                    }
                    404 => CleanupError::MessageNotFound("Resource not found".to_string()),
                    400 => CleanupError::BadRequest(message),
                    401 => CleanupError::AuthError(message),
                    403 => CleanupError::Forbidden(message),
                    500..=599 => CleanupError::ServerError {
                        status: status_code,
                        message,
                    },
                    _ => CleanupError::ApiError(message),
                }
            }
            google_gmail1::Error::BadRequest(ref err) => {
                CleanupError::BadRequest(format!("{}", err))
            }
            google_gmail1::Error::MissingToken(ref err) => {
                CleanupError::AuthError(format!("No usable token: {}", err))
            }
            google_gmail1::Error::HttpError(ref err) => {
                CleanupError::NetworkError(format!("Connection error: {}", err))
            }
            google_gmail1::Error::Io(err) => CleanupError::NetworkError(err.to_string()),
            _ => CleanupError::ApiError(error.to_string()),
        }
    }
}
