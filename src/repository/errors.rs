use thiserror::Error;

/// Errors returned by the backend collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The request could not be sent or the response was not a success.
    #[error("request failed: {0}")]
    Http(String),
    /// The backend rejected the request with a human-readable message.
    #[error("{0}")]
    Server(String),
    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
    /// A returned record violated a domain constraint.
    #[error("invalid record: {0}")]
    Validation(String),
    /// The backend refused the credentials of the request.
    #[error("not authenticated")]
    Unauthorized,
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for RepositoryError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout
        } else if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Http(value.to_string())
        }
    }
}

/// Convenient alias for results returned from repository calls.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
