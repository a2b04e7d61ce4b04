use crate::providers::ProviderKind;
use reqwest::StatusCode;
use serde_json::Error as SerdeError;
use std::io::Error as IOError;
use thiserror::Error as ThisError;
use url::ParseError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{provider} request failed with status: {status}")]
    Status {
        provider: ProviderKind,
        status: StatusCode,
    },
    #[error("{provider} rate limited the request")]
    RateLimited { provider: ProviderKind },
    #[error("{provider} returned no data: {reason}")]
    NoData {
        provider: ProviderKind,
        reason: String,
    },
    #[error("{provider} timed out")]
    Timeout { provider: ProviderKind },
    #[error("JSON error: {0}")]
    Decode(#[from] SerdeError),
    #[error("URL error: {0}")]
    Url(#[from] ParseError),
    #[error("IO error: {0}")]
    Io(#[from] IOError),
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    pub fn no_data(provider: ProviderKind, reason: impl Into<String>) -> Self {
        Error::NoData {
            provider,
            reason: reason.into(),
        }
    }

    /// Maps a non-success HTTP status onto the provider error taxonomy.
    pub fn from_status(provider: ProviderKind, status: StatusCode) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Error::RateLimited { provider },
            StatusCode::NOT_FOUND => Error::no_data(provider, "symbol not found"),
            _ => Error::Status { provider, status },
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    pub fn is_connection_refused(&self) -> bool {
        match self {
            Error::Http(err) => err.is_connect(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_too_many_requests() {
        let error = Error::from_status(ProviderKind::Finnhub, StatusCode::TOO_MANY_REQUESTS);

        assert!(error.is_rate_limited());
        assert_eq!(error.to_string(), "Finnhub rate limited the request");
    }

    #[test]
    fn test_from_status_not_found_is_no_data() {
        let error = Error::from_status(ProviderKind::Yahoo, StatusCode::NOT_FOUND);

        assert!(matches!(error, Error::NoData { .. }));
    }

    #[test]
    fn test_from_status_server_error() {
        let error = Error::from_status(ProviderKind::Polygon, StatusCode::BAD_GATEWAY);

        assert!(!error.is_rate_limited());
        assert_eq!(
            error.to_string(),
            "Polygon request failed with status: 502 Bad Gateway"
        );
    }
}
