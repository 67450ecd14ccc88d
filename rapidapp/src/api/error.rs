use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Postgres database not found: {0}")]
    NotFound(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Authentication failed, check the api key")]
    Auth,

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable, retry later")]
    ServiceUnavailable,
}

impl ApiError {
    /// True when the API reports that the requested database does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NotFound(_) => true,
            ApiError::Api { status, message } => {
                *status == 404 || message.to_lowercase().contains("not found")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants() {
        assert!(ApiError::NotFound("db-1".into()).is_not_found());
        assert!(ApiError::Api {
            status: 404,
            message: String::new()
        }
        .is_not_found());
        assert!(ApiError::Api {
            status: 400,
            message: r#"{"error":"database Not Found"}"#.into()
        }
        .is_not_found());
    }

    #[test]
    fn other_errors_are_not_not_found() {
        assert!(!ApiError::Auth.is_not_found());
        assert!(!ApiError::ServiceUnavailable.is_not_found());
        assert!(!ApiError::Api {
            status: 400,
            message: "name already taken".into()
        }
        .is_not_found());
    }
}
