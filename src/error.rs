use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the API and the stores behind it.
#[derive(Debug, Error)]
pub enum Error {
    /// Explicitly requested market does not exist. The catalog treats this
    /// as a caller mistake, not a missing resource.
    #[error("Market not found: {0}")]
    MarketNotFound(String),

    /// Request payload or query parameter failed validation.
    #[error("{0}")]
    Validation(String),

    /// A directly addressed resource (product, category, record) is absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Resource with the same identifier already exists. The message names
    /// the existing resource so callers can tell what they collided with.
    #[error("{0}")]
    Conflict(String),

    /// Anything that went wrong underneath: pool, SQL, migrations.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Error::Conflict(message.into())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Storage(err.into())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MarketNotFound(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Storage details stay in the logs; clients get a generic line.
        let message = match self {
            Error::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": message,
        }))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_classes() {
        assert_eq!(
            Error::MarketNotFound("X".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::validation("bad date").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::NotFound("product").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::conflict("Market already exists in Pune, Maharashtra").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Storage(anyhow::anyhow!("pool exhausted")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_detail_is_not_leaked_to_clients() {
        let err = Error::Storage(anyhow::anyhow!("connection refused on 10.0.0.3"));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn market_not_found_names_the_market() {
        let err = Error::MarketNotFound("PUNE-009".into());
        assert_eq!(err.to_string(), "Market not found: PUNE-009");
    }
}
