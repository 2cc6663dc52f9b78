//! Conversions from external infrastructure errors into domain errors.

use gts_domain::GtsError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GtsError);

impl From<InfraError> for GtsError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GtsError> for InfraError {
    fn from(value: GtsError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let detail = if value.is_timeout() {
            format!("http timeout: {value}")
        } else if value.is_connect() {
            format!("http connect failure: {value}")
        } else {
            format!("http error: {value}")
        };
        InfraError(GtsError::Network(detail))
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        match value {
            SqlError::QueryReturnedNoRows => {
                InfraError(GtsError::NotFound("no rows returned by query".into()))
            }
            other => InfraError(GtsError::Storage(other.to_string())),
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(GtsError::InvalidInput(format!("json: {value}")))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(GtsError::Config(format!("invalid url: {value}")))
    }
}
