use crate::consent::ConsentError;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use log::error;
use serde_json::json;

/// Message for every consent lookup or update the store could not serve
pub(crate) const NOT_FOUND: &str = "Not found";

#[derive(Debug, Clone)]
pub struct ApiError {
    pub error: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with an error message and status code
    pub fn new<S: ToString>(error: S, status_code: StatusCode) -> Self {
        Self {
            error: error.to_string(),
            status_code,
        }
    }

    /// Create new Internal Server Error (500) with an error message
    pub fn internal<S: ToString>(error: S) -> Self {
        Self::new(error, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create new Bad Request Error (400) with an error message
    pub fn bad_request<S: ToString>(error: S) -> Self {
        Self::new(error, StatusCode::BAD_REQUEST)
    }

    /// Create new Not Found Error (404) with an error message
    pub fn not_found<S: ToString>(error: S) -> Self {
        Self::new(error, StatusCode::NOT_FOUND)
    }

    /// Create new Forbidden Error (403) with an error message
    pub fn forbidden<S: ToString>(error: S) -> Self {
        Self::new(error, StatusCode::FORBIDDEN)
    }
}

impl From<ConsentError> for ApiError {
    fn from(err: ConsentError) -> Self {
        match err {
            ConsentError::MissingRequiredField(field) => ApiError::bad_request(format!(
                "Missing required field: {}",
                field.body_name()
            )),
            ConsentError::EmptyRequestNotAllowed => {
                ApiError::bad_request("At least one scope must be granted or revoked")
            }
            ConsentError::Store(e) => {
                // store failures are not leaked to the caller
                error!("Consent store error: {}", e);
                ApiError::not_found(NOT_FOUND)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code;
        let body = json!({
            "error": self.error,
        });
        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::Field;
    use crate::store::StoreError;

    #[test]
    fn test_store_error_maps_to_not_found() {
        let err = ApiError::from(ConsentError::Store(StoreError::Redis(
            "connection refused".to_string(),
        )));
        assert_eq!(err.status_code, StatusCode::NOT_FOUND);
        assert_eq!(err.error, "Not found");
    }

    #[test]
    fn test_validation_errors_map_to_bad_request() {
        let err = ApiError::from(ConsentError::MissingRequiredField(Field::Identity));
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
        assert!(err.error.contains("sub"));

        let err = ApiError::from(ConsentError::EmptyRequestNotAllowed);
        assert_eq!(err.status_code, StatusCode::BAD_REQUEST);
    }
}
