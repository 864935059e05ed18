use reqwest::header::InvalidHeaderValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Language of a bulk error message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// Detailed message aimed at developers
    Dev,
    /// End-user message in English
    En,
}

/// Error codes shared by every bulk endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkErrorCode {
    InputValidationFailed,
    EmptyRequestNotAllowed,
    MaxRequestsExceeded,
    FailedDueToOtherErrors,
    InternalServerError,
}

impl BulkErrorCode {
    /// Numeric code used on the wire
    pub fn code(&self) -> i32 {
        match self {
            Self::InputValidationFailed => 1,
            Self::EmptyRequestNotAllowed => 2,
            Self::MaxRequestsExceeded => 3,
            Self::FailedDueToOtherErrors => 4,
            Self::InternalServerError => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::InputValidationFailed),
            2 => Some(Self::EmptyRequestNotAllowed),
            3 => Some(Self::MaxRequestsExceeded),
            4 => Some(Self::FailedDueToOtherErrors),
            5 => Some(Self::InternalServerError),
            _ => None,
        }
    }

    pub fn message(&self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Self::InputValidationFailed, Lang::En) => "Input validation failed",
            (Self::InputValidationFailed, Lang::Dev) => {
                "Struct validations failed on tags for input"
            }
            (Self::EmptyRequestNotAllowed, Lang::En) => "Empty request not allowed",
            (Self::EmptyRequestNotAllowed, Lang::Dev) => {
                "This endpoint does not allow the empty request - each request must be defined separately"
            }
            (Self::MaxRequestsExceeded, Lang::En) => "Max number of requests exceeded",
            (Self::MaxRequestsExceeded, Lang::Dev) => {
                "MaxRequest parameter has been set for endpoint and is exceeded by the number of request-objects given in the input"
            }
            (Self::FailedDueToOtherErrors, Lang::En) => "Failed due to other errors",
            (Self::FailedDueToOtherErrors, Lang::Dev) => {
                "Other request has already been invalidated, no reason to continue until those have been fixed"
            }
            (Self::InternalServerError, _) => {
                "Internal server error occured. Please wait until it has been fixed, before you try again"
            }
        }
    }

    /// Wire representation with the English message
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code(),
            error: self.message(Lang::En).to_string(),
        }
    }
}

impl fmt::Display for BulkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message(Lang::En))
    }
}

/// One error attached to a bulk response item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: i32,
    pub error: String,
}

/// Errors collected for one request of a batch that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemErrors {
    pub index: usize,
    pub errors: Vec<ErrorResponse>,
}

/// Errors that can occur when calling the grants endpoint
#[derive(Debug, Error)]
pub enum GrantsError {
    /// The batch as a whole was rejected before sending
    #[error("Request rejected: {0}")]
    Rejected(BulkErrorCode),
    /// One or more requests failed validation; nothing was sent
    #[error("Input validation failed for {} request(s)", .0.len())]
    InvalidRequests(Vec<ItemErrors>),
    #[error("Invalid grants URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Invalid bearer token: {0}")]
    Header(#[from] InvalidHeaderValue),
    #[error("Failed to send request to grants endpoint: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Failed to parse grants response: {0}")]
    Parse(#[from] serde_json::Error),
}
