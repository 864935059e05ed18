//! Client-side checks run on a whole batch before anything is sent.

use crate::error::{BulkErrorCode, GrantsError, ItemErrors};
use crate::models::{CreateGrantsRequest, DeleteGrantsRequest, ReadGrantsRequest};
use log::debug;
use uuid::Uuid;

/// A request that can be checked for missing or malformed fields
pub trait Validate {
    /// Returns the name of the first invalid field, if any
    fn invalid_field(&self) -> Option<&'static str>;
}

fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

impl Validate for CreateGrantsRequest {
    fn invalid_field(&self) -> Option<&'static str> {
        if !is_uuid(&self.identity) {
            Some("identity_id")
        } else if self.scope.trim().is_empty() {
            Some("scope")
        } else if !is_uuid(&self.publisher) {
            Some("publisher_id")
        } else {
            None
        }
    }
}

impl Validate for DeleteGrantsRequest {
    fn invalid_field(&self) -> Option<&'static str> {
        if !is_uuid(&self.identity) {
            Some("identity_id")
        } else if self.scope.trim().is_empty() {
            Some("scope")
        } else if !is_uuid(&self.publisher) {
            Some("publisher_id")
        } else {
            None
        }
    }
}

impl Validate for ReadGrantsRequest {
    fn invalid_field(&self) -> Option<&'static str> {
        if !is_uuid(&self.identity) {
            return Some("identity_id");
        }
        match &self.publisher {
            Some(publisher) if !is_uuid(publisher) => Some("publisher_id"),
            _ => None,
        }
    }
}

/// Checks a batch against the bulk rules.
///
/// An empty batch and a batch larger than `max_requests` are rejected as a
/// whole. Otherwise each invalid request gets `InputValidationFailed` and
/// every valid one gets `FailedDueToOtherErrors`.
pub fn validate_batch<T: Validate>(
    requests: &[T],
    max_requests: Option<usize>,
) -> Result<(), GrantsError> {
    if requests.is_empty() {
        return Err(GrantsError::Rejected(BulkErrorCode::EmptyRequestNotAllowed));
    }
    if let Some(max) = max_requests {
        if requests.len() > max {
            return Err(GrantsError::Rejected(BulkErrorCode::MaxRequestsExceeded));
        }
    }

    let invalid: Vec<(usize, &'static str)> = requests
        .iter()
        .enumerate()
        .filter_map(|(index, request)| request.invalid_field().map(|field| (index, field)))
        .collect();
    if invalid.is_empty() {
        return Ok(());
    }

    for (index, field) in &invalid {
        debug!("Request {} failed validation on field '{}'", index, field);
    }
    let items = (0..requests.len())
        .map(|index| {
            let code = if invalid.iter().any(|(i, _)| *i == index) {
                BulkErrorCode::InputValidationFailed
            } else {
                BulkErrorCode::FailedDueToOtherErrors
            };
            ItemErrors {
                index,
                errors: vec![code.to_error_response()],
            }
        })
        .collect();
    Err(GrantsError::InvalidRequests(items))
}
