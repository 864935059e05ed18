use crate::error::ErrorResponse;
use serde::{Deserialize, Serialize};

/// A scope granted to an identity, published by another identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    #[serde(rename = "identity_id")]
    pub identity: String,
    pub scope: String,
    #[serde(rename = "publisher_id")]
    pub publisher: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGrantsRequest {
    #[serde(rename = "identity_id")]
    pub identity: String,
    pub scope: String,
    #[serde(rename = "publisher_id")]
    pub publisher: String,
}

/// Filter for reading grants; only the identity is mandatory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadGrantsRequest {
    #[serde(rename = "identity_id", default, skip_serializing_if = "String::is_empty")]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(rename = "publisher_id", default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteGrantsRequest {
    #[serde(rename = "identity_id")]
    pub identity: String,
    pub scope: String,
    #[serde(rename = "publisher_id")]
    pub publisher: String,
}

pub type CreateGrantsResponse = Grant;
pub type ReadGrantsResponse = Vec<Grant>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteGrantsResponse {}

/// Result for one request of a batch, in request order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct BulkResponse<T> {
    pub index: usize,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorResponse>,
}

impl<T> BulkResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty() && (200..300).contains(&self.status)
    }
}
