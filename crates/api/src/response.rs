//! Shared response envelope types for API handlers.
//!
//! Single entities are returned bare and lists use
//! [`PageResult`](backoffice_core::pagination::PageResult). The two
//! envelopes here cover endpoints that report an outcome.

use serde::Serialize;

/// `{ "message": ... }`, returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{ "message": ..., "data": T }`, returned by state-changing actions
/// such as resignation.
#[derive(Debug, Serialize)]
pub struct MessageDataResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}
