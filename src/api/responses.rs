//! Shared API response types
//!
//! Success bodies come in three shapes across the API: a bare payload under
//! `data`, a bare `message`, or both together. These wrappers keep the key
//! names consistent across endpoints.

use serde::Serialize;

/// Success response carrying only a payload: `{"data": ...}`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Success response carrying only a message: `{"message": ...}`
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

/// Success response carrying a message and a payload:
/// `{"message": ..., "data": ...}`
#[derive(Debug, Serialize)]
pub struct MessageDataResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> MessageDataResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}
