//! Uniform operation result exposed to presentation layers.

use serde::Serialize;

use super::error::TradebookError;

/// Envelope returned by every mutating or query operation.
///
/// `error_code` mirrors [`TradebookError::code`] so callers can branch on
/// the failure kind without parsing `message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T> Response<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error_code: None,
        }
    }

    pub fn failure(err: &TradebookError) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            data: None,
            error_code: Some(err.code().to_string()),
        }
    }

    /// Wrap a service result, describing the success payload.
    pub fn from_result(
        result: Result<T, TradebookError>,
        describe: impl FnOnce(&T) -> String,
    ) -> Self {
        match result {
            Ok(data) => {
                let message = describe(&data);
                Self::ok(message, data)
            }
            Err(err) => Self::failure(&err),
        }
    }
}
