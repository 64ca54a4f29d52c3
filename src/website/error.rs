//! Website store errors

use crate::api::ApiError;

/// Errors surfaced by website store operations.
///
/// None of these are fatal; each leaves the store in a consistent state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Caller input rejected before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The request did not complete or returned non-2xx
    #[error("Network failure: {0}")]
    Network(String),

    /// The referenced website is not in the collection
    #[error("Website not found: {0}")]
    NotFound(String),
}

impl From<ApiError> for StoreError {
    fn from(err: ApiError) -> Self {
        StoreError::Network(err.to_string())
    }
}
