//! Wire types for the Zukii backend

use serde::{Deserialize, Serialize};

use crate::website::RemoteStatus;

/// A website as returned by `GET /websites` and friends
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiWebsite {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: RemoteStatus,
    #[serde(default)]
    pub vapi_agent_id: Option<String>,
    #[serde(default)]
    pub embed_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateWebsiteRequest<'a> {
    pub url: &'a str,
    pub name: &'a str,
}

/// Errors returned by the remote API
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request failed with status {status}")]
    Status { status: u16, body: Option<String> },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
