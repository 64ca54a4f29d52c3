//! Website record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::WebsiteStatus;
use crate::api::ApiWebsite;

/// One customer website submitted for processing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebsiteRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: WebsiteStatus,
    pub created_at: DateTime<Utc>,
    /// Provisioned voice agent, only meaningful when `status == ready`
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Only meaningful when `status == ready`
    #[serde(default)]
    pub embed_snippet: Option<String>,
    /// Store-assigned, changes on every local replacement of this record
    #[serde(default)]
    pub revision: u64,
}

impl WebsiteRecord {
    /// Build a record from a backend response
    pub fn from_api(website: ApiWebsite) -> Self {
        let name = website
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_name(&website.url));

        let created_at = website
            .created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Self {
            status: website.status.to_website_status(),
            id: website.id,
            name,
            url: website.url,
            created_at,
            agent_id: website.vapi_agent_id,
            embed_snippet: website.embed_code,
            revision: 0,
        }
    }
}

/// Display name derived from the URL's host, falling back to the raw URL
pub fn default_name(raw_url: &str) -> String {
    let trimmed = raw_url.trim();

    let parsed = url::Url::parse(trimmed)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| url::Url::parse(&format!("https://{}", trimmed)).ok());

    parsed
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| trimmed.to_string())
}
