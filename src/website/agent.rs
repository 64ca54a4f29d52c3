//! Agent view projection

use serde::Serialize;

use super::record::WebsiteRecord;
use super::status::WebsiteStatus;

pub const DEFAULT_EMBED_SCRIPT_URL: &str = "https://zukii.ai/embed.js";

/// Read-only projection of a website as an embeddable voice agent
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentView {
    /// Display identifier, `agent-{website_id}`
    pub agent_id: String,
    pub website_id: String,
    pub website_name: String,
    pub website_url: String,
    pub status: WebsiteStatus,
    pub embed_snippet: String,
    /// Voice agent provisioned by the backend, if any
    pub vapi_agent_id: Option<String>,
    /// Whether `embed_snippet` came from the backend
    pub snippet_provisioned: bool,
}

impl AgentView {
    /// Only a ready agent with a backend-issued snippet may be copied
    pub fn is_copyable(&self) -> bool {
        self.status == WebsiteStatus::Ready && self.snippet_provisioned
    }

    /// Snippet for a "copy code" action, gated on readiness
    pub fn copyable_snippet(&self) -> Option<&str> {
        self.is_copyable().then_some(self.embed_snippet.as_str())
    }
}

/// Placeholder snippet shown before the backend has provisioned the agent
pub fn fallback_snippet(embed_script_url: &str, website_id: &str) -> String {
    format!(
        r#"<script src="{}" data-agent-id="agent-{}"></script>"#,
        embed_script_url, website_id
    )
}

/// Project a website record into its agent view
pub fn agent_for(record: &WebsiteRecord, embed_script_url: &str) -> AgentView {
    let provisioned = record
        .embed_snippet
        .as_deref()
        .filter(|s| !s.trim().is_empty());

    let embed_snippet = provisioned
        .map(str::to_string)
        .unwrap_or_else(|| fallback_snippet(embed_script_url, &record.id));

    AgentView {
        agent_id: format!("agent-{}", record.id),
        website_id: record.id.clone(),
        website_name: record.name.clone(),
        website_url: record.url.clone(),
        status: record.status,
        embed_snippet,
        vapi_agent_id: record.agent_id.clone(),
        snippet_provisioned: provisioned.is_some(),
    }
}
