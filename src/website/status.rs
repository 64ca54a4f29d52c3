//! Website status definitions
//!
//! The backend reports `pending | completed | failed`. The dashboard works with
//! its own four-state enumeration, which adds `scraping` for re-scrapes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Status as shown to users
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WebsiteStatus {
    Pending,
    Scraping,
    Ready,
    Error,
}

impl WebsiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebsiteStatus::Pending => "pending",
            WebsiteStatus::Scraping => "scraping",
            WebsiteStatus::Ready => "ready",
            WebsiteStatus::Error => "error",
        }
    }

    /// Human label used by the CLI status badge
    pub fn label(&self) -> &'static str {
        match self {
            WebsiteStatus::Pending => "Pending",
            WebsiteStatus::Scraping => "Scraping",
            WebsiteStatus::Ready => "Ready",
            WebsiteStatus::Error => "Error",
        }
    }

    /// `ready` and `error` end polling
    pub fn is_terminal(&self) -> bool {
        matches!(self, WebsiteStatus::Ready | WebsiteStatus::Error)
    }

    /// Position along `pending -> scraping -> ready|error`
    fn rank(&self) -> u8 {
        match self {
            WebsiteStatus::Pending => 0,
            WebsiteStatus::Scraping => 1,
            WebsiteStatus::Ready | WebsiteStatus::Error => 2,
        }
    }

    /// Whether a refresh may move a website from `self` to `next`.
    ///
    /// Status only moves forward, and a terminal status never turns into the
    /// other one. Leaving a terminal status takes a local re-scrape.
    pub fn can_become(&self, next: WebsiteStatus) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        next.rank() >= self.rank()
    }
}

impl fmt::Display for WebsiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status as reported by the backend
///
/// Unrecognized strings are kept in `Unknown` so a new backend state never
/// breaks deserialization of a whole listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    Pending,
    Completed,
    Failed,
    Unknown(String),
}

impl RemoteStatus {
    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => RemoteStatus::Pending,
            "completed" => RemoteStatus::Completed,
            "failed" => RemoteStatus::Failed,
            other => RemoteStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RemoteStatus::Pending => "pending",
            RemoteStatus::Completed => "completed",
            RemoteStatus::Failed => "failed",
            RemoteStatus::Unknown(s) => s,
        }
    }

    pub fn to_website_status(&self) -> WebsiteStatus {
        match self {
            RemoteStatus::Pending => WebsiteStatus::Pending,
            RemoteStatus::Completed => WebsiteStatus::Ready,
            RemoteStatus::Failed => WebsiteStatus::Error,
            RemoteStatus::Unknown(_) => WebsiteStatus::Pending,
        }
    }
}

impl Serialize for RemoteStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RemoteStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RemoteStatus::from_str(&raw))
    }
}

/// Map a backend status string onto the user-facing status.
///
/// Anything unrecognized maps to `pending`.
pub fn map_remote_status(remote: &str) -> WebsiteStatus {
    RemoteStatus::from_str(remote).to_website_status()
}
