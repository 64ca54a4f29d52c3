//! Website status lifecycle
//!
//! Website records, their status mapping, the store that owns them, the
//! controller that polls non-terminal ones, and the agent view projection.

pub mod agent;
pub mod error;
pub mod poller;
pub mod record;
pub mod status;
pub mod store;

pub use agent::{agent_for, AgentView, DEFAULT_EMBED_SCRIPT_URL};
pub use error::StoreError;
pub use poller::{PollExit, PollingController, DEFAULT_POLL_INTERVAL};
pub use record::WebsiteRecord;
pub use status::{map_remote_status, RemoteStatus, WebsiteStatus};
pub use store::{Read, WebsiteStore};
