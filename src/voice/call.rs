//! Voice call seam
//!
//! The voice SDK lives outside this crate. Providers translate their own
//! event names into `CallState` transitions before publishing them.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::website::AgentView;

/// Handle to a call started by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallHandle {
    pub call_id: String,
    pub agent_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum CallState {
    Idle,
    Connecting,
    Connected,
    Speaking,
    Listening,
    Ended,
    Error(String),
}

impl CallState {
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            CallState::Connecting | CallState::Connected | CallState::Speaking | CallState::Listening
        )
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, CallState::Ended | CallState::Error(_))
    }

    /// Next state after `next` is reported.
    ///
    /// A finished call only leaves `Ended`/`Error` when a new call connects,
    /// and late speech events from a finished call are dropped.
    pub fn apply(&self, next: CallState) -> CallState {
        if next == CallState::Connecting && !self.is_active() {
            return next;
        }
        if self.is_finished() {
            return self.clone();
        }
        if *self == CallState::Idle && matches!(next, CallState::Speaking | CallState::Listening) {
            return self.clone();
        }
        next
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("Agent {0} is not ready for calls")]
    AgentNotReady(String),

    #[error("A call is already in progress")]
    AlreadyActive,

    #[error("Voice provider error: {0}")]
    Provider(String),
}

/// Voice SDK behind a narrow interface
#[async_trait]
pub trait VoiceCallProvider: Send + Sync {
    async fn start_call(&self, agent_id: &str) -> Result<CallHandle, CallError>;

    async fn stop_call(&self, handle: &CallHandle) -> Result<(), CallError>;

    /// Call-state transitions for a started call
    fn events(&self, handle: &CallHandle) -> broadcast::Receiver<CallState>;
}

/// Drives one call at a time for an agent view
pub struct CallSession {
    provider: Arc<dyn VoiceCallProvider>,
    state: CallState,
    handle: Option<CallHandle>,
}

impl CallSession {
    pub fn new(provider: Arc<dyn VoiceCallProvider>) -> Self {
        Self {
            provider,
            state: CallState::Idle,
            handle: None,
        }
    }

    pub fn state(&self) -> &CallState {
        &self.state
    }

    pub fn handle(&self) -> Option<&CallHandle> {
        self.handle.as_ref()
    }

    /// Start a call; only ready agents with a provisioned voice agent qualify
    pub async fn start(
        &mut self,
        agent: &AgentView,
    ) -> Result<broadcast::Receiver<CallState>, CallError> {
        if self.state.is_active() {
            return Err(CallError::AlreadyActive);
        }

        let agent_id = match (&agent.vapi_agent_id, agent.is_copyable()) {
            (Some(id), true) => id.clone(),
            _ => return Err(CallError::AgentNotReady(agent.agent_id.clone())),
        };

        let handle = self.provider.start_call(&agent_id).await?;
        let events = self.provider.events(&handle);

        info!("Started call {} with agent {}", handle.call_id, agent_id);
        self.state = self.state.apply(CallState::Connecting);
        self.handle = Some(handle);

        Ok(events)
    }

    /// Apply a state reported by the provider
    pub fn observe(&mut self, next: CallState) -> &CallState {
        let applied = self.state.apply(next);
        if applied != self.state {
            debug!("Call state {:?} -> {:?}", self.state, applied);
        }
        self.state = applied;
        &self.state
    }

    /// Stop the current call. Safe when no call is running.
    pub async fn stop(&mut self) -> Result<(), CallError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        self.provider.stop_call(&handle).await?;
        self.state = self.state.apply(CallState::Ended);
        info!("Stopped call {}", handle.call_id);

        Ok(())
    }
}
