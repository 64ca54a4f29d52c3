// Tests for the voice call seam

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use zukii::voice::{CallError, CallHandle, CallSession, CallState, VoiceCallProvider};
use zukii::website::{agent_for, WebsiteRecord, WebsiteStatus, DEFAULT_EMBED_SCRIPT_URL};

struct FakeProvider {
    events: broadcast::Sender<CallState>,
    started: Mutex<Vec<String>>,
    stopped: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            events,
            started: Mutex::new(Vec::new()),
            stopped: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl VoiceCallProvider for FakeProvider {
    async fn start_call(&self, agent_id: &str) -> Result<CallHandle, CallError> {
        let mut started = self.started.lock().unwrap();
        started.push(agent_id.to_string());
        Ok(CallHandle {
            call_id: format!("call-{}", started.len()),
            agent_id: agent_id.to_string(),
        })
    }

    async fn stop_call(&self, handle: &CallHandle) -> Result<(), CallError> {
        self.stopped.lock().unwrap().push(handle.call_id.clone());
        Ok(())
    }

    fn events(&self, _handle: &CallHandle) -> broadcast::Receiver<CallState> {
        self.events.subscribe()
    }
}

fn record(status: WebsiteStatus, provisioned: bool) -> WebsiteRecord {
    WebsiteRecord {
        id: "7".to_string(),
        name: "Acme".to_string(),
        url: "https://acme.test".to_string(),
        status,
        created_at: Utc::now(),
        agent_id: provisioned.then(|| "vapi-7".to_string()),
        embed_snippet: provisioned.then(|| "<script data-agent=\"vapi-7\"></script>".to_string()),
        revision: 1,
    }
}

#[test]
fn test_call_state_transitions() {
    let state = CallState::Idle;
    let state = state.apply(CallState::Connecting);
    let state = state.apply(CallState::Connected);
    let state = state.apply(CallState::Speaking);
    assert_eq!(state, CallState::Speaking);

    let state = state.apply(CallState::Listening);
    assert!(state.is_active());

    let ended = state.apply(CallState::Ended);
    assert_eq!(ended.apply(CallState::Speaking), CallState::Ended);
    assert_eq!(ended.apply(CallState::Connecting), CallState::Connecting);

    let failed = CallState::Connected.apply(CallState::Error("dropped".to_string()));
    assert!(failed.is_finished());
    assert_eq!(failed.apply(CallState::Listening), failed);

    assert_eq!(CallState::Idle.apply(CallState::Speaking), CallState::Idle);
}

#[tokio::test]
async fn test_call_requires_ready_agent() {
    let provider = FakeProvider::new();
    let mut session = CallSession::new(provider.clone());

    for (status, provisioned) in [
        (WebsiteStatus::Pending, false),
        (WebsiteStatus::Scraping, true),
        (WebsiteStatus::Ready, false),
    ] {
        let agent = agent_for(&record(status, provisioned), DEFAULT_EMBED_SCRIPT_URL);
        let result = session.start(&agent).await;
        assert!(matches!(result, Err(CallError::AgentNotReady(_))));
    }

    assert!(provider.started.lock().unwrap().is_empty());
    assert_eq!(session.state(), &CallState::Idle);
}

#[tokio::test]
async fn test_call_lifecycle() {
    let provider = FakeProvider::new();
    let mut session = CallSession::new(provider.clone());
    let agent = agent_for(&record(WebsiteStatus::Ready, true), DEFAULT_EMBED_SCRIPT_URL);

    let mut events = session.start(&agent).await.unwrap();
    assert_eq!(session.state(), &CallState::Connecting);
    assert_eq!(*provider.started.lock().unwrap(), vec!["vapi-7".to_string()]);

    assert!(matches!(session.start(&agent).await, Err(CallError::AlreadyActive)));

    provider.events.send(CallState::Connected).unwrap();
    provider.events.send(CallState::Speaking).unwrap();
    for _ in 0..2 {
        let next = events.recv().await.unwrap();
        session.observe(next);
    }
    assert_eq!(session.state(), &CallState::Speaking);

    session.stop().await.unwrap();
    assert_eq!(session.state(), &CallState::Ended);
    assert_eq!(*provider.stopped.lock().unwrap(), vec!["call-1".to_string()]);

    // Nothing running: stopping again is a no-op
    session.stop().await.unwrap();
    assert_eq!(provider.stopped.lock().unwrap().len(), 1);
}
