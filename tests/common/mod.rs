// Shared test helpers

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};
use zukii::api::{ApiError, ApiWebsite, WebsiteApi};
use zukii::website::RemoteStatus;

/// In-memory backend with scriptable failures and call counters
pub struct FakeApi {
    state: Mutex<FakeState>,
    get_entered: Notify,
    get_release: Semaphore,
    list_entered: Notify,
    list_release: Semaphore,
}

#[derive(Default)]
struct FakeState {
    websites: Vec<ApiWebsite>,
    next_id: u64,
    fail_list: bool,
    fail_create: bool,
    fail_get: bool,
    fail_delete: bool,
    block_gets: bool,
    block_lists: bool,
    list_calls: usize,
    create_calls: usize,
    delete_calls: usize,
    get_calls: HashMap<String, usize>,
}

pub fn api_website(id: &str, url: &str, status: &str) -> ApiWebsite {
    ApiWebsite {
        id: id.to_string(),
        url: url.to_string(),
        name: None,
        status: RemoteStatus::from_str(status),
        vapi_agent_id: None,
        embed_code: None,
        created_at: Some("2026-03-01T12:00:00Z".to_string()),
    }
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState::default()),
            get_entered: Notify::new(),
            get_release: Semaphore::new(0),
            list_entered: Notify::new(),
            list_release: Semaphore::new(0),
        })
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn insert(&self, website: ApiWebsite) {
        self.state().websites.push(website);
    }

    /// Delete on the backend only, as another client would
    pub fn remove_remote(&self, id: &str) {
        self.state().websites.retain(|w| w.id != id);
    }

    pub fn set_status(&self, id: &str, status: &str) {
        let mut state = self.state();
        let website = state.websites.iter_mut().find(|w| w.id == id).unwrap();
        website.status = RemoteStatus::from_str(status);
    }

    /// Mark a website completed with a provisioned agent
    pub fn complete(&self, id: &str) {
        let mut state = self.state();
        let website = state.websites.iter_mut().find(|w| w.id == id).unwrap();
        website.status = RemoteStatus::Completed;
        website.vapi_agent_id = Some(format!("vapi-{}", id));
        website.embed_code = Some(format!(
            r#"<script src="https://zukii.ai/embed.js" data-vapi-agent="vapi-{}"></script>"#,
            id
        ));
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state().fail_list = fail;
    }

    pub fn fail_creates(&self, fail: bool) {
        self.state().fail_create = fail;
    }

    pub fn fail_gets(&self, fail: bool) {
        self.state().fail_get = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state().fail_delete = fail;
    }

    /// Hold every `get_website` call until `release_get` is called
    pub fn block_gets(&self, block: bool) {
        self.state().block_gets = block;
    }

    pub async fn wait_get_entered(&self) {
        self.get_entered.notified().await;
    }

    pub fn release_get(&self) {
        self.get_release.add_permits(1);
    }

    /// Hold every `list_websites` call until `release_list` is called
    pub fn block_lists(&self, block: bool) {
        self.state().block_lists = block;
    }

    pub async fn wait_list_entered(&self) {
        self.list_entered.notified().await;
    }

    pub fn release_list(&self) {
        self.list_release.add_permits(1);
    }

    pub fn get_calls(&self, id: &str) -> usize {
        self.state().get_calls.get(id).copied().unwrap_or(0)
    }

    pub fn total_get_calls(&self) -> usize {
        self.state().get_calls.values().sum()
    }

    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state().delete_calls
    }

    pub fn remote_ids(&self) -> Vec<String> {
        self.state().websites.iter().map(|w| w.id.clone()).collect()
    }
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        body: None,
    }
}

#[async_trait]
impl WebsiteApi for FakeApi {
    async fn list_websites(&self) -> Result<Vec<ApiWebsite>, ApiError> {
        // Like gets, the listing is captured when the request is sent
        let (response, block) = {
            let mut state = self.state();
            state.list_calls += 1;
            let response = if state.fail_list {
                Err(server_error())
            } else {
                Ok(state.websites.clone())
            };
            (response, state.block_lists)
        };

        if block {
            self.list_entered.notify_one();
            self.list_release.acquire().await.unwrap().forget();
        }

        response
    }

    async fn create_website(&self, url: &str, name: &str) -> Result<ApiWebsite, ApiError> {
        let mut state = self.state();
        state.create_calls += 1;
        if state.fail_create {
            return Err(server_error());
        }

        state.next_id += 1;
        let mut website = api_website(&format!("site-{}", state.next_id), url, "pending");
        website.name = Some(name.to_string()).filter(|n| !n.is_empty());
        state.websites.push(website.clone());
        Ok(website)
    }

    async fn get_website(&self, id: &str) -> Result<ApiWebsite, ApiError> {
        // The response is decided when the request is sent
        let (response, block) = {
            let mut state = self.state();
            *state.get_calls.entry(id.to_string()).or_default() += 1;

            let response = if state.fail_get {
                Err(server_error())
            } else {
                state
                    .websites
                    .iter()
                    .find(|w| w.id == id)
                    .cloned()
                    .ok_or(ApiError::Status {
                        status: 404,
                        body: None,
                    })
            };
            (response, state.block_gets)
        };

        if block {
            self.get_entered.notify_one();
            self.get_release.acquire().await.unwrap().forget();
        }

        response
    }

    async fn delete_website(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        state.delete_calls += 1;
        if state.fail_delete {
            return Err(server_error());
        }
        state.websites.retain(|w| w.id != id);
        Ok(())
    }
}
