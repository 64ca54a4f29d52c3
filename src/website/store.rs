//! Website store
//!
//! Owns the canonical collection of website records. Records are only ever
//! replaced whole, and the lock is never held across a network call.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::agent::{agent_for, AgentView, DEFAULT_EMBED_SCRIPT_URL};
use super::error::StoreError;
use super::record::WebsiteRecord;
use super::status::WebsiteStatus;
use crate::api::WebsiteApi;
use crate::db::{KvRepository, WEBSITES_KEY};

/// Result of a two-phase read
#[derive(Debug, Clone, PartialEq)]
pub enum Read<T> {
    /// Cached value, emitted before the remote call resolves
    Stale(T),
    /// Value after the remote call was applied
    Fresh(T),
}

#[derive(Default)]
struct StoreState {
    websites: Vec<WebsiteRecord>,
    last_error: Option<String>,
    next_revision: u64,
    /// Ids removed while a listing was in flight, with the revision of the removal
    removed: Vec<(u64, String)>,
    listings_in_flight: usize,
}

impl StoreState {
    fn from_records(records: Vec<WebsiteRecord>) -> Self {
        let mut seen = HashSet::new();
        let websites: Vec<WebsiteRecord> = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        let next_revision = websites.iter().map(|r| r.revision).max().unwrap_or(0) + 1;

        Self {
            websites,
            last_error: None,
            next_revision,
            removed: Vec::new(),
            listings_in_flight: 0,
        }
    }

    fn bump(&mut self) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        revision
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.websites.iter().position(|r| r.id == id)
    }

    fn find(&self, id: &str) -> Option<&WebsiteRecord> {
        self.websites.iter().find(|r| r.id == id)
    }

    /// Start of a listing: removals from here on must survive its response
    fn begin_listing(&mut self) -> u64 {
        self.listings_in_flight += 1;
        self.next_revision
    }

    fn end_listing(&mut self) {
        self.listings_in_flight = self.listings_in_flight.saturating_sub(1);
        if self.listings_in_flight == 0 {
            self.removed.clear();
        }
    }

    fn removed_since(&self, id: &str, since: u64) -> bool {
        self.removed
            .iter()
            .any(|(revision, removed)| *revision >= since && removed == id)
    }
}

pub struct WebsiteStore {
    api: Arc<dyn WebsiteApi>,
    state: RwLock<StoreState>,
    kv: Option<KvRepository>,
    /// Serializes saves so a newer snapshot is never overwritten by an older one
    persist_lock: Mutex<()>,
    embed_script_url: String,
}

impl WebsiteStore {
    /// Store without persistence
    pub fn new(api: Arc<dyn WebsiteApi>) -> Self {
        Self {
            api,
            state: RwLock::new(StoreState::from_records(Vec::new())),
            kv: None,
            persist_lock: Mutex::new(()),
            embed_script_url: DEFAULT_EMBED_SCRIPT_URL.to_string(),
        }
    }

    /// Store backed by the key-value repository.
    ///
    /// The persisted collection is loaded immediately; missing or corrupt
    /// state starts empty.
    pub async fn load(api: Arc<dyn WebsiteApi>, kv: KvRepository) -> Self {
        let records: Vec<WebsiteRecord> = kv.load(WEBSITES_KEY).await.unwrap_or_default();
        debug!("Loaded {} persisted websites", records.len());

        Self {
            api,
            state: RwLock::new(StoreState::from_records(records)),
            kv: Some(kv),
            persist_lock: Mutex::new(()),
            embed_script_url: DEFAULT_EMBED_SCRIPT_URL.to_string(),
        }
    }

    pub fn with_embed_script_url(mut self, url: impl Into<String>) -> Self {
        self.embed_script_url = url.into();
        self
    }

    /// Snapshot of all records in insertion order
    pub async fn records(&self) -> Vec<WebsiteRecord> {
        self.state.read().await.websites.clone()
    }

    pub async fn get(&self, id: &str) -> Option<WebsiteRecord> {
        self.state.read().await.find(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.state.read().await.find(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.websites.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Message from the most recent failed operation, for display
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    async fn record_error(&self, err: &StoreError) {
        warn!("{}", err);
        self.state.write().await.last_error = Some(err.to_string());
    }

    /// Fetch every website and replace the local collection.
    ///
    /// On failure the previous collection is kept. Websites removed locally
    /// while the request was in flight stay removed.
    pub async fn list_all(&self) -> Result<Vec<WebsiteRecord>, StoreError> {
        let since = self.state.write().await.begin_listing();

        let websites = match self.api.list_websites().await {
            Ok(websites) => websites,
            Err(e) => {
                self.state.write().await.end_listing();
                let err = StoreError::from(e);
                self.record_error(&err).await;
                return Err(err);
            }
        };

        let snapshot = {
            let mut state = self.state.write().await;
            let mut seen = HashSet::new();
            let mut fresh = Vec::with_capacity(websites.len());

            for website in websites {
                if !seen.insert(website.id.clone()) {
                    warn!("Duplicate website id in listing: {}", website.id);
                    continue;
                }
                if state.removed_since(&website.id, since) {
                    debug!("Dropping removed website {} from stale listing", website.id);
                    continue;
                }
                let mut record = WebsiteRecord::from_api(website);
                if let Some(previous) = state.find(&record.id) {
                    record.created_at = previous.created_at;
                }
                record.revision = state.bump();
                fresh.push(record);
            }

            state.websites = fresh;
            state.last_error = None;
            state.end_listing();
            state.websites.clone()
        };

        debug!("Listed {} websites", snapshot.len());
        self.persist().await;

        Ok(snapshot)
    }

    /// Create a website remotely and insert it as `pending`
    pub async fn add(&self, name: &str, url: &str) -> Result<WebsiteRecord, StoreError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StoreError::Validation("website URL is required".to_string()));
        }

        let website = match self.api.create_website(url, name.trim()).await {
            Ok(website) => website,
            Err(e) => {
                let err = StoreError::from(e);
                self.record_error(&err).await;
                return Err(err);
            }
        };

        let record = {
            let mut state = self.state.write().await;
            let mut record = WebsiteRecord::from_api(website);
            record.status = WebsiteStatus::Pending;
            record.revision = state.bump();

            match state.position(&record.id) {
                Some(idx) => {
                    // A listing that completed first already brought it in
                    record.created_at = state.websites[idx].created_at;
                    state.websites[idx] = record.clone();
                }
                None => state.websites.push(record.clone()),
            }
            record
        };

        info!("Added website {} ({})", record.id, record.url);
        self.persist().await;

        Ok(record)
    }

    /// Re-fetch a single website.
    ///
    /// Returns `Ok(None)` without touching the network when the id is not in
    /// the collection, and when the record was removed while the request was
    /// in flight. A response that raced a newer local change, or that would
    /// move the status backward, is discarded and the current record returned.
    pub async fn refresh_one(&self, id: &str) -> Result<Option<WebsiteRecord>, StoreError> {
        let revision = match self.state.read().await.find(id) {
            Some(record) => record.revision,
            None => {
                debug!("Skipping refresh of unknown website {}", id);
                return Ok(None);
            }
        };

        let website = match self.api.get_website(id).await {
            Ok(website) => website,
            Err(e) => {
                let err = StoreError::from(e);
                self.record_error(&err).await;
                return Err(err);
            }
        };

        let updated = {
            let mut state = self.state.write().await;
            let Some(idx) = state.position(id) else {
                debug!("Discarding refresh of removed website {}", id);
                return Ok(None);
            };

            let current = &state.websites[idx];
            if current.revision != revision {
                debug!("Discarding stale refresh of website {}", id);
                return Ok(Some(current.clone()));
            }

            let mut fresh = WebsiteRecord::from_api(website);
            if !current.status.can_become(fresh.status) {
                debug!(
                    "Ignoring status {} -> {} for website {}",
                    current.status, fresh.status, id
                );
                return Ok(Some(current.clone()));
            }

            fresh.id = current.id.clone();
            fresh.created_at = current.created_at;
            fresh.revision = state.bump();
            state.websites[idx] = fresh.clone();
            fresh
        };

        debug!("Refreshed website {}: {}", id, updated.status);
        self.persist().await;

        Ok(Some(updated))
    }

    /// Two-phase read: emits the cached record as `Stale` right away, then
    /// the refreshed one as `Fresh`.
    pub async fn read<F>(&self, id: &str, mut emit: F) -> Result<Option<WebsiteRecord>, StoreError>
    where
        F: FnMut(Read<WebsiteRecord>) + Send,
    {
        let Some(cached) = self.get(id).await else {
            return Ok(None);
        };
        emit(Read::Stale(cached));

        let fresh = self.refresh_one(id).await?;
        if let Some(record) = &fresh {
            emit(Read::Fresh(record.clone()));
        }

        Ok(fresh)
    }

    /// Delete remotely, then locally once the backend confirmed
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        if !self.contains(id).await {
            let err = StoreError::NotFound(id.to_string());
            self.record_error(&err).await;
            return Err(err);
        }

        if let Err(e) = self.api.delete_website(id).await {
            let err = StoreError::from(e);
            self.record_error(&err).await;
            return Err(err);
        }

        {
            let mut state = self.state.write().await;
            state.websites.retain(|r| r.id != id);
            if state.listings_in_flight > 0 {
                let revision = state.bump();
                state.removed.push((revision, id.to_string()));
            }
        }

        info!("Removed website {}", id);
        self.persist().await;

        Ok(())
    }

    /// Put a website back into `scraping`.
    ///
    /// The previously issued agent id and snippet are kept until the next
    /// refresh replaces them.
    pub async fn rescrape(&self, id: &str) -> Result<WebsiteRecord, StoreError> {
        let record = {
            let mut state = self.state.write().await;
            let Some(idx) = state.position(id) else {
                return Err(StoreError::NotFound(id.to_string()));
            };

            if state.websites[idx].status == WebsiteStatus::Scraping {
                return Ok(state.websites[idx].clone());
            }

            let mut record = state.websites[idx].clone();
            record.status = WebsiteStatus::Scraping;
            record.revision = state.bump();
            state.websites[idx] = record.clone();
            record
        };

        info!("Re-scraping website {}", id);
        self.persist().await;

        Ok(record)
    }

    /// Agent view for a website, `None` if the id is unknown
    pub async fn agent_for(&self, website_id: &str) -> Option<AgentView> {
        self.state
            .read()
            .await
            .find(website_id)
            .map(|record| agent_for(record, &self.embed_script_url))
    }

    async fn persist(&self) {
        let Some(kv) = &self.kv else {
            return;
        };

        let _guard = self.persist_lock.lock().await;
        let snapshot = self.state.read().await.websites.clone();

        if let Err(e) = kv.save(WEBSITES_KEY, &snapshot).await {
            warn!("Failed to persist websites: {:#}", e);
        }
    }
}
